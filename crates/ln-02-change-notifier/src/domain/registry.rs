//! Per-session subscription state
//!
//! INVARIANTS:
//! - No update callback => no membership filter, no watched accounts
//! - The filter and `watched_accounts` are reset together on every
//!   (re)install or clear of the update callback
//! - Market subscriptions are keyed by canonical pair and survive an update
//!   callback reset
//! - `watched_accounts.len() <= max_tracked_accounts`

use std::collections::{BTreeMap, BTreeSet};

use ln_01_membership_filter::{BloomFilter, FilterParameters};
use shared_types::{AccountId, AssetId, TradingPair};

use super::callback::Callback;
use super::config::NotifierConfig;
use super::interest::WatchKey;
use crate::error::NotifyError;

/// Everything one subscriber connection has asked for.
pub struct SubscriptionRegistry {
    update_callback: Option<Callback>,
    notify_all_creates_removes: bool,
    watched_accounts: BTreeSet<AccountId>,
    filter: Option<BloomFilter>,
    pending_transaction_callback: Option<Callback>,
    block_applied_callback: Option<Callback>,
    market_subscriptions: BTreeMap<TradingPair, Callback>,

    filter_params: FilterParameters,
    enable_subscribe_to_all: bool,
    max_tracked_accounts: usize,
}

impl SubscriptionRegistry {
    /// Create an empty registry bound to the server-wide settings.
    pub fn new(config: &NotifierConfig) -> Self {
        Self {
            update_callback: None,
            notify_all_creates_removes: false,
            watched_accounts: BTreeSet::new(),
            filter: None,
            pending_transaction_callback: None,
            block_applied_callback: None,
            market_subscriptions: BTreeMap::new(),
            filter_params: config.filter.clone(),
            enable_subscribe_to_all: config.enable_subscribe_to_all,
            max_tracked_accounts: config.max_tracked_accounts,
        }
    }

    /// Install (or clear, with `None`) the generic update callback.
    ///
    /// Rejects `notify_all` when the node does not allow it, leaving state
    /// untouched. Otherwise forgets every tracked item and account.
    pub fn set_update_callback(
        &mut self,
        callback: Option<Callback>,
        notify_all: bool,
    ) -> Result<(), NotifyError> {
        if notify_all && !self.enable_subscribe_to_all {
            return Err(NotifyError::SubscribeToAllDisabled);
        }
        self.install(callback, notify_all);
        Ok(())
    }

    pub fn clear_update_callback(&mut self) {
        self.install(None, false);
    }

    fn install(&mut self, callback: Option<Callback>, notify_all: bool) {
        self.filter = callback
            .as_ref()
            .map(|_| BloomFilter::with_parameters(&self.filter_params));
        self.update_callback = callback;
        self.notify_all_creates_removes = notify_all;
        self.watched_accounts.clear();
    }

    pub fn set_pending_transaction_callback(&mut self, callback: Option<Callback>) {
        self.pending_transaction_callback = callback;
    }

    pub fn set_block_applied_callback(&mut self, callback: Option<Callback>) {
        self.block_applied_callback = callback;
    }

    /// Subscribe to one market; replaces any previous callback for the pair.
    pub fn subscribe_to_market(
        &mut self,
        callback: Callback,
        a: AssetId,
        b: AssetId,
    ) -> Result<TradingPair, NotifyError> {
        let pair = market_pair(a, b)?;
        self.market_subscriptions.insert(pair, callback);
        Ok(pair)
    }

    /// Drop a market subscription. Returns whether one existed.
    pub fn unsubscribe_from_market(&mut self, a: AssetId, b: AssetId) -> Result<bool, NotifyError> {
        let pair = market_pair(a, b)?;
        Ok(self.market_subscriptions.remove(&pair).is_some())
    }

    /// Clear the update callback and every market subscription.
    ///
    /// Pending-transaction and block-applied callbacks are left alone.
    pub fn cancel_all(&mut self) {
        self.clear_update_callback();
        self.market_subscriptions.clear();
    }

    /// Clear every callback this registry holds.
    pub fn teardown(&mut self) {
        self.cancel_all();
        self.pending_transaction_callback = None;
        self.block_applied_callback = None;
    }

    /// Arm the filter with `item`. No-op without an update callback.
    pub fn track_item<K: WatchKey + ?Sized>(&mut self, item: &K) -> bool {
        match self.filter.as_mut() {
            Some(filter) => {
                filter.insert(&item.watch_key());
                ledger_telemetry::FILTER_ITEMS_TRACKED.inc();
                true
            }
            None => false,
        }
    }

    /// Probe the filter. Always false without an update callback.
    pub fn is_watching<K: WatchKey + ?Sized>(&self, item: &K) -> bool {
        self.filter
            .as_ref()
            .is_some_and(|filter| filter.contains(&item.watch_key()))
    }

    /// Whether any of `impacted` is a fully tracked account.
    pub fn is_account_impacted(&self, impacted: &BTreeSet<AccountId>) -> bool {
        if impacted.is_empty() || self.watched_accounts.is_empty() {
            return false;
        }
        // Walk the smaller set
        let (small, large) = if impacted.len() <= self.watched_accounts.len() {
            (impacted, &self.watched_accounts)
        } else {
            (&self.watched_accounts, impacted)
        };
        small.iter().any(|account| large.contains(account))
    }

    /// Start fully tracking `account` while below the cap.
    ///
    /// Returns false when the cap is reached and `account` is not already
    /// tracked; the caller keeps going silently.
    pub fn track_account(&mut self, account: AccountId) -> bool {
        if self.watched_accounts.contains(&account) {
            return true;
        }
        if self.watched_accounts.len() >= self.max_tracked_accounts {
            return false;
        }
        self.watched_accounts.insert(account);
        true
    }

    pub fn update_callback(&self) -> Option<&Callback> {
        self.update_callback.as_ref()
    }

    pub fn is_subscribed(&self) -> bool {
        self.update_callback.is_some()
    }

    pub fn notify_all_creates_removes(&self) -> bool {
        self.notify_all_creates_removes
    }

    pub fn watched_accounts(&self) -> &BTreeSet<AccountId> {
        &self.watched_accounts
    }

    pub fn pending_transaction_callback(&self) -> Option<&Callback> {
        self.pending_transaction_callback.as_ref()
    }

    pub fn block_applied_callback(&self) -> Option<&Callback> {
        self.block_applied_callback.as_ref()
    }

    pub fn market_callback(&self, pair: &TradingPair) -> Option<&Callback> {
        self.market_subscriptions.get(pair)
    }

    pub fn has_market_subscriptions(&self) -> bool {
        !self.market_subscriptions.is_empty()
    }

    pub fn market_pairs(&self) -> impl Iterator<Item = &TradingPair> {
        self.market_subscriptions.keys()
    }

    /// Items inserted into the current filter, duplicates included.
    pub fn tracked_item_count(&self) -> usize {
        self.filter.as_ref().map_or(0, BloomFilter::elements_inserted)
    }
}

/// Canonical market for a subscription request.
pub fn market_pair(a: AssetId, b: AssetId) -> Result<TradingPair, NotifyError> {
    let pair = TradingPair::new(a, b);
    if pair.is_degenerate() {
        return Err(NotifyError::SameAssetMarket { asset: a });
    }
    Ok(pair)
}
