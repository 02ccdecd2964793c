//! Subscriber session
//!
//! One per client connection. Owns the connection's subscription registry
//! and its delivery handle; answers request-shaped queries and arms the
//! membership filter with what they return.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use shared_types::{
    AccountBalanceObject, AccountId, AccountObject, Address, AssetId, AssetObject, BalanceObject,
    CallOrderObject, LedgerObject, LimitOrderObject, ObjectId, ObjectKind, PublicKey,
};
use tracing::{debug, info};

use crate::delivery::DeliveryHandle;
use crate::domain::{Callback, NotifierConfig, SubscriptionRegistry};
use crate::error::NotifyError;
use crate::ports::{KeyReferenceIndex, LedgerReader};

/// Largest `limit` accepted by [`NotifierSession::lookup_accounts`].
pub const MAX_ACCOUNT_LOOKUP: usize = 1000;

/// An account together with everything a wallet shows for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FullAccount {
    pub account: AccountObject,
    pub balances: Vec<AccountBalanceObject>,
    pub limit_orders: Vec<LimitOrderObject>,
    pub call_orders: Vec<CallOrderObject>,
}

/// Subscription state and query surface of one connection.
pub struct NotifierSession<L> {
    pub(super) ledger: Arc<L>,
    pub(super) registry: SubscriptionRegistry,
    pub(super) delivery: DeliveryHandle,
}

impl<L> NotifierSession<L>
where
    L: LedgerReader + KeyReferenceIndex,
{
    pub fn new(ledger: Arc<L>, config: &NotifierConfig, delivery: DeliveryHandle) -> Self {
        Self {
            ledger,
            registry: SubscriptionRegistry::new(config),
            delivery,
        }
    }

    pub fn id(&self) -> u64 {
        self.delivery.session_id()
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    pub fn is_closed(&self) -> bool {
        !self.delivery.is_open()
    }

    // =========================================================================
    // SUBSCRIPTIONS
    // =========================================================================

    /// Install the update callback, forgetting everything tracked so far.
    ///
    /// `notify_all` asks for every created and removed object and requires
    /// the node to enable it.
    pub fn subscribe(&mut self, callback: Callback, notify_all: bool) -> Result<(), NotifyError> {
        self.registry.set_update_callback(Some(callback), notify_all)?;
        info!(session_id = self.id(), notify_all, "Update subscription installed");
        Ok(())
    }

    /// Drop the update callback and all market subscriptions.
    pub fn unsubscribe_all(&mut self) {
        self.registry.cancel_all();
        info!(session_id = self.id(), "All subscriptions cancelled");
    }

    pub fn subscribe_pending_transactions(&mut self, callback: Option<Callback>) {
        self.registry.set_pending_transaction_callback(callback);
    }

    pub fn subscribe_block_applied(&mut self, callback: Option<Callback>) {
        self.registry.set_block_applied_callback(callback);
    }

    pub fn subscribe_market(
        &mut self,
        callback: Callback,
        a: AssetId,
        b: AssetId,
    ) -> Result<(), NotifyError> {
        let pair = self.registry.subscribe_to_market(callback, a, b)?;
        debug!(session_id = self.id(), %pair, "Market subscription installed");
        Ok(())
    }

    pub fn unsubscribe_market(&mut self, a: AssetId, b: AssetId) -> Result<(), NotifyError> {
        if self.registry.unsubscribe_from_market(a, b)? {
            debug!(session_id = self.id(), base = %a, quote = %b, "Market subscription removed");
        }
        Ok(())
    }

    /// Tear the session down: clear every callback and turn queued
    /// deliveries into no-ops.
    pub fn close(&mut self) {
        self.registry.teardown();
        self.delivery.close();
        info!(session_id = self.id(), "Session closed");
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Fetch objects by id; `null` for ids that do not resolve.
    ///
    /// Every requested id is tracked except operation history and account
    /// transaction history, which would flood the filter.
    pub fn get_objects(&mut self, ids: &[ObjectId]) -> Vec<Value> {
        if self.registry.is_subscribed() {
            for id in ids {
                if id.is(ObjectKind::OperationHistory)
                    || id.is(ObjectKind::AccountTransactionHistory)
                {
                    continue;
                }
                self.registry.track_item(id);
            }
        }

        ids.iter()
            .map(|id| {
                self.ledger
                    .find_object(*id)
                    .and_then(|object| super::dispatch::materialize(&object))
                    .unwrap_or(Value::Null)
            })
            .collect()
    }

    pub fn get_accounts(&mut self, ids: &[AccountId]) -> Vec<Option<AccountObject>> {
        ids.iter()
            .map(|id| {
                let account = self.find_account(*id)?;
                self.registry.track_item(id);
                Some(account)
            })
            .collect()
    }

    /// Resolve accounts by id string (`"1.2.17"`) or by name.
    ///
    /// With `subscribe`, each found account is fully tracked while the
    /// session is below its tracked-account cap; past the cap accounts are
    /// still returned but not tracked.
    pub fn get_full_accounts(
        &mut self,
        names_or_ids: &[String],
        subscribe: bool,
    ) -> BTreeMap<String, FullAccount> {
        let mut results = BTreeMap::new();

        for key in names_or_ids {
            let Some(account) = self.resolve_account(key) else {
                continue;
            };
            let account_id = account.account_id();

            if subscribe && self.registry.track_account(account_id) {
                self.registry.track_item(&account_id);
            }

            results.insert(
                key.clone(),
                FullAccount {
                    balances: self.ledger.account_balances(account_id),
                    limit_orders: self.ledger.account_limit_orders(account_id),
                    call_orders: self.ledger.account_call_orders(account_id),
                    account,
                },
            );
        }

        results
    }

    /// Account names and ids from `lower_bound` onward.
    ///
    /// A single-entry lookup tracks the account it finds.
    pub fn lookup_accounts(
        &mut self,
        lower_bound: &str,
        limit: usize,
    ) -> Result<BTreeMap<String, AccountId>, NotifyError> {
        if limit > MAX_ACCOUNT_LOOKUP {
            return Err(NotifyError::LimitExceeded {
                requested: limit,
                max: MAX_ACCOUNT_LOOKUP,
            });
        }

        let accounts = self.ledger.accounts_by_name(lower_bound, limit);
        if let [only] = accounts.as_slice() {
            self.registry.track_item(&only.account_id());
        }

        Ok(accounts
            .into_iter()
            .map(|account| {
                let id = account.account_id();
                (account.name, id)
            })
            .collect())
    }

    pub fn get_assets(&mut self, ids: &[AssetId]) -> Vec<Option<AssetObject>> {
        ids.iter()
            .map(|id| match self.ledger.find_object(id.object_id()) {
                Some(LedgerObject::Asset(asset)) => {
                    self.registry.track_item(id);
                    Some(asset)
                }
                _ => None,
            })
            .collect()
    }

    /// Accounts whose authorities reference each key, directly or through
    /// the key's derived address.
    ///
    /// Tracks every key, every derived address and every account returned.
    pub fn get_key_references(&mut self, keys: &[PublicKey]) -> Vec<Vec<AccountId>> {
        let mut results = Vec::with_capacity(keys.len());

        for key in keys {
            let address = Address::from_public_key(key);
            self.registry.track_item(key);
            self.registry.track_item(&address);

            let mut accounts = self.ledger.accounts_referencing_address(&address);
            accounts.extend(self.ledger.accounts_referencing_key(key));
            results.push(accounts);
        }

        for account in results.iter().flatten() {
            self.registry.track_item(account);
        }
        results
    }

    /// Unclaimed balances owned by each address. Tracks every address.
    pub fn get_balance_objects(&mut self, addresses: &[Address]) -> Vec<BalanceObject> {
        let mut results = Vec::new();
        for owner in addresses {
            self.registry.track_item(owner);
            results.extend(self.ledger.balances_by_owner(owner));
        }
        results
    }

    fn find_account(&self, id: AccountId) -> Option<AccountObject> {
        match self.ledger.find_object(id.object_id()) {
            Some(LedgerObject::Account(account)) => Some(account),
            _ => None,
        }
    }

    fn resolve_account(&self, name_or_id: &str) -> Option<AccountObject> {
        if name_or_id.starts_with(|c: char| c.is_ascii_digit()) {
            match name_or_id.parse::<AccountId>() {
                Ok(id) => self.find_account(id),
                Err(error) => {
                    debug!(session_id = self.id(), name_or_id, %error, "Unparsable account id");
                    None
                }
            }
        } else {
            self.ledger.find_account_by_name(name_or_id)
        }
    }
}

impl<L> Drop for NotifierSession<L> {
    fn drop(&mut self) {
        debug!(session_id = self.delivery.session_id(), "Session dropped");
    }
}
