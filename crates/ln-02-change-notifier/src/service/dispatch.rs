//! Change collection, notification dispatch and market fan-out
//!
//! Runs on the ledger's block-application thread. Decides interest,
//! materializes payloads and hands them to the delivery handle; never
//! invokes a subscriber callback directly and never fails.
//!
//! Interest rule for the update stream, per id:
//!
//! ```text
//! deliver(id) = force_notify || account_impacted(batch) || filter.contains(id)
//! ```

use std::collections::{BTreeMap, BTreeSet};

use ledger_telemetry::{CHANGE_BATCH_SIZE, RESOLUTION_ANOMALIES};
use serde::Serialize;
use serde_json::Value;
use shared_types::{
    AccountId, LedgerObject, ObjectId, ObjectKind, SignedBlock, SignedTransaction,
};
use tracing::{debug, error, trace, warn};

use super::session::NotifierSession;
use crate::domain::{group_fills, MarketQueues, Stream};
use crate::ports::{KeyReferenceIndex, LedgerObserver, LedgerReader};

/// JSON form of a ledger object as delivered to subscribers.
pub(crate) fn materialize(object: &LedgerObject) -> Option<Value> {
    to_payload(object, "object")
}

fn to_payload<T: Serialize + ?Sized>(value: &T, what: &'static str) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(what, error = %err, "Failed to serialize notification payload");
            None
        }
    }
}

fn bare_id(id: ObjectId) -> Value {
    Value::String(id.to_string())
}

/// An announced id did not resolve. The ledger broke its own contract.
///
/// Release builds skip the item and block application carries on; on the
/// market path debug builds additionally assert.
fn resolution_anomaly(session_id: u64, id: ObjectId, stream: Stream) {
    error!(session_id, %id, %stream, "Changed object failed to resolve");
    RESOLUTION_ANOMALIES.inc();
}

impl<L> NotifierSession<L>
where
    L: LedgerReader + KeyReferenceIndex,
{
    /// Process one change batch for both the update and market streams.
    ///
    /// `full_object` selects full materialization over bare ids; `resolve`
    /// maps an id to its state (live for creations and changes, snapshot
    /// for removals).
    pub(crate) fn handle_change<F>(
        &self,
        force_notify: bool,
        full_object: bool,
        ids: &[ObjectId],
        impacted: &BTreeSet<AccountId>,
        resolve: F,
    ) where
        F: Fn(ObjectId) -> Option<LedgerObject>,
    {
        if ids.is_empty() {
            return;
        }
        CHANGE_BATCH_SIZE.observe(ids.len() as f64);

        self.dispatch_updates(force_notify, full_object, ids, impacted, &resolve);

        if self.registry.has_market_subscriptions() {
            self.fan_out_markets(full_object, ids, &resolve);
        }
    }

    fn dispatch_updates<F>(
        &self,
        force_notify: bool,
        full_object: bool,
        ids: &[ObjectId],
        impacted: &BTreeSet<AccountId>,
        resolve: &F,
    ) where
        F: Fn(ObjectId) -> Option<LedgerObject>,
    {
        let Some(callback) = self.registry.update_callback() else {
            return;
        };

        let account_impacted = self.registry.is_account_impacted(impacted);
        let mut updates = Vec::new();

        for &id in ids {
            if !(force_notify || account_impacted || self.registry.is_watching(&id)) {
                continue;
            }
            if !full_object {
                updates.push(bare_id(id));
                continue;
            }
            match resolve(id) {
                Some(object) => updates.extend(materialize(&object)),
                None => resolution_anomaly(self.id(), id, Stream::Updates),
            }
        }

        if updates.is_empty() {
            return;
        }
        trace!(session_id = self.id(), count = updates.len(), "Scheduling update batch");
        self.delivery
            .schedule(Stream::Updates, callback, Value::Array(updates));
    }

    fn fan_out_markets<F>(&self, full_object: bool, ids: &[ObjectId], resolve: &F)
    where
        F: Fn(ObjectId) -> Option<LedgerObject>,
    {
        let mut queues = MarketQueues::new();

        for &id in ids {
            if !(id.is(ObjectKind::LimitOrder) || id.is(ObjectKind::CallOrder)) {
                continue;
            }
            // An order id must resolve to an order
            let resolved = resolve(id).and_then(|object| object.market().map(|pair| (pair, object)));
            let Some((pair, object)) = resolved else {
                resolution_anomaly(self.id(), id, Stream::Market);
                debug_assert!(false, "market order {id} has neither a live object nor a snapshot");
                continue;
            };

            if self.registry.market_callback(&pair).is_none() {
                continue;
            }
            let item = if full_object {
                materialize(&object)
            } else {
                Some(bare_id(id))
            };
            if let Some(item) = item {
                queues.push(pair, item);
            }
        }

        for (pair, items) in queues.into_batches() {
            if let Some(callback) = self.registry.market_callback(&pair) {
                trace!(session_id = self.id(), %pair, count = items.len(), "Scheduling market batch");
                self.delivery
                    .schedule(Stream::Market, callback, Value::Array(items));
            }
        }
    }
}

impl<L> LedgerObserver for NotifierSession<L>
where
    L: LedgerReader + KeyReferenceIndex,
{
    fn on_created(&self, ids: &[ObjectId], impacted: &BTreeSet<AccountId>) {
        let force = self.registry.notify_all_creates_removes();
        self.handle_change(force, true, ids, impacted, |id| self.ledger.find_object(id));
    }

    fn on_changed(&self, ids: &[ObjectId], impacted: &BTreeSet<AccountId>) {
        self.handle_change(false, true, ids, impacted, |id| self.ledger.find_object(id));
    }

    fn on_removed(
        &self,
        ids: &[ObjectId],
        removed: &[LedgerObject],
        impacted: &BTreeSet<AccountId>,
    ) {
        let snapshots: BTreeMap<ObjectId, &LedgerObject> =
            removed.iter().map(|object| (object.id(), object)).collect();
        let force = self.registry.notify_all_creates_removes();
        self.handle_change(force, false, ids, impacted, |id| {
            snapshots.get(&id).map(|object| (*object).clone())
        });
    }

    fn on_block_applied(&self, block: &SignedBlock) {
        if let Some(callback) = self.registry.block_applied_callback() {
            if let Some(payload) = to_payload(&block.id(), "block_id") {
                self.delivery.schedule(Stream::BlockApplied, callback, payload);
            }
        }

        if !self.registry.has_market_subscriptions() {
            return;
        }

        let applied = self.ledger.applied_operations();
        let fills = group_fills(&applied, |pair| self.registry.market_callback(pair).is_some());
        if fills.is_empty() {
            return;
        }
        debug!(
            session_id = self.id(),
            block_num = block.block_num(),
            markets = fills.len(),
            "Scheduling fill batches"
        );

        for (pair, entries) in fills.into_batches() {
            let Some(callback) = self.registry.market_callback(&pair) else {
                continue;
            };
            if let Some(payload) = to_payload(&entries, "fills") {
                self.delivery.schedule(Stream::Market, callback, payload);
            }
        }
    }

    fn on_pending_transaction(&self, transaction: &SignedTransaction) {
        if let Some(callback) = self.registry.pending_transaction_callback() {
            if let Some(payload) = to_payload(transaction, "transaction") {
                self.delivery
                    .schedule(Stream::PendingTransactions, callback, payload);
            }
        }
    }
}
