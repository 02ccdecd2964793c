//! Inbound Ports (Driving Ports)
//!
//! The ledger core calls these on its single block-application thread.
//! Implementations must not block and must not fail.

use std::collections::BTreeSet;

use shared_types::{AccountId, LedgerObject, ObjectId, SignedBlock, SignedTransaction};

/// Receiver of ledger change signals.
pub trait LedgerObserver: Send + Sync {
    /// Objects were created. They are resolvable through the ledger.
    fn on_created(&self, ids: &[ObjectId], impacted: &BTreeSet<AccountId>);

    /// Objects were mutated. They are resolvable through the ledger.
    fn on_changed(&self, ids: &[ObjectId], impacted: &BTreeSet<AccountId>);

    /// Objects were removed; `removed` holds their last state.
    fn on_removed(
        &self,
        ids: &[ObjectId],
        removed: &[LedgerObject],
        impacted: &BTreeSet<AccountId>,
    );

    /// A block finished applying.
    fn on_block_applied(&self, block: &SignedBlock);

    /// A transaction entered the pending pool.
    fn on_pending_transaction(&self, transaction: &SignedTransaction);
}
