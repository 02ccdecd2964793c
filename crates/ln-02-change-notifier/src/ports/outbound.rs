//! Outbound Ports (Driven Ports)
//!
//! Reads the notifier needs from the ledger's object store and its
//! secondary indices. All calls are synchronous lookups against state the
//! ledger has already committed for the current block.

use shared_types::{
    AccountBalanceObject, AccountId, AccountObject, Address, BalanceObject, CallOrderObject,
    LedgerObject, LimitOrderObject, ObjectId, OperationHistoryObject, PublicKey,
};

/// Object store lookups (Driven Port)
pub trait LedgerReader: Send + Sync {
    /// Current state of an object, if it exists.
    fn find_object(&self, id: ObjectId) -> Option<LedgerObject>;

    /// Operations applied by the most recent block, in application order.
    fn applied_operations(&self) -> Vec<OperationHistoryObject>;

    fn find_account_by_name(&self, name: &str) -> Option<AccountObject>;

    /// Accounts ordered by name, starting at `lower_bound`.
    fn accounts_by_name(&self, lower_bound: &str, limit: usize) -> Vec<AccountObject>;

    fn account_balances(&self, account: AccountId) -> Vec<AccountBalanceObject>;

    fn account_limit_orders(&self, account: AccountId) -> Vec<LimitOrderObject>;

    fn account_call_orders(&self, account: AccountId) -> Vec<CallOrderObject>;

    fn balances_by_owner(&self, owner: &Address) -> Vec<BalanceObject>;
}

/// Reverse lookups from authority keys to accounts (Driven Port)
pub trait KeyReferenceIndex: Send + Sync {
    fn accounts_referencing_key(&self, key: &PublicKey) -> Vec<AccountId>;

    fn accounts_referencing_address(&self, address: &Address) -> Vec<AccountId>;
}
