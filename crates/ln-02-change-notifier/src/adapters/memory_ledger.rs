//! In-memory ledger adapter
//!
//! Reference implementation of the outbound ports over a plain object map.
//! A ledger core mutates it first and then emits the matching signal, the
//! same order a real node follows.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use shared_types::{
    AccountBalanceObject, AccountId, AccountObject, Address, BalanceObject, CallOrderObject,
    LedgerObject, LimitOrderObject, ObjectId, OperationHistoryObject, PublicKey,
};

use crate::ports::{KeyReferenceIndex, LedgerReader};

#[derive(Default)]
struct LedgerState {
    objects: BTreeMap<ObjectId, LedgerObject>,
    applied_operations: Vec<OperationHistoryObject>,
}

/// Object store held entirely in memory.
#[derive(Default)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an object. Returns the previous state.
    pub fn insert(&self, object: LedgerObject) -> Option<LedgerObject> {
        self.state.write().objects.insert(object.id(), object)
    }

    /// Remove an object, returning its last state for the removal signal.
    pub fn remove(&self, id: ObjectId) -> Option<LedgerObject> {
        self.state.write().objects.remove(&id)
    }

    /// Replace the operations reported for the most recent block.
    pub fn set_applied_operations(&self, operations: Vec<OperationHistoryObject>) {
        self.state.write().applied_operations = operations;
    }

    pub fn len(&self) -> usize {
        self.state.read().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().objects.is_empty()
    }

    fn accounts(&self) -> Vec<AccountObject> {
        self.state
            .read()
            .objects
            .values()
            .filter_map(|object| match object {
                LedgerObject::Account(account) => Some(account.clone()),
                _ => None,
            })
            .collect()
    }
}

impl LedgerReader for InMemoryLedger {
    fn find_object(&self, id: ObjectId) -> Option<LedgerObject> {
        self.state.read().objects.get(&id).cloned()
    }

    fn applied_operations(&self) -> Vec<OperationHistoryObject> {
        self.state.read().applied_operations.clone()
    }

    fn find_account_by_name(&self, name: &str) -> Option<AccountObject> {
        self.accounts().into_iter().find(|account| account.name == name)
    }

    fn accounts_by_name(&self, lower_bound: &str, limit: usize) -> Vec<AccountObject> {
        let mut accounts: Vec<_> = self
            .accounts()
            .into_iter()
            .filter(|account| account.name.as_str() >= lower_bound)
            .collect();
        accounts.sort_by(|a, b| a.name.cmp(&b.name));
        accounts.truncate(limit);
        accounts
    }

    fn account_balances(&self, account: AccountId) -> Vec<AccountBalanceObject> {
        self.state
            .read()
            .objects
            .values()
            .filter_map(|object| match object {
                LedgerObject::AccountBalance(b) if b.owner == account => Some(b.clone()),
                _ => None,
            })
            .collect()
    }

    fn account_limit_orders(&self, account: AccountId) -> Vec<LimitOrderObject> {
        self.state
            .read()
            .objects
            .values()
            .filter_map(|object| match object {
                LedgerObject::LimitOrder(o) if o.seller == account => Some(o.clone()),
                _ => None,
            })
            .collect()
    }

    fn account_call_orders(&self, account: AccountId) -> Vec<CallOrderObject> {
        self.state
            .read()
            .objects
            .values()
            .filter_map(|object| match object {
                LedgerObject::CallOrder(o) if o.borrower == account => Some(o.clone()),
                _ => None,
            })
            .collect()
    }

    fn balances_by_owner(&self, owner: &Address) -> Vec<BalanceObject> {
        self.state
            .read()
            .objects
            .values()
            .filter_map(|object| match object {
                LedgerObject::Balance(b) if b.owner == *owner => Some(b.clone()),
                _ => None,
            })
            .collect()
    }
}

impl KeyReferenceIndex for InMemoryLedger {
    fn accounts_referencing_key(&self, key: &PublicKey) -> Vec<AccountId> {
        self.accounts()
            .iter()
            .filter(|account| account.keys().any(|k| k == key))
            .map(AccountObject::account_id)
            .collect()
    }

    fn accounts_referencing_address(&self, address: &Address) -> Vec<AccountId> {
        self.accounts()
            .iter()
            .filter(|account| account.keys().any(|k| Address::from_public_key(k) == *address))
            .map(AccountObject::account_id)
            .collect()
    }
}
