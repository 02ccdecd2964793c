//! Shared fixtures: a miniature ledger core and subscriber recorders.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use ln_02_change_notifier::{
    callback, Callback, DeliveryError, InMemoryLedger, LedgerObserver, NotifierConfig,
    SessionHub, SharedSession,
};
use serde_json::Value;
use shared_types::{
    AccountBalanceObject, AccountId, AccountObject, AssetAmount, AssetId, AssetObject, BlockId,
    LedgerObject, LimitOrderObject, ObjectId, ObjectKind, Operation, OperationHistoryObject,
    OperationResult, Price, PublicKey, SignedBlock,
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::time::timeout;

/// How long a test waits before deciding nothing will arrive.
pub const QUIET_PERIOD: Duration = Duration::from_millis(200);

/// Ledger core stand-in: applies mutations, then emits the signal.
pub struct TestNode {
    pub ledger: Arc<InMemoryLedger>,
    pub hub: SessionHub<InMemoryLedger>,
    head: BlockId,
}

impl TestNode {
    /// Must be called inside a tokio runtime.
    pub fn start(config: NotifierConfig) -> Self {
        let ledger = Arc::new(InMemoryLedger::new());
        let hub = SessionHub::start(Arc::clone(&ledger), config).expect("hub starts");
        Self {
            ledger,
            hub,
            head: BlockId([0; 20]),
        }
    }

    pub fn session(&self) -> SharedSession<InMemoryLedger> {
        self.hub.open_session()
    }

    /// Insert without signalling, as genesis state.
    pub fn seed(&self, object: LedgerObject) {
        self.ledger.insert(object);
    }

    pub fn create(&self, objects: Vec<LedgerObject>, impacted: &[u64]) {
        let ids = self.store(objects);
        self.hub.on_created(&ids, &accounts(impacted));
    }

    pub fn change(&self, objects: Vec<LedgerObject>, impacted: &[u64]) {
        let ids = self.store(objects);
        self.hub.on_changed(&ids, &accounts(impacted));
    }

    pub fn remove(&self, ids: &[ObjectId], impacted: &[u64]) {
        let removed: Vec<LedgerObject> = ids
            .iter()
            .filter_map(|id| self.ledger.remove(*id))
            .collect();
        self.hub.on_removed(ids, &removed, &accounts(impacted));
    }

    /// Apply a block whose only effect is `operations`.
    pub fn apply_block(&mut self, operations: Vec<Operation>) -> BlockId {
        let block_num = self.head.block_num() + 1;
        let history = operations
            .into_iter()
            .enumerate()
            .map(|(i, op)| OperationHistoryObject {
                id: ObjectKind::OperationHistory.id(u64::from(block_num) * 100 + i as u64),
                op,
                result: OperationResult::Void,
                block_num,
                trx_in_block: 0,
                op_in_trx: i as u16,
                virtual_op: 0,
            })
            .collect();
        self.ledger.set_applied_operations(history);

        let block = SignedBlock {
            previous: self.head,
            timestamp: 1_700_000_000 + u64::from(block_num) * 3,
            witness: ObjectId::new(1, 6, 0),
            transactions: vec![],
        };
        self.head = block.id();
        self.hub.on_block_applied(&block);
        self.head
    }

    fn store(&self, objects: Vec<LedgerObject>) -> Vec<ObjectId> {
        objects
            .into_iter()
            .map(|object| {
                let id = object.id();
                self.ledger.insert(object);
                id
            })
            .collect()
    }
}

pub fn accounts(ids: &[u64]) -> BTreeSet<AccountId> {
    ids.iter().map(|id| AccountId(*id)).collect()
}

/// A callback that forwards every batch into a channel.
pub fn recorder() -> (Callback, UnboundedReceiver<Value>) {
    let (tx, rx) = unbounded_channel();
    let cb = callback(move |batch| tx.send(batch).map_err(|_| DeliveryError::Disconnected));
    (cb, rx)
}

pub async fn next_batch(rx: &mut UnboundedReceiver<Value>) -> Value {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("expected a delivery")
        .expect("recorder channel open")
}

pub async fn assert_no_batch(rx: &mut UnboundedReceiver<Value>) {
    if let Ok(Some(batch)) = timeout(QUIET_PERIOD, rx.recv()).await {
        panic!("unexpected delivery: {batch}");
    }
}

// =============================================================================
// OBJECT BUILDERS
// =============================================================================

pub fn account(instance: u64, name: &str) -> LedgerObject {
    LedgerObject::Account(AccountObject {
        id: ObjectKind::Account.id(instance),
        name: name.to_string(),
        registrar: AccountId(0),
        owner_keys: vec![key(instance)],
        active_keys: vec![],
    })
}

pub fn asset(instance: u64, symbol: &str) -> LedgerObject {
    LedgerObject::Asset(AssetObject {
        id: ObjectKind::Asset.id(instance),
        symbol: symbol.to_string(),
        precision: 5,
        issuer: AccountId(0),
    })
}

pub fn balance(instance: u64, owner: u64, asset: u64, amount: i64) -> LedgerObject {
    LedgerObject::AccountBalance(AccountBalanceObject {
        id: ObjectKind::AccountBalance.id(instance),
        owner: AccountId(owner),
        asset_type: AssetId(asset),
        balance: amount,
    })
}

/// Limit order selling `sell` for `receive`.
pub fn limit_order(instance: u64, seller: u64, sell: u64, receive: u64) -> LedgerObject {
    LedgerObject::LimitOrder(LimitOrderObject {
        id: ObjectKind::LimitOrder.id(instance),
        expiration: 1_800_000_000,
        seller: AccountId(seller),
        for_sale: 1_000,
        sell_price: Price {
            base: AssetAmount::new(1_000, AssetId(sell)),
            quote: AssetAmount::new(250, AssetId(receive)),
        },
    })
}

pub fn fill(order: u64, account: u64, pays: u64, receives: u64) -> Operation {
    Operation::FillOrder {
        fee: AssetAmount::new(0, AssetId(0)),
        order_id: ObjectKind::LimitOrder.id(order),
        account_id: AccountId(account),
        pays: AssetAmount::new(100, AssetId(pays)),
        receives: AssetAmount::new(25, AssetId(receives)),
    }
}

pub fn transfer(from: u64, to: u64) -> Operation {
    Operation::Transfer {
        fee: AssetAmount::new(1, AssetId(0)),
        from: AccountId(from),
        to: AccountId(to),
        amount: AssetAmount::new(10, AssetId(0)),
    }
}

/// Deterministic compressed-looking key for an account instance.
pub fn key(instance: u64) -> PublicKey {
    let mut bytes = [0u8; 33];
    bytes[0] = 0x02;
    bytes[1..9].copy_from_slice(&instance.to_be_bytes());
    PublicKey(bytes)
}
