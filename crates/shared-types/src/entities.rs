//! # Core Domain Entities
//!
//! Ledger records as they are stored and as they appear on the wire.
//!
//! ## Clusters
//!
//! - **Keys**: `PublicKey`, `Address`
//! - **Market**: `AssetAmount`, `Price`, `TradingPair`
//! - **Objects**: accounts, assets, orders, balances, history, `LedgerObject`
//! - **Chain**: `Operation`, `OperationResult`, `SignedTransaction`, `SignedBlock`

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use sha2::{Digest, Sha256};

use crate::errors::IdParseError;
use crate::ids::{AccountId, AssetId, ObjectId, ObjectKind};

// =============================================================================
// CLUSTER A: KEYS
// =============================================================================

/// A 33-byte compressed public key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct PublicKey(pub [u8; 33]);

/// A 20-byte address derived from a public key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Derive the address of a key: the first 20 bytes of its SHA-256 digest.
    #[must_use]
    pub fn from_public_key(key: &PublicKey) -> Self {
        let digest = Sha256::digest(key.0);
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest[..20]);
        Self(out)
    }
}

impl From<&PublicKey> for Address {
    fn from(key: &PublicKey) -> Self {
        Self::from_public_key(key)
    }
}

macro_rules! hex_bytes {
    ($name:ident, $len:expr) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bytes = hex::decode(s).map_err(|e| IdParseError::InvalidHex(e.to_string()))?;
                let array: [u8; $len] = bytes
                    .try_into()
                    .map_err(|_| IdParseError::InvalidHex(format!("expected {} bytes", $len)))?;
                Ok(Self(array))
            }
        }
    };
}

hex_bytes!(PublicKey, 33);
hex_bytes!(Address, 20);

// =============================================================================
// CLUSTER B: MARKET
// =============================================================================

/// An amount of a specific asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAmount {
    pub amount: i64,
    pub asset_id: AssetId,
}

impl AssetAmount {
    #[must_use]
    pub const fn new(amount: i64, asset_id: AssetId) -> Self {
        Self { amount, asset_id }
    }
}

/// Exchange rate expressed as `base` per `quote`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub base: AssetAmount,
    pub quote: AssetAmount,
}

/// An unordered pair of assets, stored with the lower id first.
///
/// Construction always canonicalizes, so `(a, b)` and `(b, a)` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TradingPair {
    base: AssetId,
    quote: AssetId,
}

impl TradingPair {
    #[must_use]
    pub fn new(a: AssetId, b: AssetId) -> Self {
        if a <= b {
            Self { base: a, quote: b }
        } else {
            Self { base: b, quote: a }
        }
    }

    /// The lower asset id.
    #[must_use]
    pub const fn base(&self) -> AssetId {
        self.base
    }

    /// The higher asset id.
    #[must_use]
    pub const fn quote(&self) -> AssetId {
        self.quote
    }

    /// A pair of an asset with itself is not a market.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.base == self.quote
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.base, self.quote)
    }
}

// =============================================================================
// CLUSTER C: OBJECTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountObject {
    pub id: ObjectId,
    pub name: String,
    pub registrar: AccountId,
    /// Keys appearing in the owner authority.
    pub owner_keys: Vec<PublicKey>,
    /// Keys appearing in the active authority.
    pub active_keys: Vec<PublicKey>,
}

impl AccountObject {
    /// Typed identifier of this account.
    #[must_use]
    pub fn account_id(&self) -> AccountId {
        AccountId(self.id.instance())
    }

    /// Every key referenced by either authority.
    pub fn keys(&self) -> impl Iterator<Item = &PublicKey> {
        self.owner_keys.iter().chain(self.active_keys.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetObject {
    pub id: ObjectId,
    pub symbol: String,
    pub precision: u8,
    pub issuer: AccountId,
}

/// A standing offer to sell `for_sale` units at `sell_price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOrderObject {
    pub id: ObjectId,
    pub expiration: u64,
    pub seller: AccountId,
    pub for_sale: i64,
    pub sell_price: Price,
}

impl LimitOrderObject {
    #[must_use]
    pub fn market(&self) -> TradingPair {
        TradingPair::new(self.sell_price.base.asset_id, self.sell_price.quote.asset_id)
    }
}

/// A collateralized debt position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOrderObject {
    pub id: ObjectId,
    pub borrower: AccountId,
    pub collateral: i64,
    pub debt: i64,
    pub call_price: Price,
}

impl CallOrderObject {
    #[must_use]
    pub fn market(&self) -> TradingPair {
        TradingPair::new(self.call_price.base.asset_id, self.call_price.quote.asset_id)
    }
}

/// Balance of one asset held by one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalanceObject {
    pub id: ObjectId,
    pub owner: AccountId,
    pub asset_type: AssetId,
    pub balance: i64,
}

/// Unclaimed balance owned by an address rather than an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceObject {
    pub id: ObjectId,
    pub owner: Address,
    pub balance: AssetAmount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationHistoryObject {
    pub id: ObjectId,
    pub op: Operation,
    pub result: OperationResult,
    pub block_num: u32,
    pub trx_in_block: u16,
    pub op_in_trx: u16,
    pub virtual_op: u16,
}

/// Link in an account's operation history chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTransactionHistoryObject {
    pub id: ObjectId,
    pub account: AccountId,
    pub operation_id: ObjectId,
    pub sequence: u32,
}

/// Any record the notification layer can materialize.
///
/// Serialized untagged: the wire form of a ledger object is the object's own
/// fields, `id` included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LedgerObject {
    Account(AccountObject),
    Asset(AssetObject),
    LimitOrder(LimitOrderObject),
    CallOrder(CallOrderObject),
    AccountBalance(AccountBalanceObject),
    Balance(BalanceObject),
    OperationHistory(OperationHistoryObject),
    AccountTransactionHistory(AccountTransactionHistoryObject),
}

impl LedgerObject {
    #[must_use]
    pub fn id(&self) -> ObjectId {
        match self {
            Self::Account(o) => o.id,
            Self::Asset(o) => o.id,
            Self::LimitOrder(o) => o.id,
            Self::CallOrder(o) => o.id,
            Self::AccountBalance(o) => o.id,
            Self::Balance(o) => o.id,
            Self::OperationHistory(o) => o.id,
            Self::AccountTransactionHistory(o) => o.id,
        }
    }

    /// Trading pair of an order; `None` for every other record.
    #[must_use]
    pub fn market(&self) -> Option<TradingPair> {
        match self {
            Self::LimitOrder(o) => Some(o.market()),
            Self::CallOrder(o) => Some(o.market()),
            _ => None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> Option<ObjectKind> {
        self.id().kind()
    }
}

// =============================================================================
// CLUSTER D: CHAIN
// =============================================================================

/// Ledger operations relevant to the market and notification layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Transfer {
        fee: AssetAmount,
        from: AccountId,
        to: AccountId,
        amount: AssetAmount,
    },
    LimitOrderCreate {
        fee: AssetAmount,
        seller: AccountId,
        amount_to_sell: AssetAmount,
        min_to_receive: AssetAmount,
        expiration: u64,
        fill_or_kill: bool,
    },
    LimitOrderCancel {
        fee: AssetAmount,
        fee_paying_account: AccountId,
        order: ObjectId,
    },
    CallOrderUpdate {
        fee: AssetAmount,
        funding_account: AccountId,
        delta_collateral: AssetAmount,
        delta_debt: AssetAmount,
    },
    /// Virtual operation emitted when an order is (partially) matched.
    FillOrder {
        fee: AssetAmount,
        order_id: ObjectId,
        account_id: AccountId,
        pays: AssetAmount,
        receives: AssetAmount,
    },
}

impl Operation {
    /// The account that pays the fee for this operation.
    #[must_use]
    pub fn fee_payer(&self) -> AccountId {
        match self {
            Self::Transfer { from, .. } => *from,
            Self::LimitOrderCreate { seller, .. } => *seller,
            Self::LimitOrderCancel {
                fee_paying_account, ..
            } => *fee_paying_account,
            Self::CallOrderUpdate {
                funding_account, ..
            } => *funding_account,
            Self::FillOrder { account_id, .. } => *account_id,
        }
    }

    /// Accounts whose balances or authorities this operation touches.
    #[must_use]
    pub fn impacted_accounts(&self) -> BTreeSet<AccountId> {
        let mut accounts = BTreeSet::new();
        accounts.insert(self.fee_payer());
        if let Self::Transfer { to, .. } = self {
            accounts.insert(*to);
        }
        accounts
    }

    /// Trading pair of a fill; `None` for other operations.
    #[must_use]
    pub fn fill_market(&self) -> Option<TradingPair> {
        match self {
            Self::FillOrder { pays, receives, .. } => {
                Some(TradingPair::new(pays.asset_id, receives.asset_id))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationResult {
    Void,
    ObjectId(ObjectId),
    Asset(AssetAmount),
}

/// A 20-byte block identifier; the first four bytes hold the block number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct BlockId(pub [u8; 20]);

hex_bytes!(BlockId, 20);

impl BlockId {
    #[must_use]
    pub fn block_num(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub ref_block_num: u16,
    pub ref_block_prefix: u32,
    pub expiration: u64,
    pub operations: Vec<Operation>,
    pub signatures: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedBlock {
    pub previous: BlockId,
    pub timestamp: u64,
    pub witness: ObjectId,
    pub transactions: Vec<SignedTransaction>,
}

impl SignedBlock {
    #[must_use]
    pub fn block_num(&self) -> u32 {
        self.previous.block_num().wrapping_add(1)
    }

    /// Digest of the block contents with the block number spliced in front.
    #[must_use]
    pub fn id(&self) -> BlockId {
        let mut hasher = Sha256::new();
        hasher.update(self.previous.0);
        hasher.update(self.timestamp.to_be_bytes());
        hasher.update(self.witness.to_bytes());
        for trx in &self.transactions {
            hasher.update(bincode::serialize(trx).unwrap_or_default());
        }
        let digest = hasher.finalize();

        let mut out = [0u8; 20];
        out.copy_from_slice(&digest[..20]);
        out[..4].copy_from_slice(&self.block_num().to_be_bytes());
        BlockId(out)
    }
}
