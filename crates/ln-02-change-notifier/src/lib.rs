//! # LN-02 Change Notifier
//!
//! Watches every object the ledger creates, changes or removes and fans
//! the changes out to subscribers without blocking block application.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): subscription registry, filter keys,
//!   market grouping, configuration
//! - **Ports Layer** (`ports/`): `LedgerObserver` (inbound),
//!   `LedgerReader` and `KeyReferenceIndex` (outbound)
//! - **Delivery** (`delivery/`): bounded worker queues and per-session
//!   handles with a liveness flag
//! - **Service Layer** (`service/`): `NotifierSession`, change dispatch and
//!   market fan-out, `SessionHub`
//! - **Adapters** (`adapters/`): `InMemoryLedger`
//!
//! ## Delivery Guarantees
//!
//! - No missed interest: a tracked item or a tracked account's change is
//!   always scheduled
//! - Per-destination FIFO: batches for one session stream arrive in
//!   submission order
//! - Best effort: a full queue or a closed session drops the batch
//!
//! ## Usage Example
//!
//! ```ignore
//! use ln_02_change_notifier::{callback, InMemoryLedger, NotifierConfig, SessionHub};
//!
//! let hub = SessionHub::start(Arc::new(InMemoryLedger::new()), NotifierConfig::default())?;
//! let session = hub.open_session();
//! session.lock().subscribe(callback(|batch| { println!("{batch}"); Ok(()) }), false)?;
//! // register `hub` as the ledger's observer
//! ```

pub mod adapters;
pub mod delivery;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::InMemoryLedger;
pub use delivery::{DeliveryHandle, DeliveryPool, Liveness};
pub use domain::{
    callback, market_pair, Callback, DeliveryConfig, FillEntry, NotifierConfig, Stream,
    SubscriptionRegistry, WatchKey,
};
pub use error::{DeliveryError, NotifyError};
pub use ports::{KeyReferenceIndex, LedgerObserver, LedgerReader};
pub use service::{FullAccount, NotifierSession, SessionHub, SharedSession, MAX_ACCOUNT_LOOKUP};
