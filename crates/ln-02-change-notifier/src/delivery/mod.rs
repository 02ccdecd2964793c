//! Asynchronous delivery of scheduled batches
//!
//! Ledger signal handlers only ever call [`DeliveryHandle::schedule`], which
//! never blocks. Worker tasks invoke subscriber callbacks later, off the
//! block-application path.

mod handle;
mod pool;

pub use handle::{DeliveryHandle, Liveness};
pub use pool::DeliveryPool;
