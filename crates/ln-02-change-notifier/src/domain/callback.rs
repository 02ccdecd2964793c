//! Subscriber callbacks and the streams they are delivered on

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::DeliveryError;

/// A subscriber sink. Receives one JSON payload per scheduled batch.
///
/// Shared ownership lets a scheduled job outlive the registry entry it was
/// captured from.
pub type Callback = Arc<dyn Fn(Value) -> Result<(), DeliveryError> + Send + Sync>;

/// Wrap a closure as a [`Callback`].
pub fn callback<F>(f: F) -> Callback
where
    F: Fn(Value) -> Result<(), DeliveryError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Which subscription a delivery belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stream {
    /// Generic object updates
    Updates,
    /// Per-trading-pair market updates and fills
    Market,
    PendingTransactions,
    BlockApplied,
}

impl Stream {
    /// Metric and log label
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Updates => "updates",
            Self::Market => "market",
            Self::PendingTransactions => "pending_tx",
            Self::BlockApplied => "block_applied",
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
