//! Error types for the change notifier
//!
//! Nothing in this module is ever returned from a ledger signal handler:
//! those swallow, log and count. These errors surface only from the
//! request-shaped session API and from construction.

use ln_01_membership_filter::FilterError;
use shared_types::AssetId;
use thiserror::Error;

/// Errors returned synchronously from subscription requests
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NotifyError {
    /// Subscriber asked for every create/remove but the node disallows it
    #[error("Subscribe to all objects is disabled on this node")]
    SubscribeToAllDisabled,

    /// A market needs two distinct assets
    #[error("Cannot subscribe to market of asset {asset} against itself")]
    SameAssetMarket { asset: AssetId },

    #[error("Invalid notifier configuration: {0}")]
    InvalidConfig(String),

    /// Delivery workers can only be spawned inside a tokio runtime
    #[error("Delivery pool must be started from within a tokio runtime")]
    NoRuntime,

    #[error("Membership filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Request limit exceeded: {requested} > {max}")]
    LimitExceeded { requested: usize, max: usize },
}

/// Errors a subscriber transport reports back from a callback.
///
/// Logged and counted by the delivery worker, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("Subscriber connection is closed")]
    Disconnected,

    #[error("Transport error: {0}")]
    Transport(String),
}
