//! Domain Layer - Subscription state and grouping logic
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod callback;
pub mod config;
pub mod interest;
pub mod market;
pub mod registry;

pub use callback::{callback, Callback, Stream};
pub use config::{DeliveryConfig, NotifierConfig};
pub use interest::WatchKey;
pub use market::{group_fills, FillEntry, MarketQueues};
pub use registry::{market_pair, SubscriptionRegistry};
