//! # Shared Types Crate
//!
//! Ledger domain types shared by the membership filter, the change notifier
//! and the test suite.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: object ids, ledger records, operations and
//!   blocks are defined once, here.
//! - **Wire Form Is Serde Form**: the JSON produced by `serde_json` for these
//!   types is exactly what subscribers receive.
//! - **Canonical Markets**: `TradingPair` can only be built lower-id-first.

pub mod entities;
pub mod errors;
pub mod ids;

pub use entities::*;
pub use errors::*;
pub use ids::*;
