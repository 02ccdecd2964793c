//! Ports Layer - Hexagonal Architecture boundaries
//!
//! Inbound ports define the signals the ledger drives into the notifier.
//! Outbound ports define the ledger reads the notifier depends on.

pub mod inbound;
pub mod outbound;

pub use inbound::LedgerObserver;
pub use outbound::{KeyReferenceIndex, LedgerReader};
