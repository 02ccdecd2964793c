//! Adapters Layer - Port implementations

pub mod memory_ledger;

pub use memory_ledger::InMemoryLedger;
