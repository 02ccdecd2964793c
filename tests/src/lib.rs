//! # Ledger Notifier Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Criterion benchmarks (filter probes, change dispatch)
//! └── src/integration/  # End-to-end scenarios through the session hub
//!     ├── fixtures.rs
//!     ├── subscription_flows.rs
//!     └── market_flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ln-tests
//! cargo test -p ln-tests integration::market_flows
//! cargo bench -p ln-tests
//! ```

#![allow(unused_variables)]
#![allow(dead_code)]

pub mod integration;
