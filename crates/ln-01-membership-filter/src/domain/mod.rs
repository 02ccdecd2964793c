//! Domain Layer - Pure business logic
//!
//! This layer contains:
//! - Core bloom filter implementation
//! - Hash functions
//! - Parameter calculations
//! - Configuration
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod bloom_filter;
pub mod config;
pub mod hash_functions;
pub mod parameters;

pub use bloom_filter::BloomFilter;
pub use config::{FilterParameters, FilterParametersBuilder};
pub use parameters::{calculate_optimal_parameters, capped_parameters, BloomFilterParams};
