//! # LN-01 Membership Filter
//!
//! Probabilistic set used by subscriber sessions to remember which object
//! ids, public keys and addresses they asked about.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `BloomFilter`: Core probabilistic data structure
//!   - `FilterParameters`: Projected count, target FPR and hard size cap
//!   - `FilterParametersBuilder`: Fluent builder for parameters
//!
//! ## Invariants
//!
//! - **Bounded FPR**: FPR = (1 - e^(-kn/m))^k <= target_fpr at the projected count
//! - **No False Negatives**: No false negatives - if inserted, contains() MUST return true
//! - **Size Cap**: The bit array never exceeds `maximum_size_bits`
//!
//! ## Usage Example
//!
//! ```ignore
//! use ln_01_membership_filter::{BloomFilter, FilterParameters};
//!
//! let mut filter = BloomFilter::with_parameters(&FilterParameters::default());
//! filter.insert(b"1.2.17");
//!
//! assert!(filter.contains(b"1.2.17"));
//! ```
//!
//! The filter is a fast-reject only: a positive probe means "look closer",
//! never "authorized".

pub mod domain;
pub mod error;

pub use domain::{
    capped_parameters, BloomFilter, BloomFilterParams, FilterParameters, FilterParametersBuilder,
};
pub use error::FilterError;
