//! Membership filter parameters and validation
//!
//! # Example
//!
//! ```ignore
//! use ln_01_membership_filter::FilterParametersBuilder;
//!
//! let params = FilterParametersBuilder::new()
//!     .projected_element_count(10_000)
//!     .false_positive_rate(0.01)
//!     .maximum_size_bits(131_072)
//!     .build()?;
//! ```

use serde::{Deserialize, Serialize};

use super::parameters::{capped_parameters, BloomFilterParams};
use crate::error::FilterError;

/// Default projected element count for a subscriber's filter.
pub const DEFAULT_PROJECTED_ELEMENTS: usize = 10_000;

/// Default target false positive rate.
pub const DEFAULT_FALSE_POSITIVE_RATE: f64 = 0.01;

/// Default hard cap on the bit array (16 KiB).
pub const DEFAULT_MAXIMUM_SIZE_BITS: usize = 1024 * 8 * 8 * 2;

/// Parameters fixed at filter construction time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterParameters {
    /// Number of items the filter is sized for
    pub projected_element_count: usize,
    /// Target false positive rate at the projected count
    pub false_positive_rate: f64,
    /// Absolute maximum size of the bit array
    pub maximum_size_bits: usize,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            projected_element_count: DEFAULT_PROJECTED_ELEMENTS,
            false_positive_rate: DEFAULT_FALSE_POSITIVE_RATE,
            maximum_size_bits: DEFAULT_MAXIMUM_SIZE_BITS,
        }
    }
}

impl FilterParameters {
    /// Create validated parameters
    pub fn new(
        projected_element_count: usize,
        false_positive_rate: f64,
        maximum_size_bits: usize,
    ) -> Result<Self, FilterError> {
        let params = Self {
            projected_element_count,
            false_positive_rate,
            maximum_size_bits,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if self.projected_element_count == 0 {
            return Err(FilterError::InvalidParameters(
                "projected_element_count cannot be 0".to_string(),
            ));
        }

        if !(self.false_positive_rate > 0.0 && self.false_positive_rate < 1.0) {
            return Err(FilterError::InvalidFPR {
                fpr: self.false_positive_rate,
            });
        }

        if self.maximum_size_bits == 0 {
            return Err(FilterError::InvalidParameters(
                "maximum_size_bits cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Concrete sizing honoring the size cap.
    pub fn sizing(&self) -> BloomFilterParams {
        capped_parameters(
            self.projected_element_count,
            self.false_positive_rate,
            self.maximum_size_bits,
        )
    }

    pub fn with_projected_element_count(mut self, count: usize) -> Self {
        self.projected_element_count = count;
        self
    }

    pub fn with_false_positive_rate(mut self, fpr: f64) -> Self {
        self.false_positive_rate = fpr;
        self
    }

    pub fn with_maximum_size_bits(mut self, bits: usize) -> Self {
        self.maximum_size_bits = bits;
        self
    }
}

/// Fluent builder for [`FilterParameters`]; unset fields take defaults.
#[derive(Default)]
pub struct FilterParametersBuilder {
    projected_element_count: Option<usize>,
    false_positive_rate: Option<f64>,
    maximum_size_bits: Option<usize>,
}

impl FilterParametersBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projected_element_count(mut self, count: usize) -> Self {
        self.projected_element_count = Some(count);
        self
    }

    pub fn false_positive_rate(mut self, fpr: f64) -> Self {
        self.false_positive_rate = Some(fpr);
        self
    }

    pub fn maximum_size_bits(mut self, bits: usize) -> Self {
        self.maximum_size_bits = Some(bits);
        self
    }

    pub fn build(self) -> Result<FilterParameters, FilterError> {
        let defaults = FilterParameters::default();
        FilterParameters::new(
            self.projected_element_count
                .unwrap_or(defaults.projected_element_count),
            self.false_positive_rate
                .unwrap_or(defaults.false_positive_rate),
            self.maximum_size_bits.unwrap_or(defaults.maximum_size_bits),
        )
    }
}
