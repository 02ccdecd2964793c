//! Error types for the membership filter

use thiserror::Error;

/// Errors raised while configuring a membership filter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("Invalid false positive rate: {fpr} (must be strictly between 0 and 1)")]
    InvalidFPR { fpr: f64 },

    #[error("Invalid filter parameters: {0}")]
    InvalidParameters(String),
}
