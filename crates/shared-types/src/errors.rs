//! # Error Types
//!
//! Defines error types used across crates.

use thiserror::Error;

/// Errors raised while parsing identifiers from their string form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    /// Not of the form `space.type.instance`.
    #[error("Malformed object id: {0}")]
    Malformed(String),

    /// Well-formed, but addresses a different object kind.
    #[error("Object id {id} is not a {expected}")]
    WrongKind { id: String, expected: &'static str },

    /// Hex payload could not be decoded.
    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),
}
