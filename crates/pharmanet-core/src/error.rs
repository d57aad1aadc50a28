//! # Error Types
//!
//! Errors raised by the foundational types. Contract-level failures live in
//! `pharmanet-contracts`; ledger failures live in `pharmanet-ledger`.

use thiserror::Error;

/// Error raised while constructing or parsing a core type.
#[derive(Error, Debug)]
pub enum CoreError {
    /// An identifier failed validation.
    #[error("invalid {kind}: {reason}")]
    InvalidIdentifier {
        /// Which identifier type was being constructed.
        kind: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A digest could not be parsed.
    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    /// A timestamp could not be parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical records; encode amounts as strings: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
