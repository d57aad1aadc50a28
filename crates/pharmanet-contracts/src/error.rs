//! # Contract Error Types
//!
//! Every handler surfaces the first failure it meets, unchanged, to the
//! invoking gateway. Nothing is retried here; retry policy belongs to the
//! client.

use pharmanet_core::{CanonicalizationError, CoreError};
use pharmanet_ledger::LedgerError;
use thiserror::Error;

use crate::policy::Operation;

/// Failure of a contract invocation.
#[derive(Error, Debug)]
pub enum ContractError {
    /// The caller's organization could not be resolved from the context.
    #[error("cannot resolve caller identity: {0}")]
    Identity(String),

    /// The caller's organization may not perform the operation.
    #[error("MSP {msp_id} is not permitted to {operation}")]
    Authorization {
        /// The denied operation.
        operation: Operation,
        /// The caller's MSP.
        msp_id: String,
    },

    /// A key required to be present is absent.
    #[error("{kind} {id} does not exist")]
    NotFound {
        /// Record kind, e.g. `medicine`.
        kind: &'static str,
        /// The missing key.
        id: String,
    },

    /// A key required to be absent is present.
    #[error("{kind} {id} already exists")]
    AlreadyExists {
        /// Record kind.
        kind: &'static str,
        /// The existing key.
        id: String,
    },

    /// A confidential field is absent from the transient payload.
    #[error("{field} not specified in transient data")]
    MissingConfidentialField {
        /// Name of the first missing field.
        field: &'static str,
    },

    /// The caller is not a member of the private collection it tried to read.
    #[error("MSP {msp_id} cannot access collection {collection}")]
    CollectionAccess {
        /// Collection name.
        collection: String,
        /// The caller's MSP.
        msp_id: String,
    },

    /// Stored bytes do not decode to the expected record shape.
    #[error("cannot decode {kind} at key {key:?}: {reason}")]
    Decode {
        /// Expected record kind.
        kind: &'static str,
        /// Key the bytes were read from.
        key: String,
        /// Decoder message.
        reason: String,
    },

    /// A record could not be encoded for storage.
    #[error("cannot encode record: {0}")]
    Encode(#[from] CanonicalizationError),

    /// A ledger call failed.
    #[error("ledger I/O error: {0}")]
    LedgerIo(#[source] LedgerError),

    /// A positional or transient argument is malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The router has no such `Contract:Function`.
    #[error("unknown function {0}")]
    UnknownFunction(String),
}

impl ContractError {
    /// Stable machine-readable code for gateway responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Identity(_) => "IDENTITY_ERROR",
            Self::Authorization { .. } => "AUTHORIZATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AlreadyExists { .. } => "ALREADY_EXISTS",
            Self::MissingConfidentialField { .. } => "MISSING_CONFIDENTIAL_FIELD",
            Self::CollectionAccess { .. } => "COLLECTION_ACCESS_ERROR",
            Self::Decode { .. } => "DECODE_ERROR",
            Self::Encode(_) => "ENCODE_ERROR",
            Self::LedgerIo(_) => "LEDGER_IO_ERROR",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::UnknownFunction(_) => "UNKNOWN_FUNCTION",
        }
    }
}

impl From<LedgerError> for ContractError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NoIdentity => Self::Identity(err.to_string()),
            LedgerError::CollectionAccess { collection, msp_id } => {
                Self::CollectionAccess { collection, msp_id }
            }
            other => Self::LedgerIo(other),
        }
    }
}

impl From<CoreError> for ContractError {
    fn from(err: CoreError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}
