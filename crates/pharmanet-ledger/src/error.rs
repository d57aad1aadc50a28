//! # Ledger Error Types
//!
//! Failures reported by the ledger collaborator. Contracts translate these
//! into their own taxonomy: `CollectionAccess` becomes a collection access
//! error, `NoIdentity` an identity error, everything else a ledger I/O error.

use thiserror::Error;

/// Errors from ledger stub and client-identity calls.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The transaction carries no resolvable client identity.
    #[error("transaction has no client identity")]
    NoIdentity,

    /// The calling organization is not a member of the collection.
    #[error("organization {msp_id} is not a member of collection {collection}")]
    CollectionAccess {
        /// Collection name.
        collection: String,
        /// MSP that attempted the access.
        msp_id: String,
    },

    /// The named private data collection is not defined on the channel.
    #[error("collection {0} is not defined")]
    UnknownCollection(String),

    /// A rich-query selector could not be parsed.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A key was empty or contained a reserved character.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// `next()` was called on an exhausted or closed iterator.
    #[error("iterator has no more results")]
    IteratorExhausted,

    /// A key read by the transaction changed before it committed.
    #[error("MVCC read conflict on key {key}")]
    MvccConflict {
        /// Key whose committed version moved.
        key: String,
    },

    /// The ledger cannot serve requests.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// Snapshot (de)serialization failed.
    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Snapshot file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
