//! # pharmanet-ledger — The Ledger Collaborator Boundary
//!
//! Contracts never touch storage directly. Every invocation receives a
//! [`TransactionContext`] exposing two things: a [`ChaincodeStub`] for state
//! reads and writes, and a [`ClientIdentity`] naming the calling
//! organization. This crate defines those traits and ships
//! [`MemoryLedger`], an in-process implementation used by tests and by the
//! `pharmanet` CLI.
//!
//! ## What the in-memory ledger models
//!
//! - **World state**: a public, ordered key-value map with per-key history.
//! - **Private data collections**: partitions readable only by their member
//!   MSPs. The public block log records a SHA-256 hash for each private
//!   write, never the value.
//! - **Transient data**: per-invocation confidential input that is handed to
//!   the contract but never written to the block log.
//! - **MVCC**: each transaction records the version of every key it read;
//!   `commit()` rejects the transaction if any of those keys changed since.
//! - **Iterator accounting**: open iterators are counted so callers can
//!   verify that every query path released its iterator.
//!
//! Consensus, ordering, endorsement, and gossip are out of scope.

pub mod collection;
pub mod error;
pub mod memory;
pub mod query;
pub mod stub;

pub use collection::CollectionConfig;
pub use error::LedgerError;
pub use memory::{
    BlockEntry, CommitReceipt, LedgerSnapshot, MemoryLedger, MemoryTransaction, PrivateWriteHash,
    PublicWrite,
};
pub use query::Selector;
pub use stub::{
    composite_key, is_composite_key, ChaincodeStub, ClientIdentity, HistoryQueryIterator,
    KeyModification, KeyValue, ResultsIterator, StateQueryIterator, TransactionContext,
    COMPOSITE_KEY_NAMESPACE,
};
