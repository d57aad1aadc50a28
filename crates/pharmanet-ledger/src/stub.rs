//! # Chaincode Stub and Client Identity
//!
//! The per-invocation interface a contract consumes from the host ledger.
//! All calls are synchronous request/response round-trips. Nothing here is
//! cached by the contract layer; each call reflects the ledger's view for
//! the current transaction.

use std::collections::BTreeMap;

use pharmanet_core::{MspId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Prefix reserved for composite keys. Range scans over plain keys skip
/// everything in this namespace.
pub const COMPOSITE_KEY_NAMESPACE: char = '\u{0}';

/// One key/value pair returned by a range or rich query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    /// The ledger key.
    pub key: String,
    /// The raw stored bytes.
    pub value: Vec<u8>,
}

/// One historical modification of a world-state key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyModification {
    /// Transaction that wrote this version.
    pub tx_id: String,
    /// Transaction timestamp.
    pub timestamp: Timestamp,
    /// Value written, or `None` for a delete.
    pub value: Option<Vec<u8>>,
    /// Whether this modification deleted the key.
    pub is_delete: bool,
}

/// A finite, non-restartable cursor over query results.
///
/// The iterator is bound to one transaction. It must be closed before the
/// invocation returns; `close()` is idempotent.
pub trait ResultsIterator {
    /// The element type yielded.
    type Item;

    /// Whether another result is available.
    fn has_next(&self) -> bool;

    /// Advance and return the next result.
    ///
    /// # Errors
    ///
    /// `LedgerError::IteratorExhausted` once the results are consumed or the
    /// iterator was closed.
    fn next(&mut self) -> Result<Self::Item, LedgerError>;

    /// Release the iterator's host-side resources.
    fn close(&mut self) -> Result<(), LedgerError>;
}

/// Iterator over world-state or private-data query results.
pub type StateQueryIterator<'a> = Box<dyn ResultsIterator<Item = KeyValue> + 'a>;

/// Iterator over the modification history of a key.
pub type HistoryQueryIterator<'a> = Box<dyn ResultsIterator<Item = KeyModification> + 'a>;

/// Build a composite key `NUL objectType NUL attr1 NUL ... NUL`.
///
/// # Errors
///
/// `LedgerError::InvalidKey` if the object type is empty or any part
/// contains a NUL.
pub fn composite_key(object_type: &str, attributes: &[&str]) -> Result<String, LedgerError> {
    if object_type.is_empty() {
        return Err(LedgerError::InvalidKey("composite key object type is empty".into()));
    }
    let mut key = String::new();
    key.push(COMPOSITE_KEY_NAMESPACE);
    for part in std::iter::once(&object_type).chain(attributes.iter()) {
        if part.contains(COMPOSITE_KEY_NAMESPACE) {
            return Err(LedgerError::InvalidKey(format!(
                "composite key part {part:?} contains NUL"
            )));
        }
        key.push_str(part);
        key.push(COMPOSITE_KEY_NAMESPACE);
    }
    Ok(key)
}

/// Whether `key` lives in the composite-key namespace.
pub fn is_composite_key(key: &str) -> bool {
    key.starts_with(COMPOSITE_KEY_NAMESPACE)
}

/// State access for one transaction.
pub trait ChaincodeStub {
    /// Identifier of the current transaction.
    fn get_tx_id(&self) -> &str;

    /// Timestamp the client assigned to the current transaction.
    fn get_tx_timestamp(&self) -> Timestamp;

    /// Read a world-state value. `Ok(None)` if the key is absent.
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Write a world-state value.
    fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError>;

    /// Delete a world-state key.
    fn del_state(&self, key: &str) -> Result<(), LedgerError>;

    /// Scan plain world-state keys in `[start, end)`. An empty bound is open.
    fn get_state_by_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<StateQueryIterator<'_>, LedgerError>;

    /// Run a rich query (`{"selector": {...}}`) over world state.
    fn get_query_result(&self, query: &str) -> Result<StateQueryIterator<'_>, LedgerError>;

    /// Committed modification history of a world-state key.
    fn get_history_for_key(&self, key: &str) -> Result<HistoryQueryIterator<'_>, LedgerError>;

    /// Read a private value. Fails for non-members of the collection.
    fn get_private_data(&self, collection: &str, key: &str)
        -> Result<Option<Vec<u8>>, LedgerError>;

    /// Write a private value. The block log records only its hash.
    fn put_private_data(
        &self,
        collection: &str,
        key: &str,
        value: Vec<u8>,
    ) -> Result<(), LedgerError>;

    /// Delete a private value.
    fn del_private_data(&self, collection: &str, key: &str) -> Result<(), LedgerError>;

    /// Public SHA-256 hash of a private value. Readable by every organization.
    fn get_private_data_hash(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Run a rich query over a private collection.
    fn get_private_data_query_result(
        &self,
        collection: &str,
        query: &str,
    ) -> Result<StateQueryIterator<'_>, LedgerError>;

    /// Scan plain private keys in `[start, end)`.
    fn get_private_data_by_range(
        &self,
        collection: &str,
        start: &str,
        end: &str,
    ) -> Result<StateQueryIterator<'_>, LedgerError>;

    /// Confidential input supplied alongside the transaction.
    fn get_transient(&self) -> Result<BTreeMap<String, Vec<u8>>, LedgerError>;

    /// Build a composite key. See [`composite_key`].
    fn create_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> Result<String, LedgerError> {
        composite_key(object_type, attributes)
    }
}

/// The verified identity of the submitting client.
pub trait ClientIdentity {
    /// The MSP the client's certificate was issued by.
    fn get_msp_id(&self) -> Result<MspId, LedgerError>;
}

/// Everything a contract receives for one invocation.
pub trait TransactionContext {
    /// State access.
    fn stub(&self) -> &dyn ChaincodeStub;

    /// Caller identity.
    fn client_identity(&self) -> &dyn ClientIdentity;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_key_layout() {
        let key = composite_key("PharmacyAssignment", &["MED-1"]).unwrap();
        assert_eq!(key, "\u{0}PharmacyAssignment\u{0}MED-1\u{0}");
        assert!(is_composite_key(&key));
        assert!(!is_composite_key("MED-1"));
    }

    #[test]
    fn composite_key_rejects_nul_and_empty_type() {
        assert!(composite_key("", &["a"]).is_err());
        assert!(composite_key("T", &["a\u{0}b"]).is_err());
    }
}
