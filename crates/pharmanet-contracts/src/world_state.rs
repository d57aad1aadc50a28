//! # World-State Accessor
//!
//! Typed access to the public key-value state. Every call is a round-trip
//! to the stub; nothing is cached, so a value read before a write in the
//! same invocation must be re-read afterwards.

use pharmanet_ledger::{ChaincodeStub, KeyModification, KeyValue};

use crate::error::ContractError;
use crate::projection::ScopedIterator;
use crate::record::LedgerRecord;

/// World state as seen by one invocation.
#[derive(Clone, Copy)]
pub struct WorldState<'a> {
    stub: &'a dyn ChaincodeStub,
}

impl<'a> WorldState<'a> {
    pub fn new(stub: &'a dyn ChaincodeStub) -> Self {
        Self { stub }
    }

    /// Whether `key` holds a value.
    pub fn exists(&self, key: &str) -> Result<bool, ContractError> {
        Ok(self.stub.get_state(key)?.is_some())
    }

    /// Read and decode the record at `key`.
    ///
    /// # Errors
    ///
    /// `NotFound` if absent, `Decode` if the bytes are not an `R`.
    pub fn get<R: LedgerRecord>(&self, key: &str) -> Result<R, ContractError> {
        self.try_get(key)?.ok_or_else(|| ContractError::NotFound {
            kind: R::KIND,
            id: key.to_string(),
        })
    }

    /// Read and decode the record at `key`, if any.
    pub fn try_get<R: LedgerRecord>(&self, key: &str) -> Result<Option<R>, ContractError> {
        match self.stub.get_state(key)? {
            Some(raw) => R::decode(key, &raw).map(Some),
            None => Ok(None),
        }
    }

    /// Encode and write `record` at `key`.
    pub fn put<R: LedgerRecord>(&self, key: &str, record: &R) -> Result<(), ContractError> {
        let bytes = record.encode()?;
        tracing::debug!(key = %key.escape_debug(), len = bytes.len(), "put state");
        self.stub.put_state(key, bytes.into_vec())?;
        Ok(())
    }

    pub fn delete(&self, key: &str) -> Result<(), ContractError> {
        tracing::debug!(key = %key.escape_debug(), "delete state");
        self.stub.del_state(key)?;
        Ok(())
    }

    /// Run a `{"selector": ...}` query.
    pub fn rich_query(
        &self,
        query: &serde_json::Value,
    ) -> Result<ScopedIterator<'a, KeyValue>, ContractError> {
        let it = self.stub.get_query_result(&query.to_string())?;
        Ok(ScopedIterator::new(it))
    }

    /// Scan plain keys in `[start, end)`; empty bounds are open.
    pub fn range_query(
        &self,
        start: &str,
        end: &str,
    ) -> Result<ScopedIterator<'a, KeyValue>, ContractError> {
        let it = self.stub.get_state_by_range(start, end)?;
        Ok(ScopedIterator::new(it))
    }

    /// Committed versions of `key`, oldest first.
    pub fn history(&self, key: &str) -> Result<ScopedIterator<'a, KeyModification>, ContractError> {
        let it = self.stub.get_history_for_key(key)?;
        Ok(ScopedIterator::new(it))
    }

    /// Composite key for `object_type` and `attributes`.
    pub fn composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> Result<String, ContractError> {
        Ok(self.stub.create_composite_key(object_type, attributes)?)
    }
}
