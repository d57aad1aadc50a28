//! # Query Projection
//!
//! Turns ledger iterators into typed records. Every iterator is wrapped in
//! a [`ScopedIterator`] the moment the ledger hands it out; the wrapper
//! closes it when dropped, so early returns, `?` propagation, and decode
//! failures all release the host-side cursor.
//!
//! Bulk listings skip records that fail to decode or carry another asset
//! type. A single corrupt record must not hide every valid one.

use pharmanet_ledger::{KeyModification, KeyValue, LedgerError, ResultsIterator};

use crate::error::ContractError;
use crate::model::{HistoryEntry, Medicine};
use crate::record::LedgerRecord;

/// A ledger iterator that is closed on drop.
pub struct ScopedIterator<'a, T> {
    inner: Option<Box<dyn ResultsIterator<Item = T> + 'a>>,
}

impl<'a, T> ScopedIterator<'a, T> {
    /// Take ownership of a freshly opened ledger iterator.
    pub fn new(inner: Box<dyn ResultsIterator<Item = T> + 'a>) -> Self {
        Self { inner: Some(inner) }
    }

    /// Close now and report any error from the ledger.
    pub fn close(mut self) -> Result<(), ContractError> {
        match self.inner.take() {
            Some(mut it) => Ok(it.close()?),
            None => Ok(()),
        }
    }
}

impl<T> Iterator for ScopedIterator<'_, T> {
    type Item = Result<T, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        let it = self.inner.as_mut()?;
        if it.has_next() {
            Some(it.next())
        } else {
            None
        }
    }
}

impl<T> Drop for ScopedIterator<'_, T> {
    fn drop(&mut self) {
        if let Some(mut it) = self.inner.take() {
            if let Err(e) = it.close() {
                tracing::warn!(error = %e, "failed to close ledger iterator");
            }
        }
    }
}

impl<T> std::fmt::Debug for ScopedIterator<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedIterator")
            .field("open", &self.inner.is_some())
            .finish()
    }
}

/// Decode every record of type `R`, skipping the rest.
///
/// # Errors
///
/// Ledger failures while advancing abort the listing; the iterator is
/// still closed.
pub fn project_records<R: LedgerRecord>(
    mut results: ScopedIterator<'_, KeyValue>,
) -> Result<Vec<R>, ContractError> {
    let mut records = Vec::new();
    while let Some(item) = results.next() {
        let kv = item?;
        match R::decode(&kv.key, &kv.value) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(key = %kv.key.escape_debug(), error = %e, "skipping record"),
        }
    }
    results.close()?;
    Ok(records)
}

/// Project the modification history of a medicine key.
///
/// Versions whose bytes no longer decode are reported with no record.
pub fn project_history(
    mut results: ScopedIterator<'_, KeyModification>,
    key: &str,
) -> Result<Vec<HistoryEntry>, ContractError> {
    let mut entries = Vec::new();
    while let Some(item) = results.next() {
        let KeyModification {
            tx_id,
            timestamp,
            value,
            is_delete,
        } = item?;
        let record = match value {
            Some(raw) if !is_delete => match Medicine::decode(key, &raw) {
                Ok(m) => Some(m),
                Err(e) => {
                    tracing::warn!(key, tx_id = %tx_id, error = %e, "undecodable history entry");
                    None
                }
            },
            _ => None,
        };
        entries.push(HistoryEntry {
            record,
            tx_id,
            timestamp,
            is_delete,
        });
    }
    results.close()?;
    Ok(entries)
}
