//! # In-Memory Reference Ledger
//!
//! A single-process ledger implementing [`ChaincodeStub`],
//! [`ClientIdentity`], and [`TransactionContext`]. It is a faithful enough
//! model of the host platform to exercise every contract rule:
//!
//! - Each [`MemoryTransaction`] buffers its writes and sees them on later
//!   reads (read-your-own-writes). Nothing is visible to other transactions
//!   until [`MemoryTransaction::commit`].
//! - Commit validates the read set against current key versions (MVCC) and
//!   applies all writes under one lock, or none of them.
//! - Private writes are applied to the collection; the block log carries
//!   only `(collection, key, sha256)` for them. Transient data is never
//!   logged.
//!
//! The handle is cheap to clone and safe to share between threads.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, VecDeque};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use pharmanet_core::{sha256_bytes, ContentDigest, MspId, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collection::CollectionConfig;
use crate::error::LedgerError;
use crate::query::Selector;
use crate::stub::{
    is_composite_key, ChaincodeStub, ClientIdentity, HistoryQueryIterator, KeyModification,
    KeyValue, ResultsIterator, StateQueryIterator, TransactionContext,
};

// ─── Persisted state ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Versioned {
    value: Vec<u8>,
    version: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PrivateEntry {
    value: Vec<u8>,
    hash: ContentDigest,
    version: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PrivateCollection {
    config: CollectionConfig,
    entries: BTreeMap<String, PrivateEntry>,
}

/// A public world-state write as recorded in the block log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicWrite {
    /// Key written.
    pub key: String,
    /// Value written, `None` for a delete.
    pub value: Option<Vec<u8>>,
}

/// A private write as recorded in the block log: the hash only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateWriteHash {
    /// Collection written.
    pub collection: String,
    /// Key written.
    pub key: String,
    /// SHA-256 of the value written, `None` for a delete.
    pub hash: Option<ContentDigest>,
}

/// One committed transaction in the public log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEntry {
    /// Height at which the transaction committed.
    pub block_number: u64,
    /// Transaction identifier.
    pub tx_id: String,
    /// Transaction timestamp.
    pub timestamp: Timestamp,
    /// Submitting organization, if the transaction carried an identity.
    pub creator: Option<MspId>,
    /// Public writes, in key order.
    pub public_writes: Vec<PublicWrite>,
    /// Hashes of private writes, in `(collection, key)` order.
    pub private_writes: Vec<PrivateWriteHash>,
}

/// Complete ledger contents. Serializable for persistence between CLI runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    height: u64,
    world: BTreeMap<String, Versioned>,
    collections: BTreeMap<String, PrivateCollection>,
    history: BTreeMap<String, Vec<KeyModification>>,
    blocks: Vec<BlockEntry>,
}

impl LedgerSnapshot {
    /// Number of committed blocks.
    pub fn height(&self) -> u64 {
        self.height
    }

    /// The public block log.
    pub fn blocks(&self) -> &[BlockEntry] {
        &self.blocks
    }

    /// Write the snapshot as pretty JSON.
    ///
    /// The bytes go to a sibling `.tmp` file which is then renamed over
    /// `path`, so a reader sees either the old snapshot or the new one.
    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        let json = serde_json::to_vec_pretty(self)?;
        let temp_path = temp_path_for(path);
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(&json)?;
        file.sync_all()?;
        drop(file);
        if let Err(e) = std::fs::rename(&temp_path, path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }

    /// Read a snapshot written by [`LedgerSnapshot::save`].
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        let raw = std::fs::read(path)?;
        Ok(serde_json::from_slice(&raw)?)
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Transaction identifier.
    pub tx_id: String,
    /// Block the transaction landed in; `None` for read-only transactions.
    pub block_number: Option<u64>,
}

// ─── Ledger handle ───────────────────────────────────────────────────

/// Shared handle to an in-memory ledger.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    state: Arc<RwLock<LedgerSnapshot>>,
    open_iterators: Arc<AtomicUsize>,
    offline: Arc<AtomicBool>,
}

impl MemoryLedger {
    /// An empty ledger with no collections defined.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a ledger from a snapshot.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        Self {
            state: Arc::new(RwLock::new(snapshot)),
            ..Self::default()
        }
    }

    /// Copy the current committed contents.
    pub fn snapshot(&self) -> LedgerSnapshot {
        self.state.read().clone()
    }

    /// Define or reconfigure a private data collection. Existing entries are kept.
    pub fn define_collection(&self, config: CollectionConfig) {
        let mut state = self.state.write();
        match state.collections.entry(config.name.clone()) {
            Entry::Occupied(mut existing) => existing.get_mut().config = config,
            Entry::Vacant(slot) => {
                slot.insert(PrivateCollection {
                    config,
                    entries: BTreeMap::new(),
                });
            }
        }
    }

    /// Configuration of a collection, if defined.
    pub fn collection_config(&self, name: &str) -> Option<CollectionConfig> {
        self.state.read().collections.get(name).map(|c| c.config.clone())
    }

    /// Start a transaction submitted by `msp_id`.
    pub fn begin(&self, msp_id: MspId) -> MemoryTransaction {
        MemoryTransaction::new(self.clone(), Some(msp_id))
    }

    /// Start a transaction whose client identity cannot be resolved.
    pub fn begin_anonymous(&self) -> MemoryTransaction {
        MemoryTransaction::new(self.clone(), None)
    }

    /// Number of committed blocks.
    pub fn height(&self) -> u64 {
        self.state.read().height
    }

    /// Copy of the public block log.
    pub fn blocks(&self) -> Vec<BlockEntry> {
        self.state.read().blocks.clone()
    }

    /// Iterators handed out and not yet closed.
    pub fn open_iterators(&self) -> usize {
        self.open_iterators.load(Ordering::SeqCst)
    }

    /// While offline, every stub call fails with `LedgerError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), LedgerError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(LedgerError::Unavailable("peer is offline".into()))
        } else {
            Ok(())
        }
    }
}

// ─── Transactions ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum StateKey {
    Public(String),
    Private(String, String),
}

impl std::fmt::Display for StateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Public(key) => write!(f, "{key:?}"),
            Self::Private(collection, key) => write!(f, "{collection}/{key:?}"),
        }
    }
}

#[derive(Debug, Default)]
struct RwSet {
    reads: BTreeMap<StateKey, Option<u64>>,
    public_writes: BTreeMap<String, Option<Vec<u8>>>,
    private_writes: BTreeMap<(String, String), Option<Vec<u8>>>,
}

impl RwSet {
    fn record_read(&mut self, key: StateKey, version: Option<u64>) {
        self.reads.entry(key).or_insert(version);
    }
}

/// One invocation's view of the ledger.
///
/// Dropping a transaction without committing discards its writes.
#[derive(Debug)]
pub struct MemoryTransaction {
    ledger: MemoryLedger,
    tx_id: String,
    timestamp: Timestamp,
    msp_id: Option<MspId>,
    transient: BTreeMap<String, Vec<u8>>,
    rwset: Mutex<RwSet>,
}

fn in_range(key: &str, start: &str, end: &str) -> bool {
    !is_composite_key(key) && (start.is_empty() || key >= start) && (end.is_empty() || key < end)
}

fn check_key(key: &str) -> Result<(), LedgerError> {
    if key.is_empty() {
        Err(LedgerError::InvalidKey("key must not be empty".into()))
    } else {
        Ok(())
    }
}

impl MemoryTransaction {
    fn new(ledger: MemoryLedger, msp_id: Option<MspId>) -> Self {
        Self {
            ledger,
            tx_id: Uuid::new_v4().simple().to_string(),
            timestamp: Timestamp::now(),
            msp_id,
            transient: BTreeMap::new(),
            rwset: Mutex::new(RwSet::default()),
        }
    }

    /// Attach one transient field.
    pub fn with_transient(mut self, field: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.transient.insert(field.into(), value.into());
        self
    }

    /// Override the transaction timestamp.
    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// This transaction's identifier.
    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }

    /// Validate the read set and apply all writes atomically.
    ///
    /// # Errors
    ///
    /// `LedgerError::MvccConflict` if any key read by this transaction was
    /// modified by a transaction that committed in the meantime. Nothing is
    /// written in that case.
    pub fn commit(self) -> Result<CommitReceipt, LedgerError> {
        self.ledger.ensure_online()?;
        let rw = self.rwset.into_inner();
        let mut state = self.ledger.state.write();

        for (key, seen) in &rw.reads {
            let current = match key {
                StateKey::Public(k) => state.world.get(k).map(|e| e.version),
                StateKey::Private(c, k) => state
                    .collections
                    .get(c)
                    .and_then(|col| col.entries.get(k))
                    .map(|e| e.version),
            };
            if current != *seen {
                tracing::warn!(tx_id = %self.tx_id, key = %key, "MVCC read conflict");
                return Err(LedgerError::MvccConflict {
                    key: key.to_string(),
                });
            }
        }
        for (collection, _) in rw.private_writes.keys() {
            if !state.collections.contains_key(collection) {
                return Err(LedgerError::UnknownCollection(collection.clone()));
            }
        }

        if rw.public_writes.is_empty() && rw.private_writes.is_empty() {
            return Ok(CommitReceipt {
                tx_id: self.tx_id,
                block_number: None,
            });
        }

        state.height += 1;
        let version = state.height;
        let mut public_log = Vec::with_capacity(rw.public_writes.len());
        let mut private_log = Vec::with_capacity(rw.private_writes.len());

        for (key, value) in rw.public_writes {
            match &value {
                Some(bytes) => {
                    state.world.insert(
                        key.clone(),
                        Versioned {
                            value: bytes.clone(),
                            version,
                        },
                    );
                }
                None => {
                    state.world.remove(&key);
                }
            }
            state
                .history
                .entry(key.clone())
                .or_default()
                .push(KeyModification {
                    tx_id: self.tx_id.clone(),
                    timestamp: self.timestamp,
                    is_delete: value.is_none(),
                    value: value.clone(),
                });
            public_log.push(PublicWrite { key, value });
        }

        for ((collection, key), value) in rw.private_writes {
            let hash = value.as_deref().map(sha256_bytes);
            if let Some(col) = state.collections.get_mut(&collection) {
                match (value, &hash) {
                    (Some(bytes), Some(digest)) => {
                        col.entries.insert(
                            key.clone(),
                            PrivateEntry {
                                value: bytes,
                                hash: digest.clone(),
                                version,
                            },
                        );
                    }
                    _ => {
                        col.entries.remove(&key);
                    }
                }
            }
            private_log.push(PrivateWriteHash {
                collection,
                key,
                hash,
            });
        }

        state.blocks.push(BlockEntry {
            block_number: version,
            tx_id: self.tx_id.clone(),
            timestamp: self.timestamp,
            creator: self.msp_id.clone(),
            public_writes: public_log,
            private_writes: private_log,
        });

        tracing::debug!(tx_id = %self.tx_id, block = version, "transaction committed");
        Ok(CommitReceipt {
            tx_id: self.tx_id,
            block_number: Some(version),
        })
    }

    fn caller(&self) -> Result<&MspId, LedgerError> {
        self.msp_id.as_ref().ok_or(LedgerError::NoIdentity)
    }

    fn check_collection(
        &self,
        state: &LedgerSnapshot,
        collection: &str,
        write: bool,
    ) -> Result<(), LedgerError> {
        let col = state
            .collections
            .get(collection)
            .ok_or_else(|| LedgerError::UnknownCollection(collection.to_string()))?;
        let caller = self.caller()?;
        let permitted = if write {
            col.config.may_write(caller)
        } else {
            col.config.may_read(caller)
        };
        if permitted {
            Ok(())
        } else {
            Err(LedgerError::CollectionAccess {
                collection: collection.to_string(),
                msp_id: caller.to_string(),
            })
        }
    }

    fn iterator<T: 'static>(&self, items: Vec<T>) -> Box<dyn ResultsIterator<Item = T>> {
        Box::new(VecIterator::new(items, &self.ledger.open_iterators))
    }

    /// Collect private entries passing `filter`, overlaid with this
    /// transaction's pending writes, recording reads of committed entries.
    fn private_scan(
        &self,
        collection: &str,
        filter: impl Fn(&str, &[u8]) -> bool,
    ) -> Result<Vec<KeyValue>, LedgerError> {
        let mut rw = self.rwset.lock();
        let state = self.ledger.state.read();
        self.check_collection(&state, collection, false)?;
        let mut merged = BTreeMap::new();
        if let Some(col) = state.collections.get(collection) {
            for (key, entry) in &col.entries {
                if filter(key.as_str(), entry.value.as_slice()) {
                    rw.record_read(
                        StateKey::Private(collection.to_string(), key.clone()),
                        Some(entry.version),
                    );
                    merged.insert(key.clone(), entry.value.clone());
                }
            }
        }
        for ((c, key), pending) in &rw.private_writes {
            if c != collection {
                continue;
            }
            match pending {
                Some(bytes) if filter(key.as_str(), bytes.as_slice()) => {
                    merged.insert(key.clone(), bytes.clone());
                }
                _ => {
                    merged.remove(key);
                }
            }
        }
        Ok(merged
            .into_iter()
            .map(|(key, value)| KeyValue { key, value })
            .collect())
    }

    fn world_scan(&self, filter: impl Fn(&str, &[u8]) -> bool) -> Vec<KeyValue> {
        let mut rw = self.rwset.lock();
        let state = self.ledger.state.read();
        let mut merged = BTreeMap::new();
        for (key, entry) in &state.world {
            if filter(key.as_str(), entry.value.as_slice()) {
                rw.record_read(StateKey::Public(key.clone()), Some(entry.version));
                merged.insert(key.clone(), entry.value.clone());
            }
        }
        for (key, pending) in &rw.public_writes {
            match pending {
                Some(bytes) if filter(key.as_str(), bytes.as_slice()) => {
                    merged.insert(key.clone(), bytes.clone());
                }
                _ => {
                    merged.remove(key);
                }
            }
        }
        merged
            .into_iter()
            .map(|(key, value)| KeyValue { key, value })
            .collect()
    }
}

impl ChaincodeStub for MemoryTransaction {
    fn get_tx_id(&self) -> &str {
        &self.tx_id
    }

    fn get_tx_timestamp(&self) -> Timestamp {
        self.timestamp
    }

    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        self.ledger.ensure_online()?;
        check_key(key)?;
        let mut rw = self.rwset.lock();
        if let Some(pending) = rw.public_writes.get(key) {
            return Ok(pending.clone());
        }
        let state = self.ledger.state.read();
        let entry = state.world.get(key);
        rw.record_read(StateKey::Public(key.to_string()), entry.map(|e| e.version));
        Ok(entry.map(|e| e.value.clone()))
    }

    fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        self.ledger.ensure_online()?;
        check_key(key)?;
        self.rwset
            .lock()
            .public_writes
            .insert(key.to_string(), Some(value));
        Ok(())
    }

    fn del_state(&self, key: &str) -> Result<(), LedgerError> {
        self.ledger.ensure_online()?;
        check_key(key)?;
        self.rwset.lock().public_writes.insert(key.to_string(), None);
        Ok(())
    }

    fn get_state_by_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<StateQueryIterator<'_>, LedgerError> {
        self.ledger.ensure_online()?;
        let items = self.world_scan(|key, _| in_range(key, start, end));
        Ok(self.iterator(items))
    }

    fn get_query_result(&self, query: &str) -> Result<StateQueryIterator<'_>, LedgerError> {
        self.ledger.ensure_online()?;
        let selector = Selector::parse(query)?;
        let items = self.world_scan(|_, value| selector.matches_bytes(value));
        Ok(self.iterator(items))
    }

    fn get_history_for_key(&self, key: &str) -> Result<HistoryQueryIterator<'_>, LedgerError> {
        self.ledger.ensure_online()?;
        check_key(key)?;
        let history = self
            .ledger
            .state
            .read()
            .history
            .get(key)
            .cloned()
            .unwrap_or_default();
        Ok(self.iterator(history))
    }

    fn get_private_data(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<Vec<u8>>, LedgerError> {
        self.ledger.ensure_online()?;
        check_key(key)?;
        let mut rw = self.rwset.lock();
        let state = self.ledger.state.read();
        self.check_collection(&state, collection, false)?;
        if let Some(pending) = rw
            .private_writes
            .get(&(collection.to_string(), key.to_string()))
        {
            return Ok(pending.clone());
        }
        let entry = state
            .collections
            .get(collection)
            .and_then(|c| c.entries.get(key));
        rw.record_read(
            StateKey::Private(collection.to_string(), key.to_string()),
            entry.map(|e| e.version),
        );
        Ok(entry.map(|e| e.value.clone()))
    }

    fn put_private_data(
        &self,
        collection: &str,
        key: &str,
        value: Vec<u8>,
    ) -> Result<(), LedgerError> {
        self.ledger.ensure_online()?;
        check_key(key)?;
        let mut rw = self.rwset.lock();
        self.check_collection(&self.ledger.state.read(), collection, true)?;
        rw.private_writes
            .insert((collection.to_string(), key.to_string()), Some(value));
        Ok(())
    }

    fn del_private_data(&self, collection: &str, key: &str) -> Result<(), LedgerError> {
        self.ledger.ensure_online()?;
        check_key(key)?;
        let mut rw = self.rwset.lock();
        self.check_collection(&self.ledger.state.read(), collection, true)?;
        rw.private_writes
            .insert((collection.to_string(), key.to_string()), None);
        Ok(())
    }

    fn get_private_data_hash(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<Vec<u8>>, LedgerError> {
        self.ledger.ensure_online()?;
        check_key(key)?;
        let mut rw = self.rwset.lock();
        if let Some(pending) = rw
            .private_writes
            .get(&(collection.to_string(), key.to_string()))
        {
            return Ok(pending.as_deref().map(|v| sha256_bytes(v).as_bytes().to_vec()));
        }
        let state = self.ledger.state.read();
        let col = state
            .collections
            .get(collection)
            .ok_or_else(|| LedgerError::UnknownCollection(collection.to_string()))?;
        let entry = col.entries.get(key);
        rw.record_read(
            StateKey::Private(collection.to_string(), key.to_string()),
            entry.map(|e| e.version),
        );
        Ok(entry.map(|e| e.hash.as_bytes().to_vec()))
    }

    fn get_private_data_query_result(
        &self,
        collection: &str,
        query: &str,
    ) -> Result<StateQueryIterator<'_>, LedgerError> {
        self.ledger.ensure_online()?;
        let selector = Selector::parse(query)?;
        let items = self.private_scan(collection, |_, value| selector.matches_bytes(value))?;
        Ok(self.iterator(items))
    }

    fn get_private_data_by_range(
        &self,
        collection: &str,
        start: &str,
        end: &str,
    ) -> Result<StateQueryIterator<'_>, LedgerError> {
        self.ledger.ensure_online()?;
        let items = self.private_scan(collection, |key, _| in_range(key, start, end))?;
        Ok(self.iterator(items))
    }

    fn get_transient(&self) -> Result<BTreeMap<String, Vec<u8>>, LedgerError> {
        self.ledger.ensure_online()?;
        Ok(self.transient.clone())
    }
}

impl ClientIdentity for MemoryTransaction {
    fn get_msp_id(&self) -> Result<MspId, LedgerError> {
        self.caller().cloned()
    }
}

impl TransactionContext for MemoryTransaction {
    fn stub(&self) -> &dyn ChaincodeStub {
        self
    }

    fn client_identity(&self) -> &dyn ClientIdentity {
        self
    }
}

// ─── Iterators ───────────────────────────────────────────────────────

struct VecIterator<T> {
    items: VecDeque<T>,
    open: Option<Arc<AtomicUsize>>,
}

impl<T> VecIterator<T> {
    fn new(items: Vec<T>, counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self {
            items: items.into(),
            open: Some(Arc::clone(counter)),
        }
    }
}

impl<T> ResultsIterator for VecIterator<T> {
    type Item = T;

    fn has_next(&self) -> bool {
        self.open.is_some() && !self.items.is_empty()
    }

    fn next(&mut self) -> Result<T, LedgerError> {
        if self.open.is_none() {
            return Err(LedgerError::IteratorExhausted);
        }
        self.items.pop_front().ok_or(LedgerError::IteratorExhausted)
    }

    fn close(&mut self) -> Result<(), LedgerError> {
        if let Some(counter) = self.open.take() {
            counter.fetch_sub(1, Ordering::SeqCst);
        }
        self.items.clear();
        Ok(())
    }
}
