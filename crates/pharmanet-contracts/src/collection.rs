//! # Confidential Collection Accessor
//!
//! Reads and writes against one private data collection. Only member
//! organizations can read or write values; every organization can read the
//! SHA-256 hash the ledger publishes for each key. [`ConfidentialCollection::commit`]
//! is the write path: the payload goes to the members, the public log gets
//! the hash.
//!
//! Confidential input never arrives as a positional argument. It is read
//! from the transient map with [`read_confidential_fields`], which is
//! all-or-nothing.

use std::collections::BTreeMap;

use pharmanet_core::{sha256_digest, ContentDigest};
use pharmanet_ledger::{ChaincodeStub, KeyValue};

use crate::error::ContractError;
use crate::projection::ScopedIterator;
use crate::record::LedgerRecord;

/// A named private collection as seen by one invocation.
#[derive(Clone, Copy)]
pub struct ConfidentialCollection<'a> {
    stub: &'a dyn ChaincodeStub,
    name: &'a str,
}

impl<'a> ConfidentialCollection<'a> {
    pub fn new(stub: &'a dyn ChaincodeStub, name: &'a str) -> Self {
        Self { stub, name }
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Whether a value is committed at `key`. Answered from the public hash,
    /// so any organization may ask.
    pub fn exists(&self, key: &str) -> Result<bool, ContractError> {
        Ok(self.hash(key)?.is_some())
    }

    /// The public commitment hash at `key`.
    pub fn hash(&self, key: &str) -> Result<Option<ContentDigest>, ContractError> {
        match self.stub.get_private_data_hash(self.name, key)? {
            Some(raw) => ContentDigest::from_slice(&raw)
                .map(Some)
                .map_err(|e| ContractError::Decode {
                    kind: "commitment hash",
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    /// Read and decode the private record at `key`.
    ///
    /// # Errors
    ///
    /// `CollectionAccess` for non-members, `NotFound` if absent.
    pub fn get<R: LedgerRecord>(&self, key: &str) -> Result<R, ContractError> {
        match self.stub.get_private_data(self.name, key)? {
            Some(raw) => R::decode(key, &raw),
            None => Err(ContractError::NotFound {
                kind: R::KIND,
                id: key.to_string(),
            }),
        }
    }

    /// Write `record` privately and return the hash the ledger will publish.
    pub fn commit<R: LedgerRecord>(
        &self,
        key: &str,
        record: &R,
    ) -> Result<ContentDigest, ContractError> {
        let bytes = record.encode()?;
        let digest = sha256_digest(&bytes);
        self.stub.put_private_data(self.name, key, bytes.into_vec())?;
        tracing::debug!(collection = self.name, key, digest = %digest, "committed private data");
        Ok(digest)
    }

    pub fn delete(&self, key: &str) -> Result<(), ContractError> {
        tracing::debug!(collection = self.name, key, "delete private data");
        self.stub.del_private_data(self.name, key)?;
        Ok(())
    }

    /// Run a `{"selector": ...}` query over the collection.
    pub fn rich_query(
        &self,
        query: &serde_json::Value,
    ) -> Result<ScopedIterator<'a, KeyValue>, ContractError> {
        let it = self
            .stub
            .get_private_data_query_result(self.name, &query.to_string())?;
        Ok(ScopedIterator::new(it))
    }

    /// Scan plain keys in `[start, end)`.
    pub fn range_query(
        &self,
        start: &str,
        end: &str,
    ) -> Result<ScopedIterator<'a, KeyValue>, ContractError> {
        let it = self.stub.get_private_data_by_range(self.name, start, end)?;
        Ok(ScopedIterator::new(it))
    }
}

/// Read `fields` from the transient map as UTF-8 strings.
///
/// An absent or empty field fails the whole read, naming the first such
/// field in `fields` order.
///
/// # Errors
///
/// `MissingConfidentialField` for the first missing field;
/// `InvalidArgument` for a value that is not UTF-8.
pub fn read_confidential_fields(
    stub: &dyn ChaincodeStub,
    fields: &[&'static str],
) -> Result<BTreeMap<&'static str, String>, ContractError> {
    let mut transient = stub.get_transient()?;
    let mut values = BTreeMap::new();
    for &field in fields {
        let raw = transient
            .remove(field)
            .filter(|v| !v.is_empty())
            .ok_or(ContractError::MissingConfidentialField { field })?;
        let value = String::from_utf8(raw).map_err(|_| {
            ContractError::InvalidArgument(format!("transient field {field} is not UTF-8"))
        })?;
        values.insert(field, value);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Order;
    use pharmanet_core::{sha256_bytes, AssetType, MspId, OrderId};
    use pharmanet_ledger::{CollectionConfig, MemoryLedger};

    const COLLECTION: &str = "OrderCollection";

    fn msp(s: &str) -> MspId {
        MspId::new(s).unwrap()
    }

    fn ledger() -> MemoryLedger {
        let ledger = MemoryLedger::new();
        ledger.define_collection(CollectionConfig::new(COLLECTION, [msp("Org1MSP"), msp("Org2MSP")]));
        ledger
    }

    fn order(id: &str) -> Order {
        Order {
            asset_type: AssetType::Order,
            order_id: OrderId::new(id).unwrap(),
            medicine_name: "Paracetamol".into(),
            quantity: "50".into(),
            distributor: "Org2".into(),
        }
    }

    #[test]
    fn commit_publishes_hash_of_payload() {
        let ledger = ledger();
        let tx = ledger.begin(msp("Org2MSP"));
        let col = ConfidentialCollection::new(&tx, COLLECTION);
        let digest = col.commit("ORD-1", &order("ORD-1")).unwrap();
        assert_eq!(digest, sha256_bytes(order("ORD-1").encode().unwrap().as_bytes()));
        tx.commit().unwrap();

        let tx = ledger.begin(msp("Org3MSP"));
        let col = ConfidentialCollection::new(&tx, COLLECTION);
        assert!(col.exists("ORD-1").unwrap());
        assert_eq!(col.hash("ORD-1").unwrap(), Some(digest));
        let err = col.get::<Order>("ORD-1").unwrap_err();
        assert_eq!(err.code(), "COLLECTION_ACCESS_ERROR");
    }

    #[test]
    fn member_reads_back() {
        let ledger = ledger();
        let tx = ledger.begin(msp("Org1MSP"));
        let col = ConfidentialCollection::new(&tx, COLLECTION);
        col.commit("ORD-1", &order("ORD-1")).unwrap();
        assert_eq!(col.get::<Order>("ORD-1").unwrap(), order("ORD-1"));
        assert_eq!(col.get::<Order>("ORD-2").unwrap_err().code(), "NOT_FOUND");
        col.delete("ORD-1").unwrap();
        assert!(!col.exists("ORD-1").unwrap());
    }

    #[test]
    fn confidential_fields_all_or_nothing() {
        let ledger = ledger();
        let tx = ledger
            .begin(msp("Org2MSP"))
            .with_transient("medicineName", "Paracetamol")
            .with_transient("distributor", "Org2");
        let err = read_confidential_fields(&tx, &Order::CONFIDENTIAL_FIELDS).unwrap_err();
        assert!(matches!(err, ContractError::MissingConfidentialField { field: "quantity" }));

        let tx = ledger
            .begin(msp("Org2MSP"))
            .with_transient("medicineName", "Paracetamol")
            .with_transient("quantity", "")
            .with_transient("distributor", "Org2");
        assert!(read_confidential_fields(&tx, &Order::CONFIDENTIAL_FIELDS).is_err());

        let tx = ledger
            .begin(msp("Org2MSP"))
            .with_transient("medicineName", "Paracetamol")
            .with_transient("quantity", "50")
            .with_transient("distributor", "Org2");
        let values = read_confidential_fields(&tx, &Order::CONFIDENTIAL_FIELDS).unwrap();
        assert_eq!(values["quantity"], "50");
    }

    #[test]
    fn non_utf8_transient_is_invalid_argument() {
        let ledger = ledger();
        let tx = ledger.begin(msp("Org2MSP")).with_transient("medicineName", vec![0xff, 0xfe]);
        let err = read_confidential_fields(&tx, &["medicineName"]).unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");
    }
}
