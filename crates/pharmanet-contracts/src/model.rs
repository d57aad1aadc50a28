//! # Domain Records
//!
//! Field names on the wire are fixed by records already on the ledger and
//! must not change. Prices and quantities are strings; records never carry
//! floats.

use pharmanet_core::{AssetType, MedicineId, OrderId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::record::LedgerRecord;

/// Status every medicine is registered with. No further transitions exist.
pub const STATUS_MANUFACTURED: &str = "Manufactured";

/// A registered medicine batch, public in world state under `medicineId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medicine {
    #[serde(rename = "assetType")]
    pub asset_type: AssetType,
    #[serde(rename = "medicineId")]
    pub medicine_id: MedicineId,
    pub name: String,
    pub manufacturer: String,
    /// Manufacture date, as supplied.
    pub mfd: String,
    pub expiry: String,
    pub price: String,
    pub quantity: String,
    pub status: String,
}

impl LedgerRecord for Medicine {
    const ASSET_TYPE: AssetType = AssetType::Medicine;
    const KIND: &'static str = "medicine";

    fn asset_type(&self) -> AssetType {
        self.asset_type
    }
}

/// A distributor order. Lives only in the order collection under `orderID`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "assetType")]
    pub asset_type: AssetType,
    #[serde(rename = "orderID")]
    pub order_id: OrderId,
    #[serde(rename = "medicineName")]
    pub medicine_name: String,
    pub quantity: String,
    pub distributor: String,
}

impl Order {
    /// Transient field names, in validation order.
    pub const CONFIDENTIAL_FIELDS: [&'static str; 3] = ["medicineName", "quantity", "distributor"];
}

impl LedgerRecord for Order {
    const ASSET_TYPE: AssetType = AssetType::Order;
    const KIND: &'static str = "order";

    fn asset_type(&self) -> AssetType {
        self.asset_type
    }
}

/// Stock of one medicine dispatched to a pharmacy. At most one per medicine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PharmacyAssignment {
    #[serde(rename = "assetType")]
    pub asset_type: AssetType,
    #[serde(rename = "medicineID")]
    pub medicine_id: MedicineId,
    #[serde(rename = "pharmacyName")]
    pub pharmacy_name: String,
    pub quantity: String,
}

impl LedgerRecord for PharmacyAssignment {
    const ASSET_TYPE: AssetType = AssetType::PharmacyAssignment;
    const KIND: &'static str = "pharmacy assignment";

    fn asset_type(&self) -> AssetType {
        self.asset_type
    }
}

/// One committed version of a medicine key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The record as of this version; `None` for deletes.
    pub record: Option<Medicine>,
    #[serde(rename = "txId")]
    pub tx_id: String,
    pub timestamp: Timestamp,
    #[serde(rename = "isDelete")]
    pub is_delete: bool,
}
