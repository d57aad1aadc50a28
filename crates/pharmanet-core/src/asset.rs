//! # Asset-Type Tags
//!
//! Every stored record carries an `assetType` field. The tag lets one key
//! space (world state) or one collection hold several record shapes, and
//! lets bulk listings discard records of the wrong shape without failing.
//!
//! The tag strings are part of the persisted format and must not change.

use serde::{Deserialize, Serialize};

/// Discriminating tag stored in each record's `assetType` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    /// A registered medicine batch (public world state).
    #[serde(rename = "medicine")]
    Medicine,
    /// A confidential distributor order (private collection).
    #[serde(rename = "Order")]
    Order,
    /// A medicine-to-pharmacy assignment (public world state).
    #[serde(rename = "PharmacyAssignment")]
    PharmacyAssignment,
}

impl AssetType {
    /// The tag as stored on the ledger.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medicine => "medicine",
            Self::Order => "Order",
            Self::PharmacyAssignment => "PharmacyAssignment",
        }
    }

    /// Rich-query selector matching every record of this type.
    pub fn selector(&self) -> serde_json::Value {
        serde_json::json!({ "selector": { "assetType": self.as_str() } })
    }
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
