//! # Ledger Records
//!
//! The encode/decode boundary between typed records and ledger bytes.
//! Records are written as canonical JSON (sorted keys, compact, no floats)
//! so that every endorser produces identical bytes and identical commitment
//! hashes. Decoding tolerates unknown fields and checks the `assetType` tag.

use pharmanet_core::{AssetType, CanonicalBytes};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ContractError;

/// A record stored under a single ledger key.
pub trait LedgerRecord: Serialize + DeserializeOwned {
    /// The tag this record type carries in `assetType`.
    const ASSET_TYPE: AssetType;

    /// Short name used in error messages.
    const KIND: &'static str;

    /// The tag this value carries.
    fn asset_type(&self) -> AssetType;

    /// Canonical bytes for a ledger write.
    fn encode(&self) -> Result<CanonicalBytes, ContractError> {
        Ok(CanonicalBytes::new(self)?)
    }

    /// Decode bytes read from `key`.
    ///
    /// # Errors
    ///
    /// `ContractError::Decode` if the bytes are not a record of this shape
    /// or carry a different asset-type tag.
    fn decode(key: &str, raw: &[u8]) -> Result<Self, ContractError> {
        let record: Self = serde_json::from_slice(raw).map_err(|e| ContractError::Decode {
            kind: Self::KIND,
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        if record.asset_type() != Self::ASSET_TYPE {
            return Err(ContractError::Decode {
                kind: Self::KIND,
                key: key.to_string(),
                reason: format!("asset type is {}", record.asset_type()),
            });
        }
        Ok(record)
    }
}
