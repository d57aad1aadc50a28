//! # Network Configuration
//!
//! Binds the three supply-chain roles to concrete MSP identifiers and names
//! the private collection that holds orders. What each role may do is not
//! configurable; see `policy.rs`.
//!
//! Configuration is YAML:
//!
//! ```yaml
//! manufacturer_msp: Org1MSP
//! distributor_msp: Org2MSP
//! retailer_msp: Org3MSP
//! order_collection: OrderCollection
//! ```
//!
//! Omitted keys take the defaults shown. [`NetworkConfig::from_env`] reads
//! the file named by `PHARMANET_CONFIG`, falling back to defaults when the
//! variable is unset.

use std::path::Path;

use pharmanet_core::{MspId, OrgRole};
use pharmanet_ledger::CollectionConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the network configuration file.
pub const CONFIG_ENV_VAR: &str = "PHARMANET_CONFIG";

/// Errors loading or validating network configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The YAML could not be parsed.
    #[error("cannot parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The configuration is internally inconsistent.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Role bindings and collection naming for one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// MSP of the manufacturer organization.
    pub manufacturer_msp: MspId,
    /// MSP of the distributor organization.
    pub distributor_msp: MspId,
    /// MSP of the retailer (distribution) organization.
    pub retailer_msp: MspId,
    /// Private collection holding orders.
    pub order_collection: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            manufacturer_msp: MspId::from_static("Org1MSP"),
            distributor_msp: MspId::from_static("Org2MSP"),
            retailer_msp: MspId::from_static("Org3MSP"),
            order_collection: "OrderCollection".to_string(),
        }
    }
}

impl NetworkConfig {
    /// Parse and validate YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Load from `$PHARMANET_CONFIG`, or defaults if it is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Reject configurations where one MSP holds two roles or the collection
    /// name is blank or contains NUL. MSP ids are checked when parsed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let msps = [&self.manufacturer_msp, &self.distributor_msp, &self.retailer_msp];
        for (i, a) in msps.iter().enumerate() {
            if msps[i + 1..].contains(a) {
                return Err(ConfigError::Invalid(format!("MSP {a} is bound to two roles")));
            }
        }
        if self.order_collection.trim().is_empty() {
            return Err(ConfigError::Invalid("order_collection must not be blank".into()));
        }
        if self.order_collection.contains('\u{0}') {
            return Err(ConfigError::Invalid("order_collection must not contain NUL".into()));
        }
        Ok(())
    }

    /// The role `msp_id` plays, if any.
    pub fn role_of(&self, msp_id: &MspId) -> Option<OrgRole> {
        OrgRole::ALL
            .into_iter()
            .find(|role| self.msp_for(*role) == msp_id)
    }

    /// The MSP bound to `role`.
    pub fn msp_for(&self, role: OrgRole) -> &MspId {
        match role {
            OrgRole::Manufacturer => &self.manufacturer_msp,
            OrgRole::Distributor => &self.distributor_msp,
            OrgRole::Retailer => &self.retailer_msp,
        }
    }

    /// Collection definition for orders: manufacturer and distributor only.
    pub fn order_collection_config(&self) -> CollectionConfig {
        CollectionConfig::new(
            self.order_collection.clone(),
            [self.manufacturer_msp.clone(), self.distributor_msp.clone()],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = NetworkConfig::default();
        assert_eq!(c.manufacturer_msp.as_str(), "Org1MSP");
        assert_eq!(c.role_of(&MspId::new("Org3MSP").unwrap()), Some(OrgRole::Retailer));
        assert_eq!(c.role_of(&MspId::new("Org9MSP").unwrap()), None);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let c = NetworkConfig::from_yaml_str("retailer_msp: PharmacyMSP\n").unwrap();
        assert_eq!(c.retailer_msp.as_str(), "PharmacyMSP");
        assert_eq!(c.distributor_msp.as_str(), "Org2MSP");
        assert_eq!(c.order_collection, "OrderCollection");
    }

    #[test]
    fn duplicate_role_binding_rejected() {
        let err = NetworkConfig::from_yaml_str("distributor_msp: Org1MSP\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_msp_ids_rejected_at_parse() {
        let err = NetworkConfig::from_yaml_str("manufacturer_msp: \"Org\\0MSP\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
        let err = NetworkConfig::from_yaml_str("retailer_msp: ''\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
        let err = NetworkConfig::from_yaml_str("order_collection: \"Orders\\0\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn order_collection_members() {
        let cfg = NetworkConfig::default().order_collection_config();
        assert!(cfg.is_member(&MspId::new("Org1MSP").unwrap()));
        assert!(cfg.is_member(&MspId::new("Org2MSP").unwrap()));
        assert!(!cfg.is_member(&MspId::new("Org3MSP").unwrap()));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.yaml");
        std::fs::write(&path, "order_collection: Orders\n").unwrap();
        assert_eq!(NetworkConfig::load(&path).unwrap().order_collection, "Orders");
        assert!(matches!(
            NetworkConfig::load(&dir.path().join("missing.yaml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
