//! # Identifier Newtypes
//!
//! Newtype wrappers for the keys and principals of the supply chain. You
//! cannot pass an `OrderId` where a `MedicineId` is expected, and neither can
//! be constructed from a string containing a NUL byte, which the ledger
//! reserves as the composite-key delimiter.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

fn validate_key(kind: &'static str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::InvalidIdentifier {
            kind,
            reason: "must not be empty".into(),
        });
    }
    if value.contains('\u{0}') {
        return Err(CoreError::InvalidIdentifier {
            kind,
            reason: "must not contain NUL".into(),
        });
    }
    Ok(())
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl TryFrom<String> for $name {
            type Error = CoreError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl $name {
            /// Validate and wrap an identifier.
            ///
            /// # Errors
            ///
            /// Returns `CoreError::InvalidIdentifier` if the value is blank or
            /// contains a NUL byte.
            pub fn new(value: impl Into<String>) -> Result<Self, CoreError> {
                let value = value.into();
                validate_key($kind, &value)?;
                Ok(Self(value))
            }

            /// Wrap a compile-time constant known to be valid.
            pub fn from_static(value: &'static str) -> Self {
                debug_assert!(validate_key($kind, value).is_ok(), "invalid constant {value:?}");
                Self(value.to_string())
            }

            /// Borrow the identifier as a ledger key.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Membership service provider identifier of an organization, e.g. `Org1MSP`.
    MspId,
    "MSP id"
);

string_id!(
    /// World-state key of a medicine batch.
    MedicineId,
    "medicine id"
);

string_id!(
    /// Private-collection key of a distributor order.
    OrderId,
    "order id"
);

/// The part an organization plays in the supply chain.
///
/// Which MSP holds which role is network configuration; what each role may
/// do is the fixed policy table in `pharmanet-contracts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgRole {
    /// Registers and retires medicine batches.
    Manufacturer,
    /// Places confidential orders with the manufacturer.
    Distributor,
    /// The distribution organization that dispatches stock to pharmacies.
    Retailer,
}

impl OrgRole {
    /// All roles, in declaration order.
    pub const ALL: [OrgRole; 3] = [Self::Manufacturer, Self::Distributor, Self::Retailer];

    /// Return the string representation of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manufacturer => "manufacturer",
            Self::Distributor => "distributor",
            Self::Retailer => "retailer",
        }
    }
}

impl std::fmt::Display for OrgRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
