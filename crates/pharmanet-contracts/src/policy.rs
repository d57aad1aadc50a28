//! # Access Policy
//!
//! One static table maps every exposed operation to the organizations that
//! may perform it. Handlers call [`authorize`] before touching the ledger,
//! so a denied caller learns nothing about state.
//!
//! | Operation | Permitted |
//! |---|---|
//! | create / delete medicine | manufacturer |
//! | read / list / history of medicines | any organization |
//! | create order | distributor |
//! | delete order | distributor, manufacturer |
//! | read / list orders | order collection members (enforced by the ledger) |
//! | order existence, hash, verification | any organization |
//! | assign medicine to pharmacy | retailer |
//! | read assignment | any organization |
//!
//! The table is a compile-time constant. Only the MSP-to-role binding is
//! configuration.

use pharmanet_core::OrgRole;
use serde::Serialize;

use crate::error::ContractError;
use crate::identity::Caller;

/// Every operation exposed by the three contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operation {
    CreateMedicine,
    ReadMedicine,
    DeleteMedicine,
    ListMedicines,
    MedicineExists,
    MedicineHistory,
    CreateOrder,
    ReadOrder,
    DeleteOrder,
    ListOrders,
    OrderExists,
    OrderHash,
    VerifyOrder,
    AssignMedicineToPharmacy,
    ReadPharmacyAssignment,
}

impl Operation {
    /// All operations, in table order.
    pub const ALL: [Operation; 15] = [
        Self::CreateMedicine,
        Self::ReadMedicine,
        Self::DeleteMedicine,
        Self::ListMedicines,
        Self::MedicineExists,
        Self::MedicineHistory,
        Self::CreateOrder,
        Self::ReadOrder,
        Self::DeleteOrder,
        Self::ListOrders,
        Self::OrderExists,
        Self::OrderHash,
        Self::VerifyOrder,
        Self::AssignMedicineToPharmacy,
        Self::ReadPharmacyAssignment,
    ];

    /// Human-readable verb phrase used in denial messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateMedicine => "create medicine",
            Self::ReadMedicine => "read medicine",
            Self::DeleteMedicine => "delete medicine",
            Self::ListMedicines => "list medicines",
            Self::MedicineExists => "check medicine existence",
            Self::MedicineHistory => "read medicine history",
            Self::CreateOrder => "create order",
            Self::ReadOrder => "read order",
            Self::DeleteOrder => "delete order",
            Self::ListOrders => "list orders",
            Self::OrderExists => "check order existence",
            Self::OrderHash => "read order hash",
            Self::VerifyOrder => "verify order",
            Self::AssignMedicineToPharmacy => "assign medicine to pharmacy",
            Self::ReadPharmacyAssignment => "read pharmacy assignment",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who may perform an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permit {
    /// Every organization on the channel, including ones with no role.
    AnyOrganization,
    /// Only callers holding one of these roles.
    Roles(&'static [OrgRole]),
    /// Members of the private collection involved. The ledger enforces
    /// membership on the read itself, so a non-member receives a collection
    /// access error rather than an authorization error.
    CollectionMembers,
}

use OrgRole::{Distributor, Manufacturer, Retailer};

/// The policy table. Exactly one row per [`Operation`].
pub const POLICY_TABLE: [(Operation, Permit); 15] = [
    (Operation::CreateMedicine, Permit::Roles(&[Manufacturer])),
    (Operation::ReadMedicine, Permit::AnyOrganization),
    (Operation::DeleteMedicine, Permit::Roles(&[Manufacturer])),
    (Operation::ListMedicines, Permit::AnyOrganization),
    (Operation::MedicineExists, Permit::AnyOrganization),
    (Operation::MedicineHistory, Permit::AnyOrganization),
    (Operation::CreateOrder, Permit::Roles(&[Distributor])),
    (Operation::ReadOrder, Permit::CollectionMembers),
    (Operation::DeleteOrder, Permit::Roles(&[Distributor, Manufacturer])),
    (Operation::ListOrders, Permit::CollectionMembers),
    (Operation::OrderExists, Permit::AnyOrganization),
    (Operation::OrderHash, Permit::AnyOrganization),
    (Operation::VerifyOrder, Permit::AnyOrganization),
    (Operation::AssignMedicineToPharmacy, Permit::Roles(&[Retailer])),
    (Operation::ReadPharmacyAssignment, Permit::AnyOrganization),
];

/// Look up the table row for `operation`.
///
/// A missing row denies to every role.
pub fn permit_for(operation: Operation) -> Permit {
    POLICY_TABLE
        .iter()
        .find(|(op, _)| *op == operation)
        .map(|(_, permit)| *permit)
        .unwrap_or(Permit::Roles(&[]))
}

/// Permit or deny `caller` for `operation`.
///
/// # Errors
///
/// `ContractError::Authorization` if the table does not admit the caller.
pub fn authorize(operation: Operation, caller: &Caller) -> Result<(), ContractError> {
    let allowed = match permit_for(operation) {
        Permit::AnyOrganization | Permit::CollectionMembers => true,
        Permit::Roles(roles) => caller.has_any_role(roles),
    };
    if allowed {
        Ok(())
    } else {
        tracing::warn!(
            operation = %operation,
            msp_id = %caller.msp_id,
            "authorization denied"
        );
        Err(ContractError::Authorization {
            operation,
            msp_id: caller.msp_id.to_string(),
        })
    }
}
