//! # Pharmacy Assignment Contract
//!
//! The retailer dispatches stock of an existing medicine to a pharmacy.
//! Each medicine has at most one assignment; assigning again overwrites.
//! Assignments live under the composite key `(PharmacyAssignment, medicineId)`
//! so the medicine record at the plain key is left untouched.

use pharmanet_core::{AssetType, MedicineId};
use pharmanet_ledger::TransactionContext;

use crate::config::NetworkConfig;
use crate::error::ContractError;
use crate::identity::resolve_caller;
use crate::model::{Medicine, PharmacyAssignment};
use crate::policy::{authorize, Operation};
use crate::record::LedgerRecord;
use crate::world_state::WorldState;

#[derive(Debug, Clone)]
pub struct PharmacyContract {
    config: NetworkConfig,
}

impl PharmacyContract {
    pub fn new(config: NetworkConfig) -> Self {
        Self { config }
    }

    /// Assign `quantity` of a medicine to `pharmacy_name`. Retailer only.
    pub fn assign_medicine_to_pharmacy(
        &self,
        ctx: &dyn TransactionContext,
        medicine_id: &MedicineId,
        pharmacy_name: &str,
        quantity: &str,
    ) -> Result<String, ContractError> {
        let caller = resolve_caller(ctx, &self.config)?;
        authorize(Operation::AssignMedicineToPharmacy, &caller)?;

        let state = WorldState::new(ctx.stub());
        ensure_medicine(&state, medicine_id)?;

        let assignment = PharmacyAssignment {
            asset_type: AssetType::PharmacyAssignment,
            medicine_id: medicine_id.clone(),
            pharmacy_name: pharmacy_name.to_string(),
            quantity: quantity.to_string(),
        };
        state.put(&assignment_key(&state, medicine_id)?, &assignment)?;
        tracing::info!(medicine_id = %medicine_id, pharmacy = pharmacy_name, "medicine assigned");
        Ok(format!(
            "Medicine {medicine_id} assigned to {pharmacy_name} with quantity {quantity}"
        ))
    }

    pub fn read_pharmacy_assignment(
        &self,
        ctx: &dyn TransactionContext,
        medicine_id: &MedicineId,
    ) -> Result<PharmacyAssignment, ContractError> {
        let caller = resolve_caller(ctx, &self.config)?;
        authorize(Operation::ReadPharmacyAssignment, &caller)?;

        let state = WorldState::new(ctx.stub());
        ensure_medicine(&state, medicine_id)?;
        state
            .get(&assignment_key(&state, medicine_id)?)
            .map_err(|e| match e {
                ContractError::NotFound { .. } => ContractError::NotFound {
                    kind: PharmacyAssignment::KIND,
                    id: medicine_id.to_string(),
                },
                other => other,
            })
    }
}

fn assignment_key(
    state: &WorldState<'_>,
    medicine_id: &MedicineId,
) -> Result<String, ContractError> {
    state.composite_key(PharmacyAssignment::ASSET_TYPE.as_str(), &[medicine_id.as_str()])
}

fn ensure_medicine(state: &WorldState<'_>, medicine_id: &MedicineId) -> Result<(), ContractError> {
    if state.exists(medicine_id.as_str())? {
        Ok(())
    } else {
        Err(ContractError::NotFound {
            kind: Medicine::KIND,
            id: medicine_id.to_string(),
        })
    }
}
