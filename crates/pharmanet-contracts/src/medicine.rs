//! # Medicine Contract
//!
//! The manufacturer registers medicine batches in public world state under
//! their `medicineId` and may later retire them. Every organization can
//! read, list, and trace the history of a medicine.

use pharmanet_core::{AssetType, MedicineId};
use pharmanet_ledger::TransactionContext;
use serde::{Deserialize, Serialize};

use crate::config::NetworkConfig;
use crate::error::ContractError;
use crate::identity::resolve_caller;
use crate::model::{HistoryEntry, Medicine, PharmacyAssignment, STATUS_MANUFACTURED};
use crate::policy::{authorize, Operation};
use crate::projection::{project_history, project_records};
use crate::record::LedgerRecord;
use crate::world_state::WorldState;

/// Caller-supplied fields of a new medicine. Status is not among them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMedicine {
    pub medicine_id: MedicineId,
    pub name: String,
    pub manufacturer: String,
    pub mfd: String,
    pub expiry: String,
    pub price: String,
    pub quantity: String,
}

impl NewMedicine {
    fn into_record(self) -> Medicine {
        Medicine {
            asset_type: AssetType::Medicine,
            medicine_id: self.medicine_id,
            name: self.name,
            manufacturer: self.manufacturer,
            mfd: self.mfd,
            expiry: self.expiry,
            price: self.price,
            quantity: self.quantity,
            status: STATUS_MANUFACTURED.to_string(),
        }
    }
}

/// Registration and lookup of medicine batches.
#[derive(Debug, Clone)]
pub struct MedicineContract {
    config: NetworkConfig,
}

impl MedicineContract {
    pub fn new(config: NetworkConfig) -> Self {
        Self { config }
    }

    /// Register a medicine with status `Manufactured`. Manufacturer only.
    pub fn create_medicine(
        &self,
        ctx: &dyn TransactionContext,
        medicine: NewMedicine,
    ) -> Result<String, ContractError> {
        let caller = resolve_caller(ctx, &self.config)?;
        authorize(Operation::CreateMedicine, &caller)?;

        let state = WorldState::new(ctx.stub());
        let id = medicine.medicine_id.clone();
        if state.exists(id.as_str())? {
            return Err(ContractError::AlreadyExists {
                kind: Medicine::KIND,
                id: id.to_string(),
            });
        }
        state.put(id.as_str(), &medicine.into_record())?;
        tracing::info!(medicine_id = %id, "medicine created");
        Ok(format!("Added medicine {id}"))
    }

    pub fn read_medicine(
        &self,
        ctx: &dyn TransactionContext,
        id: &MedicineId,
    ) -> Result<Medicine, ContractError> {
        let caller = resolve_caller(ctx, &self.config)?;
        authorize(Operation::ReadMedicine, &caller)?;
        WorldState::new(ctx.stub()).get(id.as_str())
    }

    /// Retire a medicine, along with its pharmacy assignment if one exists.
    /// Manufacturer only.
    pub fn delete_medicine(
        &self,
        ctx: &dyn TransactionContext,
        id: &MedicineId,
    ) -> Result<String, ContractError> {
        let caller = resolve_caller(ctx, &self.config)?;
        authorize(Operation::DeleteMedicine, &caller)?;

        let state = WorldState::new(ctx.stub());
        if !state.exists(id.as_str())? {
            return Err(ContractError::NotFound {
                kind: Medicine::KIND,
                id: id.to_string(),
            });
        }
        state.delete(id.as_str())?;

        let assignment_key = state.composite_key(
            PharmacyAssignment::ASSET_TYPE.as_str(),
            &[id.as_str()],
        )?;
        if state.exists(&assignment_key)? {
            state.delete(&assignment_key)?;
        }
        tracing::info!(medicine_id = %id, "medicine deleted");
        Ok(format!(
            "Medicine with ID {id} has been deleted from the world state."
        ))
    }

    /// Every medicine in world state.
    pub fn get_all_medicines(
        &self,
        ctx: &dyn TransactionContext,
    ) -> Result<Vec<Medicine>, ContractError> {
        let caller = resolve_caller(ctx, &self.config)?;
        authorize(Operation::ListMedicines, &caller)?;
        let results = WorldState::new(ctx.stub()).rich_query(&Medicine::ASSET_TYPE.selector())?;
        project_records(results)
    }

    pub fn medicine_exists(
        &self,
        ctx: &dyn TransactionContext,
        id: &MedicineId,
    ) -> Result<bool, ContractError> {
        let caller = resolve_caller(ctx, &self.config)?;
        authorize(Operation::MedicineExists, &caller)?;
        WorldState::new(ctx.stub()).exists(id.as_str())
    }

    /// Committed versions of a medicine, oldest first, including deletes.
    pub fn get_medicine_history(
        &self,
        ctx: &dyn TransactionContext,
        id: &MedicineId,
    ) -> Result<Vec<HistoryEntry>, ContractError> {
        let caller = resolve_caller(ctx, &self.config)?;
        authorize(Operation::MedicineHistory, &caller)?;
        let results = WorldState::new(ctx.stub()).history(id.as_str())?;
        project_history(results, id.as_str())
    }
}
