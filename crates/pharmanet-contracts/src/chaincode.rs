//! # Chaincode Router
//!
//! Dispatches `Contract:Function` invocations with positional string
//! arguments to the three contracts and serializes their results. This is
//! the surface a gateway (or the `pharmanet` CLI) drives.

use pharmanet_core::{MedicineId, OrderId};
use pharmanet_ledger::TransactionContext;
use serde::Serialize;

use crate::config::NetworkConfig;
use crate::error::ContractError;
use crate::medicine::{MedicineContract, NewMedicine};
use crate::order::OrderContract;
use crate::pharmacy::PharmacyContract;

/// Invocable functions and their positional arity.
const FUNCTIONS: &[(&str, usize)] = &[
    ("MedicineContract:CreateMedicine", 7),
    ("MedicineContract:ReadMedicine", 1),
    ("MedicineContract:DeleteMedicine", 1),
    ("MedicineContract:GetAllMedicines", 0),
    ("MedicineContract:MedicineExists", 1),
    ("MedicineContract:GetMedicineHistory", 1),
    ("OrderContract:CreateOrder", 1),
    ("OrderContract:ReadOrder", 1),
    ("OrderContract:DeleteOrder", 1),
    ("OrderContract:GetAllOrders", 0),
    ("OrderContract:GetOrdersByRange", 2),
    ("OrderContract:OrderExists", 1),
    ("OrderContract:GetOrderHash", 1),
    ("OrderContract:VerifyOrder", 1),
    ("PharmacyContract:AssignMedicineToPharmacy", 3),
    ("PharmacyContract:ReadPharmacyAssignment", 1),
];

/// Result of a successful invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    /// Human-readable confirmation of a state change.
    Message(String),
    /// Query result.
    Json(serde_json::Value),
}

impl Response {
    fn json(value: &impl Serialize) -> Result<Self, ContractError> {
        let value = serde_json::to_value(value)
            .map_err(|e| ContractError::Encode(e.into()))?;
        Ok(Self::Json(value))
    }

    /// Render for a client: messages verbatim, JSON pretty-printed.
    pub fn render(&self) -> String {
        match self {
            Self::Message(m) => m.clone(),
            Self::Json(v) => serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()),
        }
    }
}

/// The deployed contracts, sharing one network configuration.
#[derive(Debug, Clone)]
pub struct Chaincode {
    medicine: MedicineContract,
    order: OrderContract,
    pharmacy: PharmacyContract,
}

impl Chaincode {
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            medicine: MedicineContract::new(config.clone()),
            order: OrderContract::new(config.clone()),
            pharmacy: PharmacyContract::new(config),
        }
    }

    pub fn medicine(&self) -> &MedicineContract {
        &self.medicine
    }

    pub fn order(&self) -> &OrderContract {
        &self.order
    }

    pub fn pharmacy(&self) -> &PharmacyContract {
        &self.pharmacy
    }

    /// Every invocable `Contract:Function` name.
    pub fn functions() -> impl Iterator<Item = &'static str> {
        FUNCTIONS.iter().map(|(name, _)| *name)
    }

    /// Invoke `function` (`Contract:Function`) with positional `args`.
    ///
    /// # Errors
    ///
    /// `UnknownFunction` for an unregistered name, `InvalidArgument` for a
    /// wrong argument count or malformed identifier, otherwise whatever the
    /// handler returns.
    pub fn invoke(
        &self,
        ctx: &dyn TransactionContext,
        function: &str,
        args: &[String],
    ) -> Result<Response, ContractError> {
        let (contract, name) = function
            .split_once(':')
            .ok_or_else(|| ContractError::UnknownFunction(function.to_string()))?;
        let msp_id = ctx
            .client_identity()
            .get_msp_id()
            .map(|m| m.to_string())
            .unwrap_or_default();
        let span = tracing::info_span!(
            "invoke",
            contract,
            function = name,
            tx_id = ctx.stub().get_tx_id(),
            msp_id = %msp_id,
        );
        let _guard = span.enter();

        check_arity(function, args)?;
        let result = self.dispatch(ctx, contract, name, args);
        if let Err(e) = &result {
            tracing::info!(code = e.code(), error = %e, "invocation failed");
        }
        result
    }

    fn dispatch(
        &self,
        ctx: &dyn TransactionContext,
        contract: &str,
        name: &str,
        args: &[String],
    ) -> Result<Response, ContractError> {
        match (contract, name) {
            ("MedicineContract", "CreateMedicine") => {
                let medicine = NewMedicine {
                    medicine_id: MedicineId::new(args[0].as_str())?,
                    name: args[1].clone(),
                    manufacturer: args[2].clone(),
                    mfd: args[3].clone(),
                    expiry: args[4].clone(),
                    price: args[5].clone(),
                    quantity: args[6].clone(),
                };
                self.medicine.create_medicine(ctx, medicine).map(Response::Message)
            }
            ("MedicineContract", "ReadMedicine") => {
                Response::json(&self.medicine.read_medicine(ctx, &medicine_id(args)?)?)
            }
            ("MedicineContract", "DeleteMedicine") => self
                .medicine
                .delete_medicine(ctx, &medicine_id(args)?)
                .map(Response::Message),
            ("MedicineContract", "GetAllMedicines") => {
                Response::json(&self.medicine.get_all_medicines(ctx)?)
            }
            ("MedicineContract", "MedicineExists") => {
                Response::json(&self.medicine.medicine_exists(ctx, &medicine_id(args)?)?)
            }
            ("MedicineContract", "GetMedicineHistory") => {
                Response::json(&self.medicine.get_medicine_history(ctx, &medicine_id(args)?)?)
            }
            ("OrderContract", "CreateOrder") => self
                .order
                .create_order(ctx, &order_id(args)?)
                .map(Response::Message),
            ("OrderContract", "ReadOrder") => {
                Response::json(&self.order.read_order(ctx, &order_id(args)?)?)
            }
            ("OrderContract", "DeleteOrder") => self
                .order
                .delete_order(ctx, &order_id(args)?)
                .map(Response::Message),
            ("OrderContract", "GetAllOrders") => Response::json(&self.order.get_all_orders(ctx)?),
            ("OrderContract", "GetOrdersByRange") => {
                Response::json(&self.order.get_orders_by_range(ctx, &args[0], &args[1])?)
            }
            ("OrderContract", "OrderExists") => {
                Response::json(&self.order.order_exists(ctx, &order_id(args)?)?)
            }
            ("OrderContract", "GetOrderHash") => {
                let digest = self.order.get_order_hash(ctx, &order_id(args)?)?;
                Ok(Response::Json(serde_json::Value::String(digest.to_hex())))
            }
            ("OrderContract", "VerifyOrder") => {
                Response::json(&self.order.verify_order(ctx, &order_id(args)?)?)
            }
            ("PharmacyContract", "AssignMedicineToPharmacy") => self
                .pharmacy
                .assign_medicine_to_pharmacy(ctx, &medicine_id(args)?, &args[1], &args[2])
                .map(Response::Message),
            ("PharmacyContract", "ReadPharmacyAssignment") => Response::json(
                &self.pharmacy.read_pharmacy_assignment(ctx, &medicine_id(args)?)?,
            ),
            _ => Err(ContractError::UnknownFunction(format!("{contract}:{name}"))),
        }
    }
}

fn check_arity(function: &str, args: &[String]) -> Result<(), ContractError> {
    let expected = FUNCTIONS
        .iter()
        .find(|(name, _)| *name == function)
        .map(|(_, arity)| *arity)
        .ok_or_else(|| ContractError::UnknownFunction(function.to_string()))?;
    if args.len() == expected {
        Ok(())
    } else {
        Err(ContractError::InvalidArgument(format!(
            "{function} expects {expected} arguments, got {}",
            args.len()
        )))
    }
}

fn medicine_id(args: &[String]) -> Result<MedicineId, ContractError> {
    Ok(MedicineId::new(args[0].as_str())?)
}

fn order_id(args: &[String]) -> Result<OrderId, ContractError> {
    Ok(OrderId::new(args[0].as_str())?)
}
