//! # pharmanet-contracts — Supply-Chain Contracts
//!
//! Three contracts govern the channel shared by a manufacturer, a
//! distributor, and a retailer organization:
//!
//! - **Medicine** (`medicine.rs`): the manufacturer registers and retires
//!   medicine batches in public world state.
//! - **Order** (`order.rs`): the distributor places orders whose contents
//!   travel through the transient channel and land only in a private data
//!   collection. The public chain carries a SHA-256 commitment.
//! - **PharmacyAssignment** (`pharmacy.rs`): the retailer assigns stock of an
//!   existing medicine to a pharmacy.
//!
//! ## Invocation shape
//!
//! Every mutating handler runs the same steps, in order:
//!
//! 1. Resolve the caller's MSP and role (`identity.rs`).
//! 2. Evaluate the static policy table (`policy.rs`); denial returns before
//!    any ledger read.
//! 3. Re-check the existence precondition against the ledger.
//! 4. Perform the write through an accessor (`world_state.rs`,
//!    `collection.rs`).
//! 5. Return a message or a typed [`ContractError`].
//!
//! Contracts hold only immutable network configuration. All state is read
//! from the [`TransactionContext`](pharmanet_ledger::TransactionContext)
//! threaded through each call, so invocations are re-entrant and safe under
//! arbitrary interleaving.

pub mod chaincode;
pub mod collection;
pub mod config;
pub mod error;
pub mod identity;
pub mod medicine;
pub mod model;
pub mod order;
pub mod pharmacy;
pub mod policy;
pub mod projection;
pub mod record;
pub mod world_state;

pub use chaincode::{Chaincode, Response};
pub use collection::{read_confidential_fields, ConfidentialCollection};
pub use config::{ConfigError, NetworkConfig};
pub use error::ContractError;
pub use identity::{resolve_caller, Caller};
pub use medicine::{MedicineContract, NewMedicine};
pub use model::{HistoryEntry, Medicine, Order, PharmacyAssignment, STATUS_MANUFACTURED};
pub use order::OrderContract;
pub use pharmacy::PharmacyContract;
pub use policy::{authorize, permit_for, Operation, Permit, POLICY_TABLE};
pub use projection::{project_history, project_records, ScopedIterator};
pub use record::LedgerRecord;
pub use world_state::WorldState;
