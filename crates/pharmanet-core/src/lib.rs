//! # pharmanet-core — Foundational Types for PharmaNet
//!
//! The leaf crate of the PharmaNet workspace. It defines the primitives that
//! every other crate builds on: the byte encoding records are stored in, the
//! digest that commits confidential payloads to the public chain, and the
//! identifier newtypes that keep medicine, order, and organization keys from
//! being confused with one another.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype identifiers.** `MspId`, `MedicineId`, `OrderId` have validated
//!    constructors. No bare strings cross a contract boundary as keys.
//!
//! 2. **`CanonicalBytes` for every stored record.** Records reach the ledger
//!    only through `CanonicalBytes::new()`, so two endorsers encoding the same
//!    record produce the same bytes and the same commitment hash.
//!
//! 3. **Asset-type tags.** Every record carries an `AssetType` tag so one key
//!    space or collection can hold several record shapes.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `pharmanet-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod asset;
pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

pub use asset::AssetType;
pub use canonical::CanonicalBytes;
pub use digest::{sha256_bytes, sha256_digest, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, CoreError};
pub use identity::{MedicineId, MspId, OrderId, OrgRole};
pub use temporal::Timestamp;
