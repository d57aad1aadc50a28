//! # Private Data Collection Configuration
//!
//! Membership of a collection is channel configuration owned by the ledger,
//! not by contracts. Contracts name a collection; the ledger decides who may
//! read or write it.

use std::collections::BTreeSet;

use pharmanet_core::MspId;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Definition of one private data collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Collection name, e.g. `OrderCollection`.
    pub name: String,
    /// Organizations that receive the private payloads.
    pub members: BTreeSet<MspId>,
    /// Reject reads from non-members.
    #[serde(default = "default_true")]
    pub member_only_read: bool,
    /// Reject writes from non-members.
    #[serde(default = "default_true")]
    pub member_only_write: bool,
}

impl CollectionConfig {
    /// A collection readable and writable only by `members`.
    pub fn new(name: impl Into<String>, members: impl IntoIterator<Item = MspId>) -> Self {
        Self {
            name: name.into(),
            members: members.into_iter().collect(),
            member_only_read: true,
            member_only_write: true,
        }
    }

    /// Whether `msp_id` is a member.
    pub fn is_member(&self, msp_id: &MspId) -> bool {
        self.members.contains(msp_id)
    }

    /// Whether `msp_id` may read private payloads.
    pub fn may_read(&self, msp_id: &MspId) -> bool {
        !self.member_only_read || self.is_member(msp_id)
    }

    /// Whether `msp_id` may write private payloads.
    pub fn may_write(&self, msp_id: &MspId) -> bool {
        !self.member_only_write || self.is_member(msp_id)
    }
}
