//! # Caller Identity
//!
//! Resolves the submitting organization from the transaction context and
//! binds it to a supply-chain role through [`NetworkConfig`]. Pure function
//! of the context; nothing is cached between invocations.

use pharmanet_core::{MspId, OrgRole};
use pharmanet_ledger::TransactionContext;

use crate::config::NetworkConfig;
use crate::error::ContractError;

/// The resolved caller of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// MSP the client certificate was issued by.
    pub msp_id: MspId,
    /// Role bound to that MSP, or `None` for organizations outside the
    /// three configured ones.
    pub role: Option<OrgRole>,
}

impl Caller {
    /// Whether the caller holds any of `roles`.
    pub fn has_any_role(&self, roles: &[OrgRole]) -> bool {
        self.role.is_some_and(|role| roles.contains(&role))
    }
}

/// Resolve the caller of the current transaction.
///
/// # Errors
///
/// `ContractError::Identity` if the context carries no resolvable identity.
pub fn resolve_caller(
    ctx: &dyn TransactionContext,
    config: &NetworkConfig,
) -> Result<Caller, ContractError> {
    let msp_id = ctx
        .client_identity()
        .get_msp_id()
        .map_err(|e| ContractError::Identity(e.to_string()))?;
    let role = config.role_of(&msp_id);
    tracing::debug!(msp_id = %msp_id, role = ?role, "resolved caller");
    Ok(Caller { msp_id, role })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharmanet_ledger::MemoryLedger;

    #[test]
    fn known_msp_gets_role() {
        let ledger = MemoryLedger::new();
        let tx = ledger.begin(MspId::new("Org2MSP").unwrap());
        let caller = resolve_caller(&tx, &NetworkConfig::default()).unwrap();
        assert_eq!(caller.role, Some(OrgRole::Distributor));
        assert!(caller.has_any_role(&[OrgRole::Distributor, OrgRole::Manufacturer]));
        assert!(!caller.has_any_role(&[OrgRole::Retailer]));
    }

    #[test]
    fn foreign_msp_has_no_role() {
        let ledger = MemoryLedger::new();
        let tx = ledger.begin(MspId::new("Org7MSP").unwrap());
        let caller = resolve_caller(&tx, &NetworkConfig::default()).unwrap();
        assert_eq!(caller.role, None);
        assert!(!caller.has_any_role(&OrgRole::ALL));
    }

    #[test]
    fn anonymous_context_is_identity_error() {
        let ledger = MemoryLedger::new();
        let tx = ledger.begin_anonymous();
        let err = resolve_caller(&tx, &NetworkConfig::default()).unwrap_err();
        assert_eq!(err.code(), "IDENTITY_ERROR");
    }
}
