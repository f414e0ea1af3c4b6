//! Role-based access control.
//!
//! A flat mapping from principal to a set of role tags, checked by a
//! pure predicate at the start of each command. There is no role
//! hierarchy: `Admin` gates registration, verification, role
//! administration and privileged burns; `Minter` gates badge issuance
//! and is granted automatically when an NGO is registered.
//!
//! The ledger's initializer holds both roles from creation.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::Principal;
use crate::LedgerError;

/// Capability tags held by principals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May register/verify NGOs, administer roles and burn any credential.
    Admin,
    /// May issue badges (subject to the NGO verification gate).
    Minter,
}

/// The set of (principal, role) assignments.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleStore {
    roles: BTreeMap<Principal, BTreeSet<Role>>,
}

impl RoleStore {
    /// Grant `role` to `principal`. Returns `false` when the role was
    /// already held (idempotent no-op, no event should be emitted).
    pub fn grant(&mut self, principal: &Principal, role: Role) -> bool {
        self.roles.entry(principal.clone()).or_default().insert(role)
    }

    /// Revoke `role` from `principal`. Returns `false` when the role
    /// was not held (idempotent no-op, no event should be emitted).
    pub fn revoke(&mut self, principal: &Principal, role: Role) -> bool {
        match self.roles.get_mut(principal) {
            Some(held) => held.remove(&role),
            None => false,
        }
    }

    pub fn has(&self, principal: &Principal, role: Role) -> bool {
        self.roles
            .get(principal)
            .map(|held| held.contains(&role))
            .unwrap_or(false)
    }
}

/// Reject the command unless `caller` holds `Admin`.
pub(crate) fn require_admin(store: &RoleStore, caller: &Principal) -> Result<(), LedgerError> {
    if store.has(caller, Role::Admin) {
        Ok(())
    } else {
        Err(LedgerError::Unauthorized(format!(
            "{caller} does not hold the Admin role"
        )))
    }
}

/// Reject the command unless `caller` holds `Minter`.
pub(crate) fn require_minter(store: &RoleStore, caller: &Principal) -> Result<(), LedgerError> {
    if store.has(caller, Role::Minter) {
        Ok(())
    } else {
        Err(LedgerError::Unauthorized(format!(
            "{caller} does not hold the Minter role"
        )))
    }
}
