//! # Volunteer Credential Ledger
//!
//! This is the core crate of the **Volunteer Credential Ledger**: a
//! role-gated registry of NGOs and an append/accumulate ledger of
//! soul-bound volunteer-hour badges. It exposes the single service
//! type [`VolunteerLedger`] whose entry points cover the full
//! credential lifecycle:
//!
//! | Phase        | Entry Point(s)                                    |
//! |--------------|---------------------------------------------------|
//! | Bootstrap    | [`VolunteerLedger::new`]                          |
//! | Role admin   | `grant_role`, `revoke_role`, `has_role`           |
//! | Registration | [`VolunteerLedger::register_ngo`], `verify_ngo`   |
//! | Issuance     | [`VolunteerLedger::issue_badge`]                  |
//! | Revocation   | [`VolunteerLedger::burn`]                         |
//! | Queries      | `has_volunteer_badge`, `badge_of`, `get_total_hours`, `get_volunteer_profile`, `verify_volunteer_credential`, `get_platform_stats`, `get_ngo_info`, `metadata_uri`, `query_events` |
//!
//! ## Architecture
//!
//! Authorization is fully delegated to [`rbac`]. State access is fully
//! delegated to [`storage`]. This file contains **only** the public
//! entry points, their precondition checks and event emissions — every
//! check runs before the first mutation, so a failed command leaves no
//! partial state behind.
//!
//! The ledger is a single logical writer: commands take `&mut self`,
//! so exclusive ownership is the serialization mechanism. Queries take
//! `&self` and always observe the latest committed state.

mod events;
pub mod rbac;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;
#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use events::{Event, EventFilter, EventKind, EventLog, EventRecord};
pub use rbac::{Role, RoleStore};
pub use storage::LedgerState;
pub use types::{
    Clock, Credential, CredentialCheck, ManualClock, NgoRecord, PlatformStats, Principal,
    SystemClock, VolunteerProfile,
};

/// Typed precondition failures. Every variant carries a human-readable
/// message naming the violated precondition; no command mutates state
/// before returning one of these.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("invalid principal: {0}")]
    InvalidPrincipal(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already registered: {0}")]
    AlreadyRegistered(String),
    #[error("NGO not verified: {0}")]
    NgoNotVerified(String),
    #[error("non-transferable: {0}")]
    NonTransferable(String),
}

/// A serializable copy of the full ledger — state tables plus event
/// history. Restoring a snapshot yields an identical queryable ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub state: LedgerState,
    pub log: EventLog,
}

/// The Volunteer Credential Ledger service.
///
/// Owns all state exclusively. Commands are atomic, one-shot
/// transactions: precondition checks run first and fail the whole call
/// deterministically; the ledger never retries internally.
pub struct VolunteerLedger {
    state: LedgerState,
    log: EventLog,
    clock: Arc<dyn Clock>,
}

impl VolunteerLedger {
    /// Create a ledger whose initializer holds both `Admin` and
    /// `Minter`, timestamped by the system clock.
    pub fn new(initial_admin: Principal) -> Self {
        Self::with_clock(initial_admin, Arc::new(SystemClock))
    }

    /// Create a ledger with an explicit time source (tests use a
    /// [`ManualClock`]).
    pub fn with_clock(initial_admin: Principal, clock: Arc<dyn Clock>) -> Self {
        let mut ledger = VolunteerLedger {
            state: LedgerState::default(),
            log: EventLog::default(),
            clock,
        };
        let now = ledger.clock.now();
        for role in [Role::Admin, Role::Minter] {
            ledger.state.roles.grant(&initial_admin, role);
            ledger.log.append(
                now,
                Event::RoleGranted {
                    principal: initial_admin.clone(),
                    role,
                },
            );
        }
        ledger
    }

    /// Rebuild a ledger from a previously taken [`LedgerSnapshot`].
    pub fn from_snapshot(snapshot: LedgerSnapshot, clock: Arc<dyn Clock>) -> Self {
        VolunteerLedger {
            state: snapshot.state,
            log: snapshot.log,
            clock,
        }
    }

    /// Copy out the full state and history for durable storage.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            state: self.state.clone(),
            log: self.log.clone(),
        }
    }

    // ─────────────────────────────────────────────────────────
    // Role administration
    // ─────────────────────────────────────────────────────────

    /// Grant `role` to `principal`. Admin-gated. Granting a role the
    /// principal already holds is a no-op and emits nothing.
    pub fn grant_role(
        &mut self,
        caller: &Principal,
        principal: &Principal,
        role: Role,
    ) -> Result<(), LedgerError> {
        rbac::require_admin(&self.state.roles, caller)?;
        if principal.is_zero() {
            return Err(LedgerError::InvalidPrincipal(
                "cannot grant a role to the zero principal".into(),
            ));
        }
        if self.state.roles.grant(principal, role) {
            self.log.append(
                self.clock.now(),
                Event::RoleGranted {
                    principal: principal.clone(),
                    role,
                },
            );
        }
        Ok(())
    }

    /// Revoke `role` from `principal`. Admin-gated. Revoking a role
    /// that is not held is a no-op and emits nothing.
    pub fn revoke_role(
        &mut self,
        caller: &Principal,
        principal: &Principal,
        role: Role,
    ) -> Result<(), LedgerError> {
        rbac::require_admin(&self.state.roles, caller)?;
        if principal.is_zero() {
            return Err(LedgerError::InvalidPrincipal(
                "cannot revoke a role from the zero principal".into(),
            ));
        }
        if self.state.roles.revoke(principal, role) {
            self.log.append(
                self.clock.now(),
                Event::RoleRevoked {
                    principal: principal.clone(),
                    role,
                },
            );
        }
        Ok(())
    }

    /// Return `true` if `principal` holds `role`.
    pub fn has_role(&self, principal: &Principal, role: Role) -> bool {
        self.state.roles.has(principal, role)
    }

    // ─────────────────────────────────────────────────────────
    // NGO registry
    // ─────────────────────────────────────────────────────────

    /// Register a new NGO. Admin-gated.
    ///
    /// The NGO starts unverified and is granted the `Minter` role so it
    /// can issue badges once verified.
    pub fn register_ngo(
        &mut self,
        caller: &Principal,
        ngo: &Principal,
        name: &str,
    ) -> Result<(), LedgerError> {
        rbac::require_admin(&self.state.roles, caller)?;
        if ngo.is_zero() {
            return Err(LedgerError::InvalidPrincipal(
                "NGO principal must not be zero".into(),
            ));
        }
        if name.is_empty() {
            return Err(LedgerError::InvalidInput("NGO name required".into()));
        }
        if self.state.ngos.contains_key(ngo) {
            return Err(LedgerError::AlreadyRegistered(format!(
                "NGO {ngo} is already registered"
            )));
        }

        let now = self.clock.now();
        self.state.ngos.insert(
            ngo.clone(),
            NgoRecord {
                principal: ngo.clone(),
                name: name.to_string(),
                is_verified: false,
                registered_at: now,
            },
        );
        self.state.stats.total_ngos_registered += 1;

        if self.state.roles.grant(ngo, Role::Minter) {
            self.log.append(
                now,
                Event::RoleGranted {
                    principal: ngo.clone(),
                    role: Role::Minter,
                },
            );
        }
        self.log.append(
            now,
            Event::NgoRegistered {
                ngo: ngo.clone(),
                name: name.to_string(),
            },
        );
        Ok(())
    }

    /// Set an NGO's verification flag. Admin-gated. Idempotent:
    /// setting the same value twice is legal and logs both calls.
    pub fn verify_ngo(
        &mut self,
        caller: &Principal,
        ngo: &Principal,
        verified: bool,
    ) -> Result<(), LedgerError> {
        rbac::require_admin(&self.state.roles, caller)?;
        let record = self
            .state
            .ngos
            .get_mut(ngo)
            .ok_or_else(|| LedgerError::NotFound(format!("NGO {ngo} is not registered")))?;
        record.is_verified = verified;
        self.log.append(
            self.clock.now(),
            Event::NgoVerified {
                ngo: ngo.clone(),
                verified,
            },
        );
        Ok(())
    }

    /// Retrieve an NGO record.
    pub fn get_ngo_info(&self, ngo: &Principal) -> Result<NgoRecord, LedgerError> {
        self.state
            .ngo(ngo)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(format!("NGO {ngo} is not registered")))
    }

    // ─────────────────────────────────────────────────────────
    // Credential ledger
    // ─────────────────────────────────────────────────────────

    /// Issue `hours` volunteer hours to `volunteer`.
    ///
    /// The caller must hold `Minter` and be a **verified** NGO. First
    /// issuance creates the volunteer's credential with the next
    /// sequential id; later issuances accumulate hours on the same id
    /// and overwrite the issuing NGO, metadata URI and activity type
    /// with this call's values.
    ///
    /// Returns the credential id.
    pub fn issue_badge(
        &mut self,
        caller: &Principal,
        volunteer: &Principal,
        hours: u64,
        metadata_uri: &str,
        activity_type: &str,
    ) -> Result<u64, LedgerError> {
        rbac::require_minter(&self.state.roles, caller)?;
        let ngo = self
            .state
            .ngo(caller)
            .ok_or_else(|| LedgerError::NotFound(format!("no NGO record for {caller}")))?;
        if !ngo.is_verified {
            return Err(LedgerError::NgoNotVerified(format!(
                "NGO {caller} must be verified before issuing badges"
            )));
        }
        if volunteer.is_zero() {
            return Err(LedgerError::InvalidPrincipal(
                "volunteer principal must not be zero".into(),
            ));
        }
        if hours == 0 {
            return Err(LedgerError::InvalidInput("hours must be positive".into()));
        }
        if metadata_uri.is_empty() {
            return Err(LedgerError::InvalidInput("metadata URI required".into()));
        }
        // Overflow is a precondition failure, not a mid-mutation panic.
        // Every issuance adds at least one hour, so the volunteer and
        // activity counters are bounded by these two totals and need no
        // checks of their own.
        let current_hours = self
            .state
            .credential_of(volunteer)
            .map(|c| c.total_hours)
            .unwrap_or(0);
        if current_hours.checked_add(hours).is_none()
            || self.state.stats.total_hours_issued.checked_add(hours).is_none()
        {
            return Err(LedgerError::InvalidInput(
                "hours would overflow the accumulated total".into(),
            ));
        }

        let now = self.clock.now();
        let id = match self.state.credential_of_mut(volunteer) {
            Some(credential) => {
                // Accumulate on the existing badge; most-recent-wins for
                // everything that is not a counter.
                credential.total_hours += hours;
                credential.activities_count += 1;
                credential.issuing_ngo = caller.clone();
                credential.last_activity = now;
                credential.metadata_uri = metadata_uri.to_string();
                credential.last_activity_type = activity_type.to_string();
                let id = credential.id;
                self.state.stats.total_hours_issued += hours;
                id
            }
            None => {
                let id = self.state.next_credential_id();
                self.state.insert_credential(Credential {
                    id,
                    volunteer: volunteer.clone(),
                    total_hours: hours,
                    activities_count: 1,
                    issuing_ngo: caller.clone(),
                    last_activity: now,
                    metadata_uri: metadata_uri.to_string(),
                    last_activity_type: activity_type.to_string(),
                });
                id
            }
        };

        self.log.append(
            now,
            Event::BadgeIssued {
                volunteer: volunteer.clone(),
                credential_id: id,
                hours,
                issuing_ngo: caller.clone(),
                activity_type: activity_type.to_string(),
            },
        );
        Ok(id)
    }

    /// Burn a credential — full reset, not a partial rollback.
    ///
    /// The caller must be the owning volunteer (self-service
    /// revocation) or hold `Admin`. All accumulated hours leave the
    /// platform aggregates; the id is never reused.
    pub fn burn(&mut self, caller: &Principal, credential_id: u64) -> Result<(), LedgerError> {
        let credential = self.state.credential(credential_id).ok_or_else(|| {
            LedgerError::NotFound(format!("no live credential with id {credential_id}"))
        })?;
        if &credential.volunteer != caller && !self.state.roles.has(caller, Role::Admin) {
            return Err(LedgerError::Unauthorized(format!(
                "{caller} is neither the owner of credential {credential_id} nor an admin"
            )));
        }

        // Checked above; remove cannot fail now.
        let removed = self
            .state
            .remove_credential(credential_id)
            .ok_or_else(|| LedgerError::NotFound(format!("credential {credential_id}")))?;
        self.log.append(
            self.clock.now(),
            Event::BadgeBurned {
                credential_id,
                volunteer: removed.volunteer,
            },
        );
        Ok(())
    }

    /// Credentials are soul-bound: any transfer attempt fails. A dead
    /// id reports `NotFound`, a live one `NonTransferable`.
    pub fn transfer(
        &self,
        _caller: &Principal,
        _to: &Principal,
        credential_id: u64,
    ) -> Result<(), LedgerError> {
        if self.state.credential(credential_id).is_none() {
            return Err(LedgerError::NotFound(format!(
                "no live credential with id {credential_id}"
            )));
        }
        Err(LedgerError::NonTransferable(format!(
            "credential {credential_id} is soul-bound and cannot change owner"
        )))
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    pub fn has_volunteer_badge(&self, volunteer: &Principal) -> bool {
        self.state.badge_of(volunteer) != 0
    }

    /// Credential id held by `volunteer`, or 0 when none.
    pub fn badge_of(&self, volunteer: &Principal) -> u64 {
        self.state.badge_of(volunteer)
    }

    /// Accumulated hours for `volunteer`, 0 when no live credential.
    pub fn get_total_hours(&self, volunteer: &Principal) -> u64 {
        self.state
            .credential_of(volunteer)
            .map(|c| c.total_hours)
            .unwrap_or(0)
    }

    /// Profile view; empty defaults when no live credential.
    pub fn get_volunteer_profile(&self, volunteer: &Principal) -> VolunteerProfile {
        match self.state.credential_of(volunteer) {
            Some(c) => VolunteerProfile {
                total_hours: c.total_hours,
                activities_count: c.activities_count,
                issuing_ngo: c.issuing_ngo.clone(),
                last_activity: c.last_activity,
            },
            None => VolunteerProfile::default(),
        }
    }

    /// Credential verification view. Never fails: returns the
    /// `(false, 0, 0, zero)` tuple when no live credential exists.
    pub fn verify_volunteer_credential(&self, volunteer: &Principal) -> CredentialCheck {
        match self.state.credential_of(volunteer) {
            Some(c) => CredentialCheck {
                is_valid: true,
                total_hours: c.total_hours,
                last_activity: c.last_activity,
                issuing_ngo: c.issuing_ngo.clone(),
            },
            None => CredentialCheck::default(),
        }
    }

    /// The three platform aggregates.
    pub fn get_platform_stats(&self) -> PlatformStats {
        self.state.stats
    }

    /// Metadata URI of a live credential.
    pub fn metadata_uri(&self, credential_id: u64) -> Result<String, LedgerError> {
        self.state
            .credential(credential_id)
            .map(|c| c.metadata_uri.clone())
            .ok_or_else(|| {
                LedgerError::NotFound(format!("no live credential with id {credential_id}"))
            })
    }

    /// The full committed event history.
    pub fn events(&self) -> &EventLog {
        &self.log
    }

    /// Finite, restartable iteration over events matching `filter`.
    pub fn query_events<'a>(
        &'a self,
        filter: &'a EventFilter,
    ) -> impl Iterator<Item = &'a EventRecord> {
        self.log.query(filter)
    }
}
