//! # Storage
//!
//! Owned, in-memory ledger state with typed accessors. All tables are
//! `BTreeMap`s keyed by stable identity/integer keys:
//!
//! | Table                 | Key         | Value        | Description                          |
//! |-----------------------|-------------|--------------|--------------------------------------|
//! | `ngos`                | `Principal` | `NgoRecord`  | One record per NGO, never deleted    |
//! | `credentials`         | `u64`       | `Credential` | Live badges keyed by credential id   |
//! | `badge_by_volunteer`  | `Principal` | `u64`        | Owner index into `credentials`       |
//!
//! Plus a monotonic credential-id counter and the three platform
//! aggregate counters. The state serializes as a whole so a durability
//! layer can snapshot and reload it to an identical queryable state.
//!
//! Credential ids start at 1; 0 is the "no badge" sentinel. Ids of
//! burned credentials are never reused — the counter only moves
//! forward.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::rbac::RoleStore;
use crate::types::{Credential, NgoRecord, PlatformStats, Principal};

/// The full mutable state of the ledger. Exclusively owned by
/// [`VolunteerLedger`](crate::VolunteerLedger); commands mutate it
/// through `&mut self`, which is what makes every command a serialized,
/// all-or-nothing transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub roles: RoleStore,
    pub ngos: BTreeMap<Principal, NgoRecord>,
    pub credentials: BTreeMap<u64, Credential>,
    pub badge_by_volunteer: BTreeMap<Principal, u64>,
    pub stats: PlatformStats,
    next_credential_id: u64,
}

impl LedgerState {
    /// Reads, increments and stores the credential-id counter.
    /// Returns the id to assign to the credential being created.
    pub fn next_credential_id(&mut self) -> u64 {
        self.next_credential_id += 1;
        self.next_credential_id
    }

    pub fn ngo(&self, principal: &Principal) -> Option<&NgoRecord> {
        self.ngos.get(principal)
    }

    pub fn credential(&self, id: u64) -> Option<&Credential> {
        self.credentials.get(&id)
    }

    /// Credential id held by `volunteer`, or 0 when none.
    pub fn badge_of(&self, volunteer: &Principal) -> u64 {
        self.badge_by_volunteer.get(volunteer).copied().unwrap_or(0)
    }

    pub fn credential_of(&self, volunteer: &Principal) -> Option<&Credential> {
        self.badge_by_volunteer
            .get(volunteer)
            .and_then(|id| self.credentials.get(id))
    }

    pub fn credential_of_mut(&mut self, volunteer: &Principal) -> Option<&mut Credential> {
        match self.badge_by_volunteer.get(volunteer) {
            Some(id) => self.credentials.get_mut(id),
            None => None,
        }
    }

    /// Insert a freshly created credential and update the owner index
    /// and live-credential aggregates.
    pub fn insert_credential(&mut self, credential: Credential) {
        self.badge_by_volunteer
            .insert(credential.volunteer.clone(), credential.id);
        self.stats.total_volunteers_with_badge += 1;
        self.stats.total_hours_issued += credential.total_hours;
        self.credentials.insert(credential.id, credential);
    }

    /// Remove a credential entirely, unwinding the owner index and the
    /// live-credential aggregates. Returns the removed record.
    pub fn remove_credential(&mut self, id: u64) -> Option<Credential> {
        let credential = self.credentials.remove(&id)?;
        self.badge_by_volunteer.remove(&credential.volunteer);
        self.stats.total_volunteers_with_badge -= 1;
        self.stats.total_hours_issued -= credential.total_hours;
        Some(credential)
    }
}
