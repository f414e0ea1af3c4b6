//! # Types
//!
//! Shared data structures used across all modules of the volunteer ledger.
//!
//! ## Design decisions
//!
//! ### Principal as an opaque key
//!
//! A [`Principal`] is an opaque identity string (a wallet address in the
//! original deployment). The ledger never interprets it beyond equality
//! and the null check: the empty string is the "zero" principal and is
//! rejected wherever a real identity is required.
//!
//! ### Credential as a soul-bound accumulator
//!
//! A [`Credential`] is one-per-volunteer. Repeat issuance accumulates
//! `total_hours` / `activities_count` but **overwrites** `issuing_ngo`,
//! `metadata_uri` and `last_activity_type` with the most recent call's
//! values — only the aggregate counters preserve earlier activities.
//! This mirrors the source system's behavior and is relied upon by
//! credential verification; it is not a bug to fix.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// An opaque identity used as a key for roles, NGO ownership and
/// credential ownership. The empty string is the null ("zero") principal.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Principal(id.into())
    }

    /// The null identity. Returned by queries when no real principal
    /// applies, rejected by every command that needs a real identity.
    pub fn zero() -> Self {
        Principal(String::new())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(s: &str) -> Self {
        Principal(s.to_string())
    }
}

impl From<String> for Principal {
    fn from(s: String) -> Self {
        Principal(s)
    }
}

/// An NGO registration record. Created by `register_ngo`, mutated only
/// by `verify_ngo`, never deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgoRecord {
    pub principal: Principal,
    pub name: String,
    pub is_verified: bool,
    pub registered_at: u64,
}

/// A live volunteer credential ("badge").
///
/// `id` is ledger-assigned, sequential from 1; id 0 is the "no badge"
/// sentinel and never stored. `volunteer` is immutable for the life of
/// the credential (soul-bound).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub id: u64,
    pub volunteer: Principal,
    pub total_hours: u64,
    pub activities_count: u64,
    pub issuing_ngo: Principal,
    pub last_activity: u64,
    pub metadata_uri: String,
    pub last_activity_type: String,
}

/// Public profile view of a volunteer. All-zero defaults when the
/// volunteer holds no live credential.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolunteerProfile {
    pub total_hours: u64,
    pub activities_count: u64,
    pub issuing_ngo: Principal,
    pub last_activity: u64,
}

/// Result of a credential verification query. Always well-formed:
/// `(false, 0, 0, zero)` when no live credential exists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialCheck {
    pub is_valid: bool,
    pub total_hours: u64,
    pub last_activity: u64,
    pub issuing_ngo: Principal,
}

impl Default for CredentialCheck {
    fn default() -> Self {
        CredentialCheck {
            is_valid: false,
            total_hours: 0,
            last_activity: 0,
            issuing_ngo: Principal::zero(),
        }
    }
}

/// Platform-wide aggregates, maintained incrementally by the commands.
///
/// `total_ngos_registered` counts registrations ever made and is never
/// decremented; the other two track live credentials only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub total_volunteers_with_badge: u64,
    pub total_hours_issued: u64,
    pub total_ngos_registered: u64,
}

/// Source of "now" for `registered_at` / `last_activity` timestamps
/// (seconds since the Unix epoch).
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Wall-clock time. Used by default in production.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// A settable clock for deterministic tests.
#[derive(Debug, Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    pub fn new(now: u64) -> Self {
        ManualClock(AtomicU64::new(now))
    }

    pub fn set(&self, now: u64) {
        self.0.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}
