//! Ledger events — the append-only audit record of state-changing
//! actions.
//!
//! Every successful command appends one or more [`Event`]s to the
//! [`EventLog`]. Entries are never mutated after append; consumers read
//! them through [`EventLog::query`], a finite, restartable iteration
//! over the committed history.

use serde::{Deserialize, Serialize};

use crate::rbac::Role;
use crate::types::Principal;

/// All event kinds the ledger emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    NgoRegistered,
    NgoVerified,
    RoleGranted,
    RoleRevoked,
    BadgeIssued,
    BadgeBurned,
}

impl EventKind {
    /// Short identifier string suitable for storage and query params.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NgoRegistered => "ngo_registered",
            Self::NgoVerified => "ngo_verified",
            Self::RoleGranted => "role_granted",
            Self::RoleRevoked => "role_revoked",
            Self::BadgeIssued => "badge_issued",
            Self::BadgeBurned => "badge_burned",
        }
    }

    /// Inverse of [`EventKind::as_str`]. Returns `None` for unknown
    /// identifiers.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ngo_registered" => Some(Self::NgoRegistered),
            "ngo_verified" => Some(Self::NgoVerified),
            "role_granted" => Some(Self::RoleGranted),
            "role_revoked" => Some(Self::RoleRevoked),
            "badge_issued" => Some(Self::BadgeIssued),
            "badge_burned" => Some(Self::BadgeBurned),
            _ => None,
        }
    }
}

/// A state-changing action, recorded after the mutation committed.
///
/// `BadgeIssued.hours` is the incremental amount added by that call,
/// not the volunteer's cumulative total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    NgoRegistered {
        ngo: Principal,
        name: String,
    },
    NgoVerified {
        ngo: Principal,
        verified: bool,
    },
    RoleGranted {
        principal: Principal,
        role: Role,
    },
    RoleRevoked {
        principal: Principal,
        role: Role,
    },
    BadgeIssued {
        volunteer: Principal,
        credential_id: u64,
        hours: u64,
        issuing_ngo: Principal,
        activity_type: String,
    },
    BadgeBurned {
        credential_id: u64,
        volunteer: Principal,
    },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::NgoRegistered { .. } => EventKind::NgoRegistered,
            Event::NgoVerified { .. } => EventKind::NgoVerified,
            Event::RoleGranted { .. } => EventKind::RoleGranted,
            Event::RoleRevoked { .. } => EventKind::RoleRevoked,
            Event::BadgeIssued { .. } => EventKind::BadgeIssued,
            Event::BadgeBurned { .. } => EventKind::BadgeBurned,
        }
    }

    /// Whether `principal` appears anywhere in this event (as subject,
    /// issuer or grantee).
    pub fn involves(&self, principal: &Principal) -> bool {
        match self {
            Event::NgoRegistered { ngo, .. } | Event::NgoVerified { ngo, .. } => ngo == principal,
            Event::RoleGranted { principal: p, .. } | Event::RoleRevoked { principal: p, .. } => {
                p == principal
            }
            Event::BadgeIssued {
                volunteer,
                issuing_ngo,
                ..
            } => volunteer == principal || issuing_ngo == principal,
            Event::BadgeBurned { volunteer, .. } => volunteer == principal,
        }
    }
}

/// An [`Event`] as it sits in the log: sequence number (1-based,
/// gap-free) plus the ledger timestamp at which it was appended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub seq: u64,
    pub timestamp: u64,
    #[serde(flatten)]
    pub event: Event,
}

/// Criteria for [`EventLog::query`]. An empty filter matches every
/// event.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    pub kind: Option<EventKind>,
    pub principal: Option<Principal>,
}

impl EventFilter {
    pub fn matches(&self, record: &EventRecord) -> bool {
        if let Some(kind) = self.kind {
            if record.event.kind() != kind {
                return false;
            }
        }
        if let Some(principal) = &self.principal {
            if !record.event.involves(principal) {
                return false;
            }
        }
        true
    }
}

/// Append-only, ordered event history.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Append an event. Infallible by contract: called only after the
    /// originating mutation has committed.
    pub fn append(&mut self, timestamp: u64, event: Event) {
        let seq = self.records.len() as u64 + 1;
        self.records.push(EventRecord {
            seq,
            timestamp,
            event,
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The full committed history, oldest first.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records appended after sequence number `seq` (exclusive). Lets a
    /// durability layer pick up exactly the events a command produced.
    pub fn records_after(&self, seq: u64) -> &[EventRecord] {
        let start = (seq as usize).min(self.records.len());
        &self.records[start..]
    }

    /// Lazy, finite, restartable iteration over matching events.
    pub fn query<'a>(&'a self, filter: &'a EventFilter) -> impl Iterator<Item = &'a EventRecord> {
        self.records.iter().filter(move |r| filter.matches(r))
    }
}
