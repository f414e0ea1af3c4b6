#![allow(dead_code)]

use crate::{Credential, VolunteerLedger};

/// INV-1: aggregate consistency — the platform counters must equal the
/// values recomputed from the live credential table.
pub fn assert_aggregates_consistent(ledger: &VolunteerLedger) {
    let stats = ledger.get_platform_stats();
    let snapshot = ledger.snapshot();
    let live = snapshot.state.credentials.len() as u64;
    let hours: u64 = snapshot
        .state
        .credentials
        .values()
        .map(|c| c.total_hours)
        .sum();
    assert_eq!(
        stats.total_volunteers_with_badge, live,
        "INV-1 violated: {} volunteers counted, {} live credentials",
        stats.total_volunteers_with_badge, live
    );
    assert_eq!(
        stats.total_hours_issued, hours,
        "INV-1 violated: {} hours counted, {} hours in live credentials",
        stats.total_hours_issued, hours
    );
}

/// INV-2: the owner index and the credential table must agree exactly.
pub fn assert_owner_index_consistent(ledger: &VolunteerLedger) {
    let snapshot = ledger.snapshot();
    assert_eq!(
        snapshot.state.badge_by_volunteer.len(),
        snapshot.state.credentials.len(),
        "INV-2 violated: owner index and credential table differ in size"
    );
    for (volunteer, id) in &snapshot.state.badge_by_volunteer {
        let credential = snapshot
            .state
            .credentials
            .get(id)
            .unwrap_or_else(|| panic!("INV-2 violated: index points at dead credential {id}"));
        assert_eq!(
            &credential.volunteer, volunteer,
            "INV-2 violated: credential {id} owned by {} but indexed under {volunteer}",
            credential.volunteer
        );
    }
}

/// INV-3: credential ids are positive; 0 is reserved for "no badge".
pub fn assert_ids_positive(ledger: &VolunteerLedger) {
    let snapshot = ledger.snapshot();
    for id in snapshot.state.credentials.keys() {
        assert!(*id > 0, "INV-3 violated: credential stored under id 0");
    }
}

/// INV-4: soul-bound ownership — a credential's volunteer field never
/// changes between two observations of the same id.
pub fn assert_owner_unchanged(before: &Credential, after: &Credential) {
    assert_eq!(before.id, after.id, "INV-4 check compares different ids");
    assert_eq!(
        before.volunteer, after.volunteer,
        "INV-4 violated: credential {} changed owner from {} to {}",
        before.id, before.volunteer, after.volunteer
    );
}

/// INV-5: total_hours is monotonically non-decreasing for a live
/// credential (only burn resets it, by deleting the record).
pub fn assert_hours_monotonic(hours_before: u64, hours_after: u64) {
    assert!(
        hours_after >= hours_before,
        "INV-5 violated: total_hours decreased from {hours_before} to {hours_after}"
    );
}

/// INV-6: event sequence numbers are 1-based and gap-free.
pub fn assert_event_seq_dense(ledger: &VolunteerLedger) {
    for (i, record) in ledger.events().records().iter().enumerate() {
        assert_eq!(
            record.seq,
            i as u64 + 1,
            "INV-6 violated: record at position {i} has seq {}",
            record.seq
        );
    }
}

/// Run every whole-ledger invariant.
pub fn assert_all(ledger: &VolunteerLedger) {
    assert_aggregates_consistent(ledger);
    assert_owner_index_consistent(ledger);
    assert_ids_positive(ledger);
    assert_event_seq_dense(ledger);
}
