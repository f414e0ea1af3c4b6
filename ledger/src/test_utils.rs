use std::sync::Arc;

use crate::{ManualClock, Principal, VolunteerLedger};

/// Starting timestamp for every test ledger.
pub const T0: u64 = 100_000;

pub struct TestContext {
    pub ledger: VolunteerLedger,
    pub clock: Arc<ManualClock>,
    pub admin: Principal,
    pub ngo: Principal,
    pub volunteer: Principal,
}

impl TestContext {
    /// A fresh ledger with a manual clock at [`T0`]; the admin holds
    /// both roles, nothing else is set up.
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new(T0));
        let admin = Principal::from("admin");
        let ledger = VolunteerLedger::with_clock(admin.clone(), clock.clone());
        TestContext {
            ledger,
            clock,
            admin,
            ngo: Principal::from("ngo-green-earth"),
            volunteer: Principal::from("volunteer-1"),
        }
    }

    /// A ledger where `self.ngo` is already registered and verified,
    /// ready to issue badges.
    pub fn with_verified_ngo() -> Self {
        let mut ctx = Self::new();
        ctx.ledger
            .register_ngo(&ctx.admin, &ctx.ngo, "Green Earth NGO")
            .unwrap();
        ctx.ledger.verify_ngo(&ctx.admin, &ctx.ngo, true).unwrap();
        ctx
    }

    /// Issue a badge from the context NGO to the context volunteer.
    pub fn issue(&mut self, hours: u64, uri: &str, activity: &str) -> u64 {
        self.ledger
            .issue_badge(&self.ngo, &self.volunteer, hours, uri, activity)
            .unwrap()
    }
}
