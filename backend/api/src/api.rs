//! Axum REST handlers exposing the ledger's command/query API.
//!
//! Commands take the single ledger lock for their whole duration,
//! including the durability write, so they execute as serialized,
//! all-or-nothing transactions. A command whose durability write fails
//! is rolled back in memory, so queries never observe a command the
//! client was told failed. Queries take the same lock briefly and
//! always read the latest committed state.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::info;
use volunteer_ledger::{
    CredentialCheck, EventKind, LedgerError, NgoRecord, PlatformStats, Principal, SystemClock,
    VolunteerLedger, VolunteerProfile,
};

use crate::db::{self, EventRow};
use crate::errors::{ApiError, Result};

pub struct AppState {
    pub ledger: Mutex<VolunteerLedger>,
    pub pool: SqlitePool,
}

/// Run one command against the ledger and flush its events, plus the
/// post-command snapshot, to SQLite. Called with the ledger lock held.
///
/// If the durability write fails the in-memory ledger is restored to
/// its pre-command snapshot, so memory never runs ahead of what is on
/// disk and the client-visible failure means "nothing happened".
async fn run_command<T>(
    pool: &SqlitePool,
    ledger: &mut VolunteerLedger,
    command: impl FnOnce(&mut VolunteerLedger) -> std::result::Result<T, LedgerError>,
) -> Result<T> {
    let rollback = ledger.snapshot();
    let seq_before = ledger.events().len() as u64;
    let out = command(ledger)?;
    if let Err(err) = db::commit_command(
        pool,
        ledger.events().records_after(seq_before),
        &ledger.snapshot(),
    )
    .await
    {
        *ledger = VolunteerLedger::from_snapshot(rollback, Arc::new(SystemClock));
        return Err(err);
    }
    Ok(out)
}

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterNgoRequest {
    pub caller: Principal,
    pub principal: Principal,
    pub name: String,
}

#[derive(Deserialize)]
pub struct VerifyNgoRequest {
    pub caller: Principal,
    pub verified: bool,
}

#[derive(Deserialize)]
pub struct IssueBadgeRequest {
    pub caller: Principal,
    pub volunteer: Principal,
    pub hours: u64,
    pub metadata_uri: String,
    pub activity_type: String,
}

#[derive(Deserialize)]
pub struct BurnRequest {
    pub caller: Principal,
}

#[derive(Serialize)]
pub struct IssueBadgeResponse {
    pub credential_id: u64,
    pub total_hours: u64,
}

#[derive(Serialize)]
pub struct BurnResponse {
    pub credential_id: u64,
    pub burned: bool,
}

#[derive(Serialize)]
pub struct MetadataResponse {
    pub credential_id: u64,
    pub metadata_uri: String,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub principal: Principal,
    pub has_badge: bool,
    pub credential_id: u64,
    #[serde(flatten)]
    pub profile: VolunteerProfile,
}

#[derive(Deserialize)]
pub struct EventsQuery {
    pub kind: Option<String>,
    pub principal: Option<String>,
}

#[derive(Serialize)]
pub struct EventsResponse {
    pub count: usize,
    pub events: Vec<EventRow>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

// ─────────────────────────────────────────────────────────
// Handlers — commands
// ─────────────────────────────────────────────────────────

/// `POST /ngos`
pub async fn register_ngo(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterNgoRequest>,
) -> Result<impl IntoResponse> {
    let mut ledger = state.ledger.lock().await;
    let record = run_command(&state.pool, &mut ledger, |l| {
        l.register_ngo(&req.caller, &req.principal, &req.name)?;
        l.get_ngo_info(&req.principal)
    })
    .await?;

    info!("NGO {} registered as {:?}", req.principal, req.name);
    Ok((StatusCode::CREATED, Json(record)))
}

/// `POST /ngos/:principal/verify`
pub async fn verify_ngo(
    State(state): State<Arc<AppState>>,
    Path(principal): Path<String>,
    Json(req): Json<VerifyNgoRequest>,
) -> Result<Json<NgoRecord>> {
    let ngo = Principal::from(principal);
    let mut ledger = state.ledger.lock().await;
    let record = run_command(&state.pool, &mut ledger, |l| {
        l.verify_ngo(&req.caller, &ngo, req.verified)?;
        l.get_ngo_info(&ngo)
    })
    .await?;

    info!("NGO {ngo} verification set to {}", req.verified);
    Ok(Json(record))
}

/// `POST /badges`
pub async fn issue_badge(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IssueBadgeRequest>,
) -> Result<impl IntoResponse> {
    let mut ledger = state.ledger.lock().await;
    let response = run_command(&state.pool, &mut ledger, |l| {
        let credential_id = l.issue_badge(
            &req.caller,
            &req.volunteer,
            req.hours,
            &req.metadata_uri,
            &req.activity_type,
        )?;
        Ok(IssueBadgeResponse {
            credential_id,
            total_hours: l.get_total_hours(&req.volunteer),
        })
    })
    .await?;

    info!(
        "Badge {}: {} hours to {} from {}",
        response.credential_id, req.hours, req.volunteer, req.caller
    );
    Ok((StatusCode::CREATED, Json(response)))
}

/// `POST /badges/:id/burn`
pub async fn burn_badge(
    State(state): State<Arc<AppState>>,
    Path(credential_id): Path<u64>,
    Json(req): Json<BurnRequest>,
) -> Result<Json<BurnResponse>> {
    let mut ledger = state.ledger.lock().await;
    run_command(&state.pool, &mut ledger, |l| l.burn(&req.caller, credential_id)).await?;

    info!("Credential {credential_id} burned by {}", req.caller);
    Ok(Json(BurnResponse {
        credential_id,
        burned: true,
    }))
}

// ─────────────────────────────────────────────────────────
// Handlers — queries
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /ngos/:principal`
pub async fn get_ngo(
    State(state): State<Arc<AppState>>,
    Path(principal): Path<String>,
) -> Result<Json<NgoRecord>> {
    let ledger = state.ledger.lock().await;
    Ok(Json(ledger.get_ngo_info(&Principal::from(principal))?))
}

/// `GET /badges/:id/metadata`
pub async fn badge_metadata(
    State(state): State<Arc<AppState>>,
    Path(credential_id): Path<u64>,
) -> Result<Json<MetadataResponse>> {
    let ledger = state.ledger.lock().await;
    let metadata_uri = ledger.metadata_uri(credential_id)?;
    Ok(Json(MetadataResponse {
        credential_id,
        metadata_uri,
    }))
}

/// `GET /volunteers/:principal`
///
/// Always succeeds; a volunteer without a badge gets empty defaults.
pub async fn volunteer_profile(
    State(state): State<Arc<AppState>>,
    Path(principal): Path<String>,
) -> Result<Json<ProfileResponse>> {
    let volunteer = Principal::from(principal);
    let ledger = state.ledger.lock().await;
    Ok(Json(ProfileResponse {
        has_badge: ledger.has_volunteer_badge(&volunteer),
        credential_id: ledger.badge_of(&volunteer),
        profile: ledger.get_volunteer_profile(&volunteer),
        principal: volunteer,
    }))
}

/// `GET /volunteers/:principal/credential`
///
/// The credential-verification tuple; all-zero/null when no live
/// credential exists.
pub async fn verify_credential(
    State(state): State<Arc<AppState>>,
    Path(principal): Path<String>,
) -> Result<Json<CredentialCheck>> {
    let ledger = state.ledger.lock().await;
    Ok(Json(
        ledger.verify_volunteer_credential(&Principal::from(principal)),
    ))
}

/// `GET /stats`
pub async fn platform_stats(State(state): State<Arc<AppState>>) -> Result<Json<PlatformStats>> {
    let ledger = state.ledger.lock().await;
    Ok(Json(ledger.get_platform_stats()))
}

/// `GET /events?kind=&principal=`
///
/// Served from the durable audit copy, ordered by sequence number.
pub async fn get_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventsResponse>> {
    if let Some(kind) = query.kind.as_deref() {
        if EventKind::parse(kind).is_none() {
            return Err(ApiError::InvalidQuery(format!(
                "unknown event kind {kind:?}"
            )));
        }
    }
    let events = db::get_events(
        &state.pool,
        query.kind.as_deref(),
        query.principal.as_deref(),
    )
    .await?;
    Ok(Json(EventsResponse {
        count: events.len(),
        events,
    }))
}
