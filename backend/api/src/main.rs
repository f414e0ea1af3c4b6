//! Volunteer Credential Ledger API — entry point.
//!
//! Boots the ledger (fresh, or restored from the SQLite snapshot) and
//! exposes its command/query surface as a small Axum REST API.

mod api;
mod config;
mod db;
mod errors;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use volunteer_ledger::{Principal, SystemClock, VolunteerLedger};

use api::AppState;
use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    // Load config from environment.
    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    // Set up the SQLite connection pool and run migrations.
    let pool = db::init_pool(&config.database_url).await?;

    // Restore the ledger from the persisted snapshot, or initialise a
    // fresh one with the configured admin.
    let ledger = match db::load_snapshot(&pool).await? {
        Some(snapshot) => {
            let ledger = VolunteerLedger::from_snapshot(snapshot, Arc::new(SystemClock));
            info!(
                "Ledger restored: {} events, {} NGOs registered",
                ledger.events().len(),
                ledger.get_platform_stats().total_ngos_registered
            );
            ledger
        }
        None => {
            let admin = Principal::from(config.admin_principal.clone());
            let ledger = VolunteerLedger::new(admin);
            // Persist the bootstrap grants so a restart before the
            // first command still restores an initialised ledger.
            db::commit_command(&pool, ledger.events().records(), &ledger.snapshot()).await?;
            info!("Fresh ledger initialised; admin: {}", config.admin_principal);
            ledger
        }
    };

    let state = Arc::new(AppState {
        ledger: Mutex::new(ledger),
        pool,
    });

    let app = Router::new()
        .route("/health", get(api::health))
        .route("/ngos", post(api::register_ngo))
        .route("/ngos/:principal", get(api::get_ngo))
        .route("/ngos/:principal/verify", post(api::verify_ngo))
        .route("/badges", post(api::issue_badge))
        .route("/badges/:id/burn", post(api::burn_badge))
        .route("/badges/:id/metadata", get(api::badge_metadata))
        .route("/volunteers/:principal", get(api::volunteer_profile))
        .route(
            "/volunteers/:principal/credential",
            get(api::verify_credential),
        )
        .route("/stats", get(api::platform_stats))
        .route("/events", get(api::get_events))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
