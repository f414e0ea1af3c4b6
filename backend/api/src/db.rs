//! Database layer — migrations, snapshot persistence and the audit
//! copy of the event log.

use serde::Serialize;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;
use volunteer_ledger::{Event, EventRecord, LedgerSnapshot};

use crate::errors::Result;

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    // Make sure the file is created if it doesn't exist yet.
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Snapshot persistence
// ─────────────────────────────────────────────────────────

/// Load the persisted ledger snapshot, if one has been saved.
pub async fn load_snapshot(pool: &SqlitePool) -> Result<Option<LedgerSnapshot>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT state FROM ledger_snapshot WHERE id = 1")
        .fetch_optional(pool)
        .await?;
    match row {
        Some((json,)) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Persist the events produced by one successful command together with
/// the post-command snapshot, atomically.
///
/// Event rows are keyed by the core log's sequence number with
/// `INSERT OR IGNORE`, so replaying already-stored events is a no-op.
pub async fn commit_command(
    pool: &SqlitePool,
    new_events: &[EventRecord],
    snapshot: &LedgerSnapshot,
) -> Result<()> {
    let snapshot_json = serde_json::to_string(snapshot)?;
    let recorded_at = chrono::Utc::now().timestamp();

    let mut tx = pool.begin().await?;
    for record in new_events {
        let row = EventRow::from_record(record, recorded_at);
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO events
                (seq, event_type, principal, counterparty, credential_id, hours, detail,
                 timestamp, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(row.seq)
        .bind(&row.event_type)
        .bind(&row.principal)
        .bind(&row.counterparty)
        .bind(row.credential_id)
        .bind(row.hours)
        .bind(&row.detail)
        .bind(row.timestamp)
        .bind(row.recorded_at)
        .execute(&mut *tx)
        .await?;
    }
    sqlx::query(
        "INSERT OR REPLACE INTO ledger_snapshot (id, state, saved_at) VALUES (1, ?1, ?2)",
    )
    .bind(&snapshot_json)
    .bind(recorded_at)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Event reads
// ─────────────────────────────────────────────────────────

/// A flattened event row as stored in / read from the database.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EventRow {
    pub seq: i64,
    pub event_type: String,
    /// Main subject: the NGO, grantee or volunteer the event is about.
    pub principal: String,
    /// Second involved principal (the issuing NGO on `badge_issued`).
    pub counterparty: Option<String>,
    pub credential_id: Option<i64>,
    pub hours: Option<i64>,
    /// Kind-specific detail: NGO name, verification flag, role tag or
    /// activity type.
    pub detail: Option<String>,
    pub timestamp: i64,
    pub recorded_at: i64,
}

impl EventRow {
    fn from_record(record: &EventRecord, recorded_at: i64) -> Self {
        let mut row = EventRow {
            seq: record.seq as i64,
            event_type: record.event.kind().as_str().to_string(),
            principal: String::new(),
            counterparty: None,
            credential_id: None,
            hours: None,
            detail: None,
            timestamp: record.timestamp as i64,
            recorded_at,
        };
        match &record.event {
            Event::NgoRegistered { ngo, name } => {
                row.principal = ngo.to_string();
                row.detail = Some(name.clone());
            }
            Event::NgoVerified { ngo, verified } => {
                row.principal = ngo.to_string();
                row.detail = Some(verified.to_string());
            }
            Event::RoleGranted { principal, role } | Event::RoleRevoked { principal, role } => {
                row.principal = principal.to_string();
                row.detail = Some(
                    match role {
                        volunteer_ledger::Role::Admin => "admin",
                        volunteer_ledger::Role::Minter => "minter",
                    }
                    .to_string(),
                );
            }
            Event::BadgeIssued {
                volunteer,
                credential_id,
                hours,
                issuing_ngo,
                activity_type,
            } => {
                row.principal = volunteer.to_string();
                row.counterparty = Some(issuing_ngo.to_string());
                row.credential_id = Some(*credential_id as i64);
                row.hours = Some(*hours as i64);
                row.detail = Some(activity_type.clone());
            }
            Event::BadgeBurned {
                credential_id,
                volunteer,
            } => {
                row.principal = volunteer.to_string();
                row.credential_id = Some(*credential_id as i64);
            }
        }
        row
    }
}

/// Fetch events, optionally filtered by kind identifier and/or an
/// involved principal, ordered by sequence number ascending.
pub async fn get_events(
    pool: &SqlitePool,
    kind: Option<&str>,
    principal: Option<&str>,
) -> Result<Vec<EventRow>> {
    let rows = sqlx::query_as::<_, EventRow>(
        r#"
        SELECT seq, event_type, principal, counterparty, credential_id, hours, detail,
               timestamp, recorded_at
        FROM   events
        WHERE  (?1 IS NULL OR event_type = ?1)
          AND  (?2 IS NULL OR principal = ?2 OR counterparty = ?2)
        ORDER  BY seq ASC
        "#,
    )
    .bind(kind)
    .bind(principal)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
