//! Database operations for the `ingest_runs` audit table.
//!
//! Runs move `pending` → `running` → one of `success`, `partial_failure`,
//! `failed`. Each transition is guarded with a `WHERE status = ...` clause so
//! a run can never be finalized twice or started out of order; a violated
//! guard surfaces as [`DbError::InvalidRunTransition`].

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `ingest_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IngestRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub sources: Vec<String>,
    pub search: Option<String>,
    /// The schema defines this as `INTEGER NOT NULL`.
    pub fetch_limit: i32,
    pub environment: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub fetched: i32,
    pub inserted_raw: i32,
    pub inserted_jobs: i32,
    pub updated_jobs: i32,
    pub inserted_skills: i32,
    pub warnings: Vec<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Aggregated counters written back when a run is finalized.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunCounters {
    pub fetched: i32,
    pub inserted_raw: i32,
    pub inserted_jobs: i32,
    pub updated_jobs: i32,
    pub inserted_skills: i32,
}

const RUN_COLUMNS: &str = "id, public_id, sources, search, fetch_limit, environment, status, \
                           started_at, finished_at, fetched, inserted_raw, inserted_jobs, \
                           updated_jobs, inserted_skills, warnings, error, created_at";

/// Creates a new ingest run in `pending` status.
///
/// Generates a UUID in Rust and binds it to `public_id`. Returns the full
/// newly-created row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_ingest_run(
    pool: &PgPool,
    sources: &[String],
    search: Option<&str>,
    fetch_limit: i32,
    environment: &str,
) -> Result<IngestRunRow, DbError> {
    let public_id = Uuid::new_v4();

    let row = sqlx::query_as::<_, IngestRunRow>(&format!(
        "INSERT INTO ingest_runs (public_id, sources, search, fetch_limit, environment, status) \
         VALUES ($1, $2, $3, $4, $5, 'pending') \
         RETURNING {RUN_COLUMNS}"
    ))
    .bind(public_id)
    .bind(sources)
    .bind(search)
    .bind(fetch_limit)
    .bind(environment)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `pending`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn start_ingest_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE ingest_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'pending'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "pending",
        });
    }

    Ok(())
}

/// Finalizes a run with its terminal status, counters, and warnings.
///
/// `status` must be `success`, `partial_failure`, or `failed`; the caller
/// decides which based on per-source outcomes. Sets `finished_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `running`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn finalize_ingest_run(
    pool: &PgPool,
    id: i64,
    status: &str,
    counters: RunCounters,
    warnings: &[String],
    error: Option<&str>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE ingest_runs \
         SET status = $1, finished_at = NOW(), \
             fetched = $2, inserted_raw = $3, inserted_jobs = $4, \
             updated_jobs = $5, inserted_skills = $6, \
             warnings = $7, error = $8 \
         WHERE id = $9 AND status = 'running'",
    )
    .bind(status)
    .bind(counters.fetched)
    .bind(counters.inserted_raw)
    .bind(counters.inserted_jobs)
    .bind(counters.updated_jobs)
    .bind(counters.inserted_skills)
    .bind(warnings)
    .bind(error)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a run as `failed` with an error message, from either `pending` or
/// `running` status.
///
/// Used by the orchestrator's best-effort cleanup when a storage error aborts
/// the run mid-flight.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run already reached a
/// terminal status, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_ingest_run(pool: &PgPool, id: i64, error: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE ingest_runs \
         SET status = 'failed', finished_at = NOW(), error = $1 \
         WHERE id = $2 AND status IN ('pending', 'running')",
    )
    .bind(error)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "pending or running",
        });
    }

    Ok(())
}

/// Fetches a single run by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_ingest_run(pool: &PgPool, id: i64) -> Result<IngestRunRow, DbError> {
    let row = sqlx::query_as::<_, IngestRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM ingest_runs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns the most recent `limit` runs for an environment, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_ingest_runs(
    pool: &PgPool,
    environment: &str,
    limit: i64,
) -> Result<Vec<IngestRunRow>, DbError> {
    let rows = sqlx::query_as::<_, IngestRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM ingest_runs \
         WHERE environment = $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2"
    ))
    .bind(environment)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
