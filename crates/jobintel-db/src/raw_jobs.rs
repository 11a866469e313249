//! Database operations for the immutable `raw_jobs` ingestion log.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `raw_jobs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RawJobRow {
    pub id: i64,
    pub source: String,
    pub content_hash: String,
    pub payload: serde_json::Value,
    pub environment: String,
    pub ingested_at: DateTime<Utc>,
}

/// Inserts a raw payload keyed on its content hash, or returns the existing
/// row when an identical payload was already ingested.
///
/// Uses `ON CONFLICT (content_hash) DO NOTHING RETURNING` so the insert and
/// the duplicate check are one statement; on conflict the existing row is
/// re-read. Safe under concurrent ingestion of identical payloads.
///
/// Returns the row plus `true` if this call inserted it, `false` if it
/// already existed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert or the re-read fails, or
/// [`DbError::NotFound`] if the conflicting row vanished between the two
/// statements (concurrent delete).
pub async fn insert_raw_job_if_new(
    pool: &PgPool,
    source: &str,
    payload: &serde_json::Value,
    content_hash: &str,
    environment: &str,
) -> Result<(RawJobRow, bool), DbError> {
    let inserted = sqlx::query_as::<_, RawJobRow>(
        "INSERT INTO raw_jobs (source, content_hash, payload, environment) \
         VALUES ($1, $2, $3::jsonb, $4) \
         ON CONFLICT (content_hash) DO NOTHING \
         RETURNING id, source, content_hash, payload, environment, ingested_at",
    )
    .bind(source)
    .bind(content_hash)
    .bind(payload)
    .bind(environment)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = inserted {
        return Ok((row, true));
    }

    let existing = sqlx::query_as::<_, RawJobRow>(
        "SELECT id, source, content_hash, payload, environment, ingested_at \
         FROM raw_jobs \
         WHERE content_hash = $1",
    )
    .bind(content_hash)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok((existing, false))
}
