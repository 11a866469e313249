//! Database operations for the deduplicated `jobs` table.

use chrono::{DateTime, NaiveDate, Utc};
use jobintel_core::NormalizedJob;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `jobs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JobRow {
    pub id: i64,
    pub source: String,
    pub title: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub url: String,
    pub posted_at: Option<NaiveDate>,
    pub description: Option<String>,
    pub dedup_hash: String,
    pub environment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const JOB_COLUMNS: &str = "id, source, title, company, location, url, posted_at, \
                           description, dedup_hash, environment, created_at, updated_at";

/// Upserts a normalized job, deduplicating by URL with the dedup hash as a
/// secondary safety net.
///
/// Insert-first with `ON CONFLICT DO NOTHING RETURNING`; when nothing comes
/// back, the mutable fields of the existing URL row — `dedup_hash` included,
/// so the stored hash always matches the row's identity fields — are updated
/// in place. If no row matches the URL, or updating the hash would collide
/// with another row's, the posting already exists under a different URL; the
/// hash row is returned untouched rather than treated as an error.
///
/// Returns the row plus `true` if this call created it, `false` if an
/// existing row was updated or matched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails, or [`DbError::NotFound`]
/// if neither the URL nor the hash resolves to a row after a conflict
/// (concurrent delete).
pub async fn upsert_job(
    pool: &PgPool,
    source: &str,
    job: &NormalizedJob,
    environment: &str,
) -> Result<(JobRow, bool), DbError> {
    let inserted = sqlx::query_as::<_, JobRow>(&format!(
        "INSERT INTO jobs \
             (source, title, company, location, url, posted_at, description, \
              dedup_hash, environment) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT DO NOTHING \
         RETURNING {JOB_COLUMNS}"
    ))
    .bind(source)
    .bind(&job.title)
    .bind(&job.company)
    .bind(&job.location)
    .bind(&job.url)
    .bind(job.posted_at)
    .bind(&job.description)
    .bind(&job.dedup_hash)
    .bind(environment)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = inserted {
        return Ok((row, true));
    }

    let update_result = sqlx::query_as::<_, JobRow>(&format!(
        "UPDATE jobs \
         SET source = $1, title = $2, company = $3, location = $4, \
             posted_at = $5, description = $6, dedup_hash = $7, updated_at = NOW() \
         WHERE url = $8 \
         RETURNING {JOB_COLUMNS}"
    ))
    .bind(source)
    .bind(&job.title)
    .bind(&job.company)
    .bind(&job.location)
    .bind(job.posted_at)
    .bind(&job.description)
    .bind(&job.dedup_hash)
    .bind(&job.url)
    .fetch_optional(pool)
    .await;

    let updated = match update_result {
        Ok(row) => row,
        // Another row already owns this hash: same posting under a
        // different URL. Fall through to the hash lookup.
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => None,
        Err(e) => return Err(e.into()),
    };

    if let Some(row) = updated {
        return Ok((row, false));
    }

    // Conflict was on dedup_hash, not url: same posting under a new URL.
    let existing = sqlx::query_as::<_, JobRow>(&format!(
        "SELECT {JOB_COLUMNS} FROM jobs WHERE dedup_hash = $1"
    ))
    .bind(&job.dedup_hash)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok((existing, false))
}
