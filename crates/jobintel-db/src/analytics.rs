//! Read-only analytics queries over the deduplicated job store.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::DbError;

/// Filter for [`list_recent_jobs`]. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct JobSearchFilter {
    pub skill: Option<String>,
    pub source: Option<String>,
    pub posted_after: Option<NaiveDate>,
}

/// A job row as returned by analytics queries, with its linked skills
/// aggregated into one array.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JobSummaryRow {
    pub id: i64,
    pub source: String,
    pub title: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub url: String,
    pub posted_at: Option<NaiveDate>,
    pub skills: Vec<String>,
}

/// One entry in a skill frequency report.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SkillCountRow {
    pub skill: String,
    pub job_count: i64,
}

/// Returns jobs matching the filter, newest first.
///
/// The skill filter matches via the `job_skills` link table; the returned
/// `skills` array always contains all of a job's linked skills regardless of
/// which one matched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_jobs(
    pool: &PgPool,
    environment: &str,
    filter: &JobSearchFilter,
    limit: i64,
) -> Result<Vec<JobSummaryRow>, DbError> {
    let rows = sqlx::query_as::<_, JobSummaryRow>(
        "SELECT j.id, j.source, j.title, j.company, j.location, j.url, j.posted_at, \
                COALESCE(ARRAY( \
                    SELECT js.skill FROM job_skills js \
                    WHERE js.job_id = j.id ORDER BY js.skill \
                ), '{}') AS skills \
         FROM jobs j \
         WHERE j.environment = $1 \
           AND ($2::text IS NULL OR EXISTS ( \
                   SELECT 1 FROM job_skills js \
                   WHERE js.job_id = j.id AND js.skill = $2)) \
           AND ($3::text IS NULL OR j.source = $3) \
           AND ($4::date IS NULL OR j.posted_at >= $4) \
         ORDER BY j.posted_at DESC NULLS LAST, j.id DESC \
         LIMIT $5",
    )
    .bind(environment)
    .bind(&filter.skill)
    .bind(&filter.source)
    .bind(filter.posted_after)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the most frequent skills across jobs posted on or after
/// `posted_after` (all time when `None`), descending by count.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn skill_frequency(
    pool: &PgPool,
    environment: &str,
    posted_after: Option<NaiveDate>,
    limit: i64,
) -> Result<Vec<SkillCountRow>, DbError> {
    let rows = sqlx::query_as::<_, SkillCountRow>(
        "SELECT js.skill, COUNT(*) AS job_count \
         FROM job_skills js \
         JOIN jobs j ON j.id = js.job_id \
         WHERE j.environment = $1 \
           AND ($2::date IS NULL OR j.posted_at >= $2) \
         GROUP BY js.skill \
         ORDER BY job_count DESC, js.skill ASC \
         LIMIT $3",
    )
    .bind(environment)
    .bind(posted_after)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
