//! Database operations for the `job_skills` link table.

use sqlx::PgPool;

use crate::DbError;

/// Links a job to a set of canonical skill labels.
///
/// Idempotent: already-linked skills are skipped via `ON CONFLICT DO
/// NOTHING`. Returns the number of links actually created.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if an insert fails.
pub async fn link_skills<I, S>(pool: &PgPool, job_id: i64, skills: I) -> Result<u64, DbError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut inserted = 0;
    for skill in skills {
        let result = sqlx::query(
            "INSERT INTO job_skills (job_id, skill) VALUES ($1, $2) \
             ON CONFLICT (job_id, skill) DO NOTHING",
        )
        .bind(job_id)
        .bind(skill.as_ref())
        .execute(pool)
        .await?;
        inserted += result.rows_affected();
    }

    Ok(inserted)
}

/// Returns the skill labels linked to a job, sorted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_job_skills(pool: &PgPool, job_id: i64) -> Result<Vec<String>, DbError> {
    let skills = sqlx::query_scalar::<_, String>(
        "SELECT skill FROM job_skills WHERE job_id = $1 ORDER BY skill",
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?;

    Ok(skills)
}
