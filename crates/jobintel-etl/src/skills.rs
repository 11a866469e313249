//! Skill extraction stage: dictionary matching over normalized job text.

use std::collections::BTreeSet;

use jobintel_core::{NormalizedJob, SkillVocabulary};
use sqlx::PgPool;

use crate::error::EtlError;

/// Extracts canonical skill labels from a job's title and description.
#[must_use]
pub fn extract_skills(vocabulary: &SkillVocabulary, job: &NormalizedJob) -> BTreeSet<String> {
    let text = match job.description.as_deref() {
        Some(description) => format!("{} {description}", job.title),
        None => job.title.clone(),
    };
    vocabulary.extract(&text)
}

/// Extracts skills from a job and links them in the database.
///
/// Returns the number of links actually created (idempotent re-runs return
/// zero).
///
/// # Errors
///
/// Returns [`EtlError::Db`] if the link insert fails.
pub async fn extract_and_link_skills(
    pool: &PgPool,
    vocabulary: &SkillVocabulary,
    job_id: i64,
    job: &NormalizedJob,
) -> Result<u64, EtlError> {
    let skills = extract_skills(vocabulary, job);
    if skills.is_empty() {
        return Ok(0);
    }
    let inserted = jobintel_db::link_skills(pool, job_id, &skills).await?;
    Ok(inserted)
}
