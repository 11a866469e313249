//! `jobintel runs` and `jobintel top-skills` handlers.

use chrono::{Duration, Utc};
use jobintel_core::AppConfig;
use jobintel_db::{list_ingest_runs, skill_frequency};

/// Print the most recent ingest runs for the configured environment.
///
/// # Errors
///
/// Returns an error if the query fails.
pub(crate) async fn runs(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    limit: i64,
) -> anyhow::Result<()> {
    let runs = list_ingest_runs(pool, config.env.as_str(), limit).await?;

    if runs.is_empty() {
        println!("no ingest runs recorded for environment '{}'", config.env);
        return Ok(());
    }

    for run in runs {
        let finished = run
            .finished_at
            .map_or_else(|| "-".to_string(), |t| t.to_rfc3339());
        println!(
            "{}  {:16}  [{}]  fetched={} jobs={}+{} skills={} warnings={}  finished={}",
            run.public_id,
            run.status,
            run.sources.join(", "),
            run.fetched,
            run.inserted_jobs,
            run.updated_jobs,
            run.inserted_skills,
            run.warnings.len(),
            finished,
        );
    }

    Ok(())
}

/// Print the skill frequency report, optionally restricted to jobs posted in
/// the last `days` days.
///
/// # Errors
///
/// Returns an error if the query fails.
pub(crate) async fn top_skills(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    days: Option<i64>,
    limit: i64,
) -> anyhow::Result<()> {
    let posted_after = days.map(|d| (Utc::now() - Duration::days(d)).date_naive());

    let counts = skill_frequency(pool, config.env.as_str(), posted_after, limit).await?;

    if counts.is_empty() {
        println!("no skills linked yet; run `jobintel ingest` first");
        return Ok(());
    }

    let window = days.map_or_else(|| "all time".to_string(), |d| format!("last {d} days"));
    println!("top skills ({window}):");
    for entry in counts {
        println!("  {:24} {}", entry.skill, entry.job_count);
    }

    Ok(())
}
