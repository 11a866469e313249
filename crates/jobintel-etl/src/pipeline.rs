//! Run orchestrator: fetch from selected sources, persist, and keep the
//! `ingest_runs` audit trail honest.
//!
//! Source-level and payload-level failures degrade to run warnings; only
//! request-level problems (unknown source names) and storage failures abort
//! the run. A run record is never left dangling in `running` status: storage
//! errors trigger a best-effort transition to `failed` before propagating.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use jobintel_core::{Environment, SkillVocabulary};
use jobintel_db::{IngestRunRow, RunCounters};
use jobintel_sources::{JobSource, SourceRegistry};
use sqlx::PgPool;

use crate::error::EtlError;
use crate::{raw, skills, transform};

/// Which registered sources a run covers.
#[derive(Debug, Clone)]
pub enum SourceSelection {
    All,
    Named(Vec<String>),
}

/// Parameters for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub sources: SourceSelection,
    pub search: Option<String>,
    pub limit: usize,
    pub environment: Environment,
    pub max_concurrent_sources: usize,
}

/// Result of processing a single source within a run.
struct SourceOutcome {
    source: String,
    failed: bool,
    counters: RunCounters,
    warnings: Vec<String>,
}

impl SourceOutcome {
    fn failed(source: &str, warning: String) -> Self {
        Self {
            source: source.to_string(),
            failed: true,
            counters: RunCounters::default(),
            warnings: vec![warning],
        }
    }
}

/// Runs the full ingestion pipeline and returns the finalized run row.
///
/// Unknown source names fail the request before any run record exists.
/// Sources are processed concurrently (bounded by
/// `request.max_concurrent_sources`); their outcomes are merged serially
/// afterwards, so counter aggregation needs no locking.
///
/// # Errors
///
/// Returns [`EtlError::Registry`] if a requested source is not registered,
/// or [`EtlError::Db`] if storage fails. In the storage case the run record
/// is moved to `failed` on a best-effort basis first.
pub async fn run_pipeline(
    pool: &PgPool,
    registry: &SourceRegistry,
    vocabulary: &SkillVocabulary,
    request: &PipelineRequest,
) -> Result<IngestRunRow, EtlError> {
    let adapters = resolve_adapters(registry, &request.sources)?;
    let source_names: Vec<String> = adapters.iter().map(|a| a.name().to_string()).collect();
    let environment = request.environment.as_str();

    let run = jobintel_db::create_ingest_run(
        pool,
        &source_names,
        request.search.as_deref(),
        i32::try_from(request.limit).unwrap_or(i32::MAX),
        environment,
    )
    .await?;

    tracing::info!(
        run_id = run.id,
        public_id = %run.public_id,
        sources = ?source_names,
        "starting ingest run"
    );

    if let Err(e) = jobintel_db::start_ingest_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, &format!("{e}")).await;
        return Err(e.into());
    }

    let max_concurrent = request.max_concurrent_sources.max(1);
    let results: Vec<Result<SourceOutcome, EtlError>> = stream::iter(adapters)
        .map(|adapter| {
            process_source(
                pool,
                vocabulary,
                adapter,
                request.search.as_deref(),
                request.limit,
                environment,
            )
        })
        .buffer_unordered(max_concurrent)
        .collect()
        .await;

    let mut totals = RunCounters::default();
    let mut warnings: Vec<String> = Vec::new();
    let mut failed_sources: usize = 0;
    let source_count = source_names.len();

    for result in results {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                // Storage failure mid-run: close out the record and bail.
                fail_run_best_effort(pool, run.id, &format!("{e}")).await;
                return Err(e);
            }
        };

        if outcome.failed {
            tracing::warn!(source = %outcome.source, "source failed during ingest");
            failed_sources += 1;
        }
        totals.fetched = totals.fetched.saturating_add(outcome.counters.fetched);
        totals.inserted_raw = totals.inserted_raw.saturating_add(outcome.counters.inserted_raw);
        totals.inserted_jobs = totals.inserted_jobs.saturating_add(outcome.counters.inserted_jobs);
        totals.updated_jobs = totals.updated_jobs.saturating_add(outcome.counters.updated_jobs);
        totals.inserted_skills = totals
            .inserted_skills
            .saturating_add(outcome.counters.inserted_skills);
        warnings.extend(outcome.warnings);
    }

    let status = terminal_status(failed_sources, source_count);
    let error = (status == "failed").then(|| format!("all {source_count} sources failed"));

    if let Err(e) =
        jobintel_db::finalize_ingest_run(pool, run.id, status, totals, &warnings, error.as_deref())
            .await
    {
        fail_run_best_effort(pool, run.id, &format!("{e}")).await;
        return Err(e.into());
    }

    let finalized = jobintel_db::get_ingest_run(pool, run.id).await?;
    tracing::info!(
        run_id = finalized.id,
        status = %finalized.status,
        fetched = finalized.fetched,
        inserted_jobs = finalized.inserted_jobs,
        updated_jobs = finalized.updated_jobs,
        warnings = finalized.warnings.len(),
        "ingest run finished"
    );

    Ok(finalized)
}

/// Resolve the requested selection against the registry, before any run
/// record is created.
fn resolve_adapters(
    registry: &SourceRegistry,
    selection: &SourceSelection,
) -> Result<Vec<Arc<dyn JobSource>>, EtlError> {
    let names = match selection {
        SourceSelection::All => registry.names(),
        SourceSelection::Named(names) => names.clone(),
    };

    names
        .iter()
        .map(|name| registry.resolve(name).map_err(EtlError::from))
        .collect()
}

/// Fetch, validate, and persist everything from one source.
///
/// Fetch and per-payload problems are folded into the outcome as warnings;
/// `Err` is reserved for storage failures that must abort the run.
async fn process_source(
    pool: &PgPool,
    vocabulary: &SkillVocabulary,
    adapter: Arc<dyn JobSource>,
    search: Option<&str>,
    limit: usize,
    environment: &str,
) -> Result<SourceOutcome, EtlError> {
    let name = adapter.name();

    let payloads = match adapter.fetch(search, limit).await {
        Ok(payloads) => payloads,
        Err(e) => {
            return Ok(SourceOutcome::failed(
                name,
                format!("[{name}] fetch failed: {e}"),
            ));
        }
    };

    let fetched = i32::try_from(payloads.len()).unwrap_or(i32::MAX);
    let (valid, mut warnings) = jobintel_sources::validate_payloads(payloads, name);

    let mut counters = RunCounters {
        fetched,
        ..RunCounters::default()
    };

    for payload in valid {
        let (_, raw_was_new) = raw::ingest_raw(pool, &payload, environment).await?;
        if raw_was_new {
            counters.inserted_raw += 1;
        }

        let (job, mut transform_warnings) = match transform::normalize(&payload) {
            Ok(normalized) => normalized,
            Err(e) => {
                warnings.push(format!("[{name}] skipped payload: {e}"));
                continue;
            }
        };
        warnings.append(&mut transform_warnings);

        let (row, job_was_new) = jobintel_db::upsert_job(pool, name, &job, environment).await?;
        if job_was_new {
            counters.inserted_jobs += 1;
        } else {
            counters.updated_jobs += 1;
        }

        let linked = skills::extract_and_link_skills(pool, vocabulary, row.id, &job).await?;
        counters.inserted_skills = counters
            .inserted_skills
            .saturating_add(i32::try_from(linked).unwrap_or(i32::MAX));
    }

    tracing::debug!(
        source = name,
        fetched = counters.fetched,
        inserted_jobs = counters.inserted_jobs,
        "source processed"
    );

    Ok(SourceOutcome {
        source: name.to_string(),
        failed: false,
        counters,
        warnings,
    })
}

/// Terminal status from per-source outcomes: no failures is `success`, all
/// failures is `failed`, anything in between is `partial_failure`.
fn terminal_status(failed: usize, total: usize) -> &'static str {
    if failed == 0 {
        "success"
    } else if failed == total {
        "failed"
    } else {
        "partial_failure"
    }
}

/// Try to move the run record to `failed`; log instead of propagating if
/// even that fails.
async fn fail_run_best_effort(pool: &PgPool, run_id: i64, error: &str) {
    if let Err(e) = jobintel_db::fail_ingest_run(pool, run_id, error).await {
        tracing::error!(run_id, error = %e, "could not mark ingest run as failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_status_covers_all_outcomes() {
        assert_eq!(terminal_status(0, 3), "success");
        assert_eq!(terminal_status(1, 3), "partial_failure");
        assert_eq!(terminal_status(2, 3), "partial_failure");
        assert_eq!(terminal_status(3, 3), "failed");
        assert_eq!(terminal_status(0, 0), "success");
    }

    #[test]
    fn failed_outcome_carries_the_warning() {
        let outcome = SourceOutcome::failed("remoteok", "[remoteok] fetch failed: boom".to_string());
        assert!(outcome.failed);
        assert_eq!(outcome.warnings, vec!["[remoteok] fetch failed: boom"]);
        assert_eq!(outcome.counters.fetched, 0);
    }
}
