//! `jobintel ingest` handler.

use jobintel_core::{AppConfig, SkillVocabulary};
use jobintel_etl::{run_pipeline, PipelineRequest, SourceSelection};
use jobintel_sources::SourceRegistry;

/// Run the ingestion pipeline over the selected sources and print a summary.
///
/// An empty `sources` list means all registered sources.
///
/// # Errors
///
/// Returns an error if the registry cannot be built, a named source is
/// unknown, or storage fails mid-run.
pub(crate) async fn run(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    sources: Vec<String>,
    search: Option<String>,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let registry = SourceRegistry::with_default_sources(config)
        .map_err(|e| anyhow::anyhow!("failed to build source registry: {e}"))?;

    let vocabulary = SkillVocabulary::load_or_builtin(&config.skills_path)?;
    tracing::debug!(skills = vocabulary.len(), "skill vocabulary loaded");

    let selection = if sources.is_empty() {
        SourceSelection::All
    } else {
        SourceSelection::Named(sources)
    };

    let request = PipelineRequest {
        sources: selection,
        search,
        limit: limit.unwrap_or(config.default_fetch_limit),
        environment: config.env,
        max_concurrent_sources: config.max_concurrent_sources,
    };

    let run = run_pipeline(pool, &registry, &vocabulary, &request).await?;

    println!("run {} finished: {}", run.public_id, run.status);
    println!("  sources:         [{}]", run.sources.join(", "));
    println!("  fetched:         {}", run.fetched);
    println!("  inserted (raw):  {}", run.inserted_raw);
    println!("  inserted (jobs): {}", run.inserted_jobs);
    println!("  updated (jobs):  {}", run.updated_jobs);
    println!("  skills linked:   {}", run.inserted_skills);
    if let Some(error) = &run.error {
        println!("  error:           {error}");
    }
    if !run.warnings.is_empty() {
        println!("  warnings ({}):", run.warnings.len());
        for warning in &run.warnings {
            println!("    - {warning}");
        }
    }

    Ok(())
}
