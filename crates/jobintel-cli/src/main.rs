use clap::{Parser, Subcommand};
use jobintel_core::load_app_config;
use jobintel_db::{connect_pool, PoolConfig};

mod ingest;
mod report;

#[derive(Debug, Parser)]
#[command(name = "jobintel")]
#[command(about = "Job posting aggregation and skill analytics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch, normalize, and store postings from the configured sources.
    Ingest {
        /// Source to ingest from; repeat for several. Defaults to all.
        #[arg(long = "source")]
        sources: Vec<String>,
        /// Search term passed to (or applied by) each source.
        #[arg(long)]
        search: Option<String>,
        /// Maximum postings to fetch per source.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show recent ingest run history.
    Runs {
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
    /// Show the most frequently mentioned skills.
    TopSkills {
        /// Only count jobs posted within the last N days.
        #[arg(long)]
        days: Option<i64>,
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse first: --help and usage errors must not require a configured
    // environment or a reachable database.
    let cli = Cli::parse();

    let config = load_app_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    let pool = connect_pool(&config.database_url, PoolConfig::from_app_config(&config)).await?;
    jobintel_db::health_check(&pool).await?;

    match cli.command {
        Commands::Ingest {
            sources,
            search,
            limit,
        } => ingest::run(&pool, &config, sources, search, limit).await,
        Commands::Runs { limit } => report::runs(&pool, &config, limit).await,
        Commands::TopSkills { days, limit } => {
            report::top_skills(&pool, &config, days, limit).await
        }
    }
}
