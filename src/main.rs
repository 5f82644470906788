use std::path::PathBuf;
use std::process::ExitCode;

use database::MetadataBackfill;
use lemmy_client::LemmyClient;
use migrator::Migrator;
use reddit_client::RedditClient;
use redferry_core::{MigrationError, RunConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    "redferry=info,migrator=info,reddit_client=info,lemmy_client=info,database=info",
                )
            }),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), MigrationError> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = RunConfig::load(&PathBuf::from(&config_path))?;
    info!("Loaded configuration from {config_path}");

    let source = RedditClient::login(&config.source).await?;
    let destination = LemmyClient::login(&config.destination).await?;

    // Connection problems surface here, before any write happens; past
    // this point storage failures are per-row and non-fatal.
    let backfill = match &config.destination.database_url {
        Some(url) if !config.dry_run => Some(MetadataBackfill::connect(url).await?),
        _ => {
            info!("Timestamp backfill disabled");
            None
        }
    };

    let report = Migrator::new(&config, &source, &destination, backfill.as_ref())
        .run()
        .await;
    report.log_summary();
    // per-subreddit skips stay exit 0; only an aborted run is a failure
    match report.fatal {
        Some(reason) => Err(reason),
        None => Ok(()),
    }
}
