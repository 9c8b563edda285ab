use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ytcdb_core::AppConfig;
use ytcdb_youtube::YoutubeClient;

mod collect;
mod discover;

#[derive(Debug, Parser)]
#[command(name = "ytcdb")]
#[command(about = "YouTube channel statistics collector")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect statistics for the tracked channels and persist them.
    Collect(collect::CollectArgs),
    /// Search for new channels matching criteria.
    Discover(discover::DiscoverArgs),
    /// Resolve an @handle to its canonical channel id.
    Resolve {
        /// Channel handle, with or without the leading `@`.
        handle: String,
    },
}

fn build_client(config: &AppConfig) -> anyhow::Result<YoutubeClient> {
    let client = YoutubeClient::new(
        &config.youtube_api_key,
        config.request_timeout_secs,
        config.max_retries,
        config.retry_backoff_base_ms,
    )?
    .with_shorts_scan_limit(config.shorts_scan_limit);
    Ok(client)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ytcdb_core::load_app_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Collect(args) => collect::run(&config, args).await,
        Commands::Discover(args) => discover::run(&config, args).await,
        Commands::Resolve { handle } => {
            let client = build_client(&config)?;
            let channel_id = client.resolve_handle(&handle).await?;
            println!("{channel_id}");
            Ok(())
        }
    }
}
