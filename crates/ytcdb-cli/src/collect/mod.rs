//! The `collect` subcommand: one sequential pass over the tracked channels.

mod pipeline;
mod progress;
mod runner;

use ytcdb_core::{load_channels, AppConfig};
use ytcdb_store::DirStore;

#[derive(Debug, clap::Args)]
pub struct CollectArgs {
    /// Channel ids to collect instead of the configured roster; repeatable.
    #[arg(long = "channel", value_name = "CHANNEL_ID")]
    pub channels: Vec<String>,

    /// Start from the beginning instead of resuming the last checkpoint.
    #[arg(long)]
    pub fresh: bool,
}

pub async fn run(config: &AppConfig, args: CollectArgs) -> anyhow::Result<()> {
    let targets: Vec<String> = if args.channels.is_empty() {
        load_channels(&config.channels_path)?
            .channels
            .into_iter()
            .map(|c| c.id)
            .collect()
    } else {
        args.channels
    };

    if targets.is_empty() {
        anyhow::bail!(
            "no channels to collect; pass --channel or populate {}",
            config.channels_path.display()
        );
    }

    let client = crate::build_client(config)?;
    let store = DirStore::open(&config.data_dir).await?;

    runner::run_batch(config, &client, &store, &targets, args.fresh).await
}
