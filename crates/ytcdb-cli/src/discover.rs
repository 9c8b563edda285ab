//! The `discover` subcommand: find channels worth tracking.

use tracing::{info, warn};

use ytcdb_core::AppConfig;
use ytcdb_store::{DirStore, DocumentStore};
use ytcdb_youtube::DiscoverSort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortArg {
    /// Highest total view count first.
    Views,
    /// Fewest uploaded videos first.
    FewestVideos,
}

impl From<SortArg> for DiscoverSort {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Views => DiscoverSort::ViewCount,
            SortArg::FewestVideos => DiscoverSort::VideoCountAsc,
        }
    }
}

impl std::fmt::Display for SortArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortArg::Views => write!(f, "views"),
            SortArg::FewestVideos => write!(f, "fewest-videos"),
        }
    }
}

#[derive(Debug, clap::Args)]
pub struct DiscoverArgs {
    /// Search keyword.
    #[arg(long, default_value = "popular")]
    pub keyword: String,

    /// Keep only channels with at most this many subscribers.
    #[arg(long, default_value_t = 1_000_000)]
    pub subscriber_cap: u64,

    /// Ordering applied after the subscriber filter.
    #[arg(long, value_enum, default_value_t = SortArg::Views)]
    pub sort: SortArg,

    /// Maximum number of channel ids to print.
    #[arg(long, default_value_t = 25)]
    pub max_results: usize,

    /// YouTube video category id filter.
    #[arg(long)]
    pub category: Option<String>,

    /// Also suggest channels this store already tracks.
    #[arg(long)]
    pub include_known: bool,
}

pub async fn run(config: &AppConfig, args: DiscoverArgs) -> anyhow::Result<()> {
    let client = crate::build_client(config)?;

    // Already-tracked channels are excluded via the store's index unless
    // asked otherwise; a missing or broken index just means no exclusions.
    let exclude: Vec<String> = if args.include_known {
        Vec::new()
    } else {
        let store = DirStore::open(&config.data_dir).await?;
        match store.load_index().await {
            Ok(Some(index)) => index.channel_ids(),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "channel index unreadable; not excluding known channels");
                Vec::new()
            }
        }
    };

    let ids = client
        .discover_channels(
            &args.keyword,
            args.subscriber_cap,
            args.sort.into(),
            args.max_results,
            args.category.as_deref(),
            &exclude,
        )
        .await?;

    if ids.is_empty() {
        info!(keyword = args.keyword.as_str(), "no matching channels found");
        return Ok(());
    }

    info!(found = ids.len(), "discovery complete");
    for id in ids {
        println!("{id}");
    }
    Ok(())
}
