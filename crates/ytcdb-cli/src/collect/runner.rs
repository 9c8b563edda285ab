//! Sequential batch loop over the target channels.
//!
//! Channels are processed strictly one at a time — never concurrently — to
//! respect the upstream quota, with a fixed delay between channels.
//! Cancellation is cooperative: Ctrl-C flips a shared flag that is checked
//! at the loop boundary, so no in-flight request is ever aborted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use tracing::{error, info, warn};

use ytcdb_core::AppConfig;
use ytcdb_store::DirStore;
use ytcdb_youtube::YoutubeClient;

use super::pipeline::{self, BatchStop, ChannelOutcome};
use super::progress::{self, CollectProgress};

pub(crate) async fn run_batch(
    config: &AppConfig,
    client: &YoutubeClient,
    store: &DirStore,
    targets: &[String],
    fresh: bool,
) -> anyhow::Result<()> {
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received — stopping after the current channel");
                cancel.store(true, Ordering::SeqCst);
            }
        });
    }

    let mut progress = if fresh {
        CollectProgress::default()
    } else {
        progress::load(store.root()).await
    };
    // Resume only when the checkpoint matches this target list; a changed
    // roster restarts from the top.
    let start = if progress.total == targets.len() && progress.complete < targets.len() {
        progress.complete
    } else {
        0
    };
    progress.total = targets.len();
    if start > 0 {
        info!(start, total = targets.len(), "resuming from checkpoint");
    }

    let mut persisted = 0usize;
    let mut skipped = 0usize;

    for (index, channel_id) in targets.iter().enumerate().skip(start) {
        if cancel.load(Ordering::SeqCst) {
            info!(
                complete = progress.complete,
                total = progress.total,
                "batch stopped by interrupt"
            );
            break;
        }

        info!(
            channel_id = channel_id.as_str(),
            position = index + 1,
            total = targets.len(),
            "processing channel"
        );

        match pipeline::process_channel(client, store, channel_id, Utc::now()).await {
            Ok(ChannelOutcome::Persisted { title }) => {
                persisted += 1;
                info!(channel_id = channel_id.as_str(), title = title.as_str(), "channel persisted");
            }
            Ok(ChannelOutcome::Skipped { reason }) => {
                skipped += 1;
                warn!(channel_id = channel_id.as_str(), %reason, "channel skipped");
            }
            Err(BatchStop::Quota(message)) => {
                checkpoint(store, &mut progress, index).await;
                error!(
                    channel_id = channel_id.as_str(),
                    complete = index,
                    "API quota exhausted — checkpointed and stopping the batch"
                );
                anyhow::bail!("YouTube API quota exhausted: {message}");
            }
            Err(BatchStop::Persistence(e)) => {
                checkpoint(store, &mut progress, index).await;
                error!(
                    channel_id = channel_id.as_str(),
                    error = %e,
                    "persistence failure — stopping the batch to avoid silent data loss"
                );
                return Err(anyhow::Error::new(e).context("persistence failure"));
            }
        }

        checkpoint(store, &mut progress, index + 1).await;

        // Pace quota consumption between channels.
        if index + 1 < targets.len() && !cancel.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(config.inter_channel_delay_ms)).await;
        }
    }

    info!(persisted, skipped, total = targets.len(), "collection finished");
    Ok(())
}

async fn checkpoint(store: &DirStore, progress: &mut CollectProgress, complete: usize) {
    progress.complete = complete;
    progress.last_updated = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
    progress::save(store.root(), progress).await;
}
