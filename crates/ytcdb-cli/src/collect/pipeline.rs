//! Per-channel processing: fetch, derive, correct, validate, persist.
//!
//! Error taxonomy: channel-scoped problems (API errors, crawl artifacts,
//! validation failures) skip the channel and let the batch continue; quota
//! exhaustion and persistence failures stop the whole batch.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use ytcdb_core::registry::{DerivedField, FieldSet};
use ytcdb_metrics::{compute, correct, validate, MetricsError, MissingFields};
use ytcdb_store::history;
use ytcdb_store::{upsert_channel, ChannelUpsert, DocumentStore, StoreError};
use ytcdb_youtube::{ChannelParts, YoutubeClient, YoutubeError};

/// How one channel's cycle ended, batch-continuing cases only.
pub(crate) enum ChannelOutcome {
    Persisted { title: String },
    Skipped { reason: SkipReason },
}

pub(crate) enum SkipReason {
    /// Fetch failed (not found, API error, network exhausted retries).
    Api(YoutubeError),
    /// Zero views and zero videos: a failed upstream crawl, not real data.
    CrawlArtifact,
    /// The 25-field completeness gate failed.
    Validation(MissingFields),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Api(e) => write!(f, "{e}"),
            SkipReason::CrawlArtifact => write!(f, "crawl artifact (zero views and videos)"),
            SkipReason::Validation(missing) => write!(f, "{missing}"),
        }
    }
}

/// Conditions that end the whole batch, not just one channel.
#[derive(Debug)]
pub(crate) enum BatchStop {
    /// Daily API quota exhausted; continuing would only burn requests.
    Quota(String),
    /// The store is unwritable; continuing risks silent data loss.
    Persistence(StoreError),
}

pub(crate) async fn process_channel<S: DocumentStore>(
    client: &YoutubeClient,
    store: &S,
    channel_id: &str,
    now: DateTime<Utc>,
) -> Result<ChannelOutcome, BatchStop> {
    let today = now.date_naive();
    let requested: BTreeSet<DerivedField> = DerivedField::ALL.into_iter().collect();
    let mut fields = FieldSet::collection_default();
    fields.ensure_derived_inputs(&requested);
    fields.ensure_history_inputs();

    // 1. Static fields + statistics snapshot.
    let parts = match client.fetch_channel(channel_id, &fields).await {
        Ok(parts) => parts,
        Err(YoutubeError::QuotaExceeded(message)) => return Err(BatchStop::Quota(message)),
        Err(e) => return Ok(ChannelOutcome::Skipped {
            reason: SkipReason::Api(e),
        }),
    };
    let ChannelParts {
        mut static_data,
        snapshot: raw,
    } = parts;

    // 2. Shorts aggregate; a failed scan just leaves the shorts metrics out.
    let shorts = match static_data.uploads_playlist_id.as_deref() {
        Some(playlist_id) => match client.fetch_shorts_aggregate(playlist_id).await {
            Ok(aggregate) => {
                info!(channel_id, shorts = aggregate.shorts_count, "shorts scan complete");
                Some(aggregate)
            }
            Err(YoutubeError::QuotaExceeded(message)) => return Err(BatchStop::Quota(message)),
            Err(e) => {
                warn!(channel_id, error = %e, "shorts scan failed; shorts metrics will be missing");
                None
            }
        },
        None => None,
    };

    // 3. Recent thumbnails; a failure keeps the previously stored window.
    let recent_thumbnails = match static_data.uploads_playlist_id.as_deref() {
        Some(playlist_id) => match client.fetch_recent_thumbnails(playlist_id).await {
            Ok(thumbnails) => Some(thumbnails),
            Err(YoutubeError::QuotaExceeded(message)) => return Err(BatchStop::Quota(message)),
            Err(e) => {
                warn!(channel_id, error = %e, "thumbnail fetch failed");
                None
            }
        },
        None => None,
    };

    // 4. Rolling-window histories, each reading prior persisted state.
    let current_views = raw.view_count_u64().unwrap_or(0);
    let current_subscribers = raw
        .subscriber_count
        .clone()
        .unwrap_or_else(|| "0".to_string());
    let daily_views_history =
        history::daily_views_history(store, channel_id, today, current_views).await;
    let weekly_views_history =
        history::weekly_views_history(store, channel_id, today, current_views).await;
    let subscriber_history =
        history::subscriber_history(store, channel_id, today, &current_subscribers).await;

    // 5. Derived metrics.
    let published_at = static_data
        .published_at
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));
    let mut metrics = match compute(&raw, published_at, shorts, &requested, now) {
        Ok(metrics) => metrics,
        Err(MetricsError::CrawlArtifact) => {
            return Ok(ChannelOutcome::Skipped {
                reason: SkipReason::CrawlArtifact,
            })
        }
    };

    // 6. Consistency correction, then the completeness gate.
    if correct(&mut metrics, current_views) {
        info!(channel_id, "consistency correction applied");
    }
    if let Err(missing) = validate(&mut static_data, &raw, &metrics) {
        warn!(
            channel_id,
            static_missing = missing.static_fields.len(),
            snapshot_missing = missing.snapshot_fields.len(),
            derived_missing = missing.derived_fields.len(),
            "required fields missing — aborting persistence for this channel"
        );
        return Ok(ChannelOutcome::Skipped {
            reason: SkipReason::Validation(missing),
        });
    }

    // 7. Persist + best-effort index update.
    let title = static_data
        .title
        .clone()
        .unwrap_or_else(|| channel_id.to_string());
    upsert_channel(
        store,
        ChannelUpsert {
            channel_id: channel_id.to_string(),
            static_data,
            raw,
            metrics,
            subscriber_history,
            daily_views_history,
            weekly_views_history,
            recent_thumbnails,
        },
        now,
    )
    .await
    .map_err(BatchStop::Persistence)?;

    Ok(ChannelOutcome::Persisted { title })
}
