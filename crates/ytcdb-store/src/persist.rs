//! Read-modify-write of one channel's document plus the best-effort index
//! update that follows every successful write.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{info, warn};

use ytcdb_core::snapshot::{RawSnapshot, RecentThumbnail, StaticData};
use ytcdb_metrics::DerivedMetrics;

use crate::document::{
    ChannelDocument, DailyViewsEntry, DocumentMetadata, DocumentStatic, StoredSnapshot,
    SubscriberHistoryEntry, WeeklyViewsEntry,
};
use crate::error::StoreError;
use crate::index::{ChannelIndex, IndexEntry};
use crate::store::DocumentStore;

/// Everything one collection cycle produced for a channel, ready to merge
/// into its persisted document.
#[derive(Debug)]
pub struct ChannelUpsert {
    pub channel_id: String,
    pub static_data: StaticData,
    pub raw: RawSnapshot,
    pub metrics: DerivedMetrics,
    pub subscriber_history: Vec<SubscriberHistoryEntry>,
    pub daily_views_history: Vec<DailyViewsEntry>,
    pub weekly_views_history: Vec<WeeklyViewsEntry>,
    /// `None` when the thumbnail fetch failed this cycle; the previously
    /// stored window is then kept instead of dropped.
    pub recent_thumbnails: Option<Vec<RecentThumbnail>>,
}

/// Merge one cycle's results into the channel's document and write it.
///
/// The stored snapshot list is always replaced with exactly the new
/// snapshot; `firstCollected` survives from the existing document and
/// `totalCollections` increments. After a successful write the channel
/// index is updated best-effort: an index failure is logged and does not
/// roll back the channel write.
///
/// A prior document that cannot be loaded is treated as absent (the same
/// stance the history mergers take); only the write itself is fatal.
///
/// # Errors
///
/// Returns [`StoreError`] when the document cannot be serialized or written.
pub async fn upsert_channel<S: DocumentStore>(
    store: &S,
    upsert: ChannelUpsert,
    now: DateTime<Utc>,
) -> Result<ChannelDocument, StoreError> {
    let now_str = now.to_rfc3339_opts(SecondsFormat::Millis, true);

    let existing = match store.load(&upsert.channel_id).await {
        Ok(doc) => doc,
        Err(e) => {
            warn!(
                channel_id = %upsert.channel_id,
                error = %e,
                "existing document unreadable; writing a fresh one"
            );
            None
        }
    };

    let snapshot = StoredSnapshot::assemble(
        now_str.clone(),
        &upsert.static_data,
        &upsert.raw,
        upsert.metrics,
    );

    let published_at = upsert
        .static_data
        .published_at
        .clone()
        .or_else(|| existing.as_ref().and_then(|d| d.static_data.published_at.clone()));

    let previous_metadata = existing.as_ref().and_then(|d| d.metadata.as_ref());
    let first_collected = previous_metadata
        .map_or_else(|| now_str.clone(), |m| m.first_collected.clone());
    let total_collections = previous_metadata.map_or(0, |m| m.total_collections) + 1;
    let is_new_channel = existing.is_none();

    let recent_thumbnails_history = match upsert.recent_thumbnails {
        Some(thumbnails) => thumbnails,
        None => existing
            .as_ref()
            .map(|d| d.recent_thumbnails_history.clone())
            .unwrap_or_default(),
    };

    let doc = ChannelDocument {
        channel_id: upsert.channel_id,
        static_data: DocumentStatic { published_at },
        snapshots: vec![snapshot],
        subscriber_history: upsert.subscriber_history,
        daily_views_history: upsert.daily_views_history,
        weekly_views_history: upsert.weekly_views_history,
        recent_thumbnails_history,
        metadata: Some(DocumentMetadata {
            first_collected,
            last_updated: now_str.clone(),
            total_collections,
        }),
    };

    store.save(&doc).await?;
    info!(channel_id = %doc.channel_id, total_collections, "channel document written");

    update_index_best_effort(store, &doc, is_new_channel, &now_str).await;

    Ok(doc)
}

async fn update_index_best_effort<S: DocumentStore>(
    store: &S,
    doc: &ChannelDocument,
    is_new_channel: bool,
    now_str: &str,
) {
    let result = async {
        let mut index = store
            .load_index()
            .await?
            .unwrap_or_else(|| ChannelIndex::new(now_str));
        let title = doc.snapshots.first().and_then(|s| s.channel.title.clone());
        index.upsert(
            IndexEntry {
                channel_id: doc.channel_id.clone(),
                title: title.unwrap_or_else(|| "Unknown".to_string()),
                first_collected: is_new_channel.then(|| now_str.to_string()),
                last_updated: now_str.to_string(),
                total_snapshots: doc
                    .metadata
                    .as_ref()
                    .map_or(1, |m| m.total_collections),
            },
            now_str,
        );
        store.save_index(&index).await
    }
    .await;

    if let Err(e) = result {
        warn!(
            channel_id = %doc.channel_id,
            error = %e,
            "channel index update failed (channel write succeeded)"
        );
    }
}
