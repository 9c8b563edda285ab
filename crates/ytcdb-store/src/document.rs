//! The persisted channel document.
//!
//! The serialized shape of [`ChannelDocument`] is a contract: the read-side
//! tooling consumes these files as-is, so keys are camelCase and counters
//! stay the decimal strings the upstream API uses.

use serde::{Deserialize, Serialize};

use ytcdb_core::snapshot::{RawSnapshot, RecentThumbnail, StaticData};
use ytcdb_metrics::DerivedMetrics;

/// One channel's persisted state, stored as `<channelId>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDocument {
    pub channel_id: String,
    #[serde(default)]
    pub static_data: DocumentStatic,
    /// Always length 1: the latest snapshot replaces its predecessor.
    #[serde(default)]
    pub snapshots: Vec<StoredSnapshot>,
    /// Monthly subscriber counts, newest first, capped at 5.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subscriber_history: Vec<SubscriberHistoryEntry>,
    /// Daily view totals, newest first, capped at 7.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub daily_views_history: Vec<DailyViewsEntry>,
    /// Weekly view totals, newest first, capped at 4.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weekly_views_history: Vec<WeeklyViewsEntry>,
    /// The 7 most recently published videos' thumbnails, newest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recent_thumbnails_history: Vec<RecentThumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentMetadata>,
}

/// The only channel field that can never change once set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

/// The stored point-in-time capture: channel identity fields folded in next
/// to the counters and the derived metrics under their short keys.
///
/// `subscriberCount` is deliberately absent — it lives in
/// `subscriberHistory` instead of the snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSnapshot {
    /// Capture timestamp, ISO-8601.
    pub ts: String,
    #[serde(flatten)]
    pub channel: StaticData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_subscriber_count: Option<bool>,
    #[serde(flatten)]
    pub metrics: DerivedMetrics,
}

impl StoredSnapshot {
    /// Assemble the stored snapshot for one collection cycle.
    ///
    /// `publishedAt` moves to the document's `staticData`, and the
    /// subscriber count moves to `subscriberHistory`, so neither is kept
    /// here.
    #[must_use]
    pub fn assemble(
        ts: String,
        static_data: &StaticData,
        raw: &RawSnapshot,
        metrics: DerivedMetrics,
    ) -> Self {
        let mut channel = static_data.clone();
        channel.published_at = None;
        Self {
            ts,
            channel,
            view_count: raw.view_count.clone(),
            video_count: raw.video_count.clone(),
            hidden_subscriber_count: raw.hidden_subscriber_count,
            metrics,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberHistoryEntry {
    /// Calendar month, `YYYY-MM`.
    pub month: String,
    /// Subscriber count, decimal string.
    pub count: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyViewsEntry {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub total_views: String,
    /// Increase over the previous tracked day; may be negative.
    pub daily_increase: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyViewsEntry {
    pub start_date: String,
    pub end_date: String,
    pub total_views: String,
    pub weekly_increase: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Set on first write, never changed afterwards.
    pub first_collected: String,
    pub last_updated: String,
    /// Strictly increases with every successful write.
    pub total_collections: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_assemble_drops_published_at_and_subscribers() {
        let static_data = StaticData {
            title: Some("Channel".to_string()),
            published_at: Some("2012-02-20T00:00:00Z".to_string()),
            ..StaticData::default()
        };
        let raw = RawSnapshot {
            subscriber_count: Some("1000".to_string()),
            view_count: Some("50000".to_string()),
            video_count: Some("10".to_string()),
            hidden_subscriber_count: Some(false),
        };
        let snapshot = StoredSnapshot::assemble(
            "2025-08-06T00:00:00.000Z".to_string(),
            &static_data,
            &raw,
            DerivedMetrics::default(),
        );
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("publishedAt").is_none());
        assert!(json.get("subscriberCount").is_none());
        assert_eq!(json.get("viewCount"), Some(&serde_json::json!("50000")));
        assert_eq!(json.get("title"), Some(&serde_json::json!("Channel")));
    }

    #[test]
    fn document_round_trips_through_the_wire_shape() {
        let raw_json = serde_json::json!({
            "channelId": "UCtest",
            "staticData": { "publishedAt": "2012-02-20T00:00:00Z" },
            "snapshots": [{
                "ts": "2025-08-06T00:00:00.000Z",
                "title": "Channel",
                "customUrl": "@channel",
                "country": "US",
                "thumbnailDefault": "https://example.com/t.jpg",
                "uploadsPlaylistId": "UUtest",
                "viewCount": "50000",
                "videoCount": "10",
                "gavg": 5000,
                "vsvp": 3.4
            }],
            "subscriberHistory": [{ "month": "2025-08", "count": "1000" }],
            "dailyViewsHistory": [{
                "date": "2025-08-06", "totalViews": "50000", "dailyIncrease": "120"
            }],
            "weeklyViewsHistory": [{
                "startDate": "2025-07-30", "endDate": "2025-08-06",
                "totalViews": "50000", "weeklyIncrease": "900"
            }],
            "recentThumbnailsHistory": [{
                "date": "2025-08-05", "url": "https://example.com/v.jpg", "title": "Video"
            }],
            "metadata": {
                "firstCollected": "2025-07-01T00:00:00.000Z",
                "lastUpdated": "2025-08-06T00:00:00.000Z",
                "totalCollections": 12
            }
        });

        let doc: ChannelDocument = serde_json::from_value(raw_json.clone()).unwrap();
        assert_eq!(doc.channel_id, "UCtest");
        assert_eq!(doc.snapshots.len(), 1);
        assert_eq!(doc.snapshots[0].metrics.average_views_per_video, Some(5000));
        assert_eq!(doc.snapshots[0].metrics.shorts_views_percentage, Some(3.4));
        assert_eq!(doc.metadata.as_ref().unwrap().total_collections, 12);

        let back = serde_json::to_value(&doc).unwrap();
        assert_eq!(back, raw_json);
    }

    #[test]
    fn legacy_document_without_histories_parses() {
        let doc: ChannelDocument = serde_json::from_value(serde_json::json!({
            "channelId": "UCold",
            "snapshots": []
        }))
        .unwrap();
        assert!(doc.daily_views_history.is_empty());
        assert!(doc.metadata.is_none());
    }
}
