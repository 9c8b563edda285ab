//! Raw data captured from the channels endpoint, split into the two output
//! buckets the field registry defines.

use serde::{Deserialize, Serialize};

/// Rarely-changing channel fields.
///
/// Everything is optional: which fields are populated depends on the
/// requested [`FieldSet`](crate::registry::FieldSet). Serialized keys match
/// the persisted-document contract (camelCase, absent when `None`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_medium: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_high: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_external_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unsubscribed_trailer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploads_playlist_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_linked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_uploads_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub made_for_kids: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_declared_made_for_kids: Option<bool>,
}

/// Point-in-time channel statistics, as the API returns them: unsigned
/// integers encoded as decimal strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber_count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_subscriber_count: Option<bool>,
}

impl RawSnapshot {
    #[must_use]
    pub fn subscriber_count_u64(&self) -> Option<u64> {
        parse_count(self.subscriber_count.as_deref())
    }

    #[must_use]
    pub fn view_count_u64(&self) -> Option<u64> {
        parse_count(self.view_count.as_deref())
    }

    #[must_use]
    pub fn video_count_u64(&self) -> Option<u64> {
        parse_count(self.video_count.as_deref())
    }
}

/// A malformed count string is treated the same as an absent one: the
/// dependent metric is omitted rather than computed from garbage.
fn parse_count(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
}

/// Result of scanning a channel's uploads for shorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortsAggregate {
    pub shorts_count: u64,
    pub total_shorts_views: u64,
}

/// One recently-published video's thumbnail, as stored in the
/// `recentThumbnailsHistory` window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentThumbnail {
    /// Publish date, `YYYY-MM-DD`.
    pub date: String,
    pub url: String,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_parse_from_decimal_strings() {
        let snap = RawSnapshot {
            subscriber_count: Some("288000000".to_string()),
            view_count: Some("53123456789".to_string()),
            video_count: Some("799".to_string()),
            hidden_subscriber_count: None,
        };
        assert_eq!(snap.subscriber_count_u64(), Some(288_000_000));
        assert_eq!(snap.view_count_u64(), Some(53_123_456_789));
        assert_eq!(snap.video_count_u64(), Some(799));
    }

    #[test]
    fn absent_count_parses_to_none() {
        let snap = RawSnapshot::default();
        assert_eq!(snap.view_count_u64(), None);
    }

    #[test]
    fn malformed_count_parses_to_none() {
        let snap = RawSnapshot {
            view_count: Some("12a4".to_string()),
            ..RawSnapshot::default()
        };
        assert_eq!(snap.view_count_u64(), None);
    }

    #[test]
    fn static_data_omits_absent_fields_when_serialized() {
        let data = StaticData {
            title: Some("Channel".to_string()),
            ..StaticData::default()
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "Channel" }));
    }

    #[test]
    fn static_data_uses_camel_case_keys() {
        let data = StaticData {
            custom_url: Some("@handle".to_string()),
            uploads_playlist_id: Some("UUabc".to_string()),
            ..StaticData::default()
        };
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("customUrl").is_some());
        assert!(json.get("uploadsPlaylistId").is_some());
    }
}
