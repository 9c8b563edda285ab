//! Field-completeness gate run immediately before persistence.
//!
//! 25 fields are required: 5 static, 3 snapshot counters, 17 derived. A
//! channel missing any of them is not written at all — no partial documents.

use ytcdb_core::registry::DerivedField;
use ytcdb_core::snapshot::{RawSnapshot, StaticData};

use crate::engine::DerivedMetrics;

/// Static fields the persisted document must carry.
const REQUIRED_STATIC: &[&str] = &[
    "title",
    "customUrl",
    "country",
    "thumbnailDefault",
    "uploadsPlaylistId",
];

/// Snapshot counters the persisted document must carry.
const REQUIRED_SNAPSHOT: &[&str] = &["viewCount", "videoCount", "subscriberCount"];

/// The fields a failed validation reported missing, grouped by bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFields {
    pub static_fields: Vec<&'static str>,
    pub snapshot_fields: Vec<&'static str>,
    pub derived_fields: Vec<&'static str>,
}

impl MissingFields {
    #[must_use]
    pub fn total(&self) -> usize {
        self.static_fields.len() + self.snapshot_fields.len() + self.derived_fields.len()
    }
}

impl std::fmt::Display for MissingFields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} required fields missing (static: {:?}, snapshot: {:?}, derived: {:?})",
            self.total(),
            self.static_fields,
            self.snapshot_fields,
            self.derived_fields
        )
    }
}

/// Verify that every required field is present before persistence.
///
/// A missing `country` is auto-filled with the literal string `"null"` and
/// not counted as missing; every other absence fails the gate.
///
/// # Errors
///
/// Returns [`MissingFields`] naming each absent field so the caller can log
/// per-bucket counts and abort the write.
pub fn validate(
    static_data: &mut StaticData,
    raw: &RawSnapshot,
    metrics: &DerivedMetrics,
) -> Result<(), MissingFields> {
    if static_data.country.is_none() {
        static_data.country = Some("null".to_string());
    }

    let static_fields: Vec<&'static str> = REQUIRED_STATIC
        .iter()
        .copied()
        .filter(|&field| match field {
            "title" => static_data.title.is_none(),
            "customUrl" => static_data.custom_url.is_none(),
            "country" => static_data.country.is_none(),
            "thumbnailDefault" => static_data.thumbnail_default.is_none(),
            "uploadsPlaylistId" => static_data.uploads_playlist_id.is_none(),
            _ => unreachable!("unknown required static field {field}"),
        })
        .collect();

    let snapshot_fields: Vec<&'static str> = REQUIRED_SNAPSHOT
        .iter()
        .copied()
        .filter(|&field| match field {
            "viewCount" => raw.view_count.is_none(),
            "videoCount" => raw.video_count.is_none(),
            "subscriberCount" => raw.subscriber_count.is_none(),
            _ => unreachable!("unknown required snapshot field {field}"),
        })
        .collect();

    let derived_fields: Vec<&'static str> = DerivedField::ALL
        .into_iter()
        .filter(|field| !metrics.has(*field))
        .map(DerivedField::short_key)
        .collect();

    if static_fields.is_empty() && snapshot_fields.is_empty() && derived_fields.is_empty() {
        Ok(())
    } else {
        Err(MissingFields {
            static_fields,
            snapshot_fields,
            derived_fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_static() -> StaticData {
        StaticData {
            title: Some("Channel".to_string()),
            custom_url: Some("@channel".to_string()),
            country: Some("US".to_string()),
            thumbnail_default: Some("https://example.com/t.jpg".to_string()),
            uploads_playlist_id: Some("UUabc123".to_string()),
            ..StaticData::default()
        }
    }

    fn complete_raw() -> RawSnapshot {
        RawSnapshot {
            subscriber_count: Some("1000".to_string()),
            view_count: Some("50000".to_string()),
            video_count: Some("10".to_string()),
            hidden_subscriber_count: None,
        }
    }

    fn complete_metrics() -> DerivedMetrics {
        DerivedMetrics {
            average_views_per_video: Some(5000),
            subscribers_per_video: Some(2.0),
            views_per_subscriber: Some(5000.0),
            channel_age_in_days: Some(100),
            uploads_per_week: Some(0.7),
            subs_gained_per_day: Some(10),
            views_gained_per_day: Some(500),
            subs_gained_per_month: Some(304),
            subs_gained_per_year: Some(3653),
            viral_index: Some(200),
            shorts_count: Some(2),
            longform_count: Some(8),
            total_shorts_duration: Some(120),
            estimated_shorts_views: Some(1000),
            shorts_views_percentage: Some(2.0),
            estimated_longform_views: Some(49000),
            longform_views_percentage: Some(98.0),
        }
    }

    #[test]
    fn complete_data_passes() {
        let mut static_data = complete_static();
        let result = validate(&mut static_data, &complete_raw(), &complete_metrics());
        assert!(result.is_ok(), "expected Ok, got: {result:?}");
    }

    #[test]
    fn missing_country_is_auto_filled_not_missing() {
        let mut static_data = complete_static();
        static_data.country = None;
        let result = validate(&mut static_data, &complete_raw(), &complete_metrics());
        assert!(result.is_ok());
        assert_eq!(static_data.country.as_deref(), Some("null"));
    }

    #[test]
    fn missing_uploads_playlist_id_fails_with_exactly_one_static_field() {
        let mut static_data = complete_static();
        static_data.uploads_playlist_id = None;
        let err = validate(&mut static_data, &complete_raw(), &complete_metrics()).unwrap_err();
        assert_eq!(err.static_fields, vec!["uploadsPlaylistId"]);
        assert!(err.snapshot_fields.is_empty());
        assert!(err.derived_fields.is_empty());
        assert_eq!(err.total(), 1);
    }

    #[test]
    fn missing_snapshot_counter_is_reported_in_its_bucket() {
        let mut static_data = complete_static();
        let raw = RawSnapshot {
            subscriber_count: None,
            ..complete_raw()
        };
        let err = validate(&mut static_data, &raw, &complete_metrics()).unwrap_err();
        assert_eq!(err.snapshot_fields, vec!["subscriberCount"]);
    }

    #[test]
    fn missing_derived_fields_are_reported_by_short_key() {
        let mut static_data = complete_static();
        let metrics = DerivedMetrics {
            shorts_count: None,
            longform_views_percentage: None,
            ..complete_metrics()
        };
        let err = validate(&mut static_data, &complete_raw(), &metrics).unwrap_err();
        assert_eq!(err.derived_fields, vec!["csct", "vlvp"]);
        assert_eq!(err.total(), 2);
    }

    #[test]
    fn fully_empty_inputs_report_every_bucket() {
        let mut static_data = StaticData::default();
        let err = validate(
            &mut static_data,
            &RawSnapshot::default(),
            &DerivedMetrics::default(),
        )
        .unwrap_err();
        // country auto-fills, leaving 4 of 5 static fields missing.
        assert_eq!(err.static_fields.len(), 4);
        assert_eq!(err.snapshot_fields.len(), 3);
        assert_eq!(err.derived_fields.len(), 17);
        assert_eq!(err.total(), 24);
    }

    #[test]
    fn zero_valued_counter_string_still_counts_as_present() {
        let mut static_data = complete_static();
        let raw = RawSnapshot {
            view_count: Some("0".to_string()),
            ..complete_raw()
        };
        let result = validate(&mut static_data, &raw, &complete_metrics());
        assert!(result.is_ok(), "presence, not value, is what is validated");
    }
}
