//! Static field registry for the `YouTube` channels endpoint.
//!
//! Maps every requestable channel field to the API `part` that supplies it
//! and the output bucket it lands in, and catalogs the derived metrics with
//! their 4-character short keys. Adding a field is a table edit here, not a
//! new branch in the fetch path.

use std::collections::BTreeSet;

/// A `part=` value of the `channels.list` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ApiPart {
    Snippet,
    Statistics,
    BrandingSettings,
    ContentDetails,
    TopicDetails,
    Status,
}

impl ApiPart {
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            ApiPart::Snippet => "snippet",
            ApiPart::Statistics => "statistics",
            ApiPart::BrandingSettings => "brandingSettings",
            ApiPart::ContentDetails => "contentDetails",
            ApiPart::TopicDetails => "topicDetails",
            ApiPart::Status => "status",
        }
    }
}

/// Which output bucket a raw field belongs in.
///
/// `Static` fields change rarely (identity, branding); `Snapshot` fields are
/// the mutable statistics captured fresh on every collection cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Static,
    Snapshot,
}

/// A raw channel field requestable from the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChannelField {
    Title,
    Description,
    CustomUrl,
    PublishedAt,
    ThumbnailUrl,
    ThumbnailDefault,
    ThumbnailMedium,
    ThumbnailHigh,
    DefaultLanguage,
    Country,
    SubscriberCount,
    ViewCount,
    VideoCount,
    HiddenSubscriberCount,
    Keywords,
    BannerExternalUrl,
    UnsubscribedTrailer,
    UploadsPlaylistId,
    TopicIds,
    TopicCategories,
    PrivacyStatus,
    IsLinked,
    LongUploadsStatus,
    MadeForKids,
    SelfDeclaredMadeForKids,
}

/// One registry row: field, supplying part, output bucket, wire name.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: ChannelField,
    pub api_part: ApiPart,
    pub bucket: Bucket,
    pub wire_name: &'static str,
}

/// The full registry, one row per requestable field. Loaded once, never mutated.
pub const CHANNEL_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        field: ChannelField::Title,
        api_part: ApiPart::Snippet,
        bucket: Bucket::Static,
        wire_name: "title",
    },
    FieldSpec {
        field: ChannelField::Description,
        api_part: ApiPart::Snippet,
        bucket: Bucket::Static,
        wire_name: "description",
    },
    FieldSpec {
        field: ChannelField::CustomUrl,
        api_part: ApiPart::Snippet,
        bucket: Bucket::Static,
        wire_name: "customUrl",
    },
    FieldSpec {
        field: ChannelField::PublishedAt,
        api_part: ApiPart::Snippet,
        bucket: Bucket::Static,
        wire_name: "publishedAt",
    },
    FieldSpec {
        field: ChannelField::ThumbnailUrl,
        api_part: ApiPart::Snippet,
        bucket: Bucket::Static,
        wire_name: "thumbnailUrl",
    },
    FieldSpec {
        field: ChannelField::ThumbnailDefault,
        api_part: ApiPart::Snippet,
        bucket: Bucket::Static,
        wire_name: "thumbnailDefault",
    },
    FieldSpec {
        field: ChannelField::ThumbnailMedium,
        api_part: ApiPart::Snippet,
        bucket: Bucket::Static,
        wire_name: "thumbnailMedium",
    },
    FieldSpec {
        field: ChannelField::ThumbnailHigh,
        api_part: ApiPart::Snippet,
        bucket: Bucket::Static,
        wire_name: "thumbnailHigh",
    },
    FieldSpec {
        field: ChannelField::DefaultLanguage,
        api_part: ApiPart::Snippet,
        bucket: Bucket::Static,
        wire_name: "defaultLanguage",
    },
    FieldSpec {
        field: ChannelField::Country,
        api_part: ApiPart::Snippet,
        bucket: Bucket::Static,
        wire_name: "country",
    },
    FieldSpec {
        field: ChannelField::SubscriberCount,
        api_part: ApiPart::Statistics,
        bucket: Bucket::Snapshot,
        wire_name: "subscriberCount",
    },
    FieldSpec {
        field: ChannelField::ViewCount,
        api_part: ApiPart::Statistics,
        bucket: Bucket::Snapshot,
        wire_name: "viewCount",
    },
    FieldSpec {
        field: ChannelField::VideoCount,
        api_part: ApiPart::Statistics,
        bucket: Bucket::Snapshot,
        wire_name: "videoCount",
    },
    FieldSpec {
        field: ChannelField::HiddenSubscriberCount,
        api_part: ApiPart::Statistics,
        bucket: Bucket::Snapshot,
        wire_name: "hiddenSubscriberCount",
    },
    FieldSpec {
        field: ChannelField::Keywords,
        api_part: ApiPart::BrandingSettings,
        bucket: Bucket::Static,
        wire_name: "keywords",
    },
    FieldSpec {
        field: ChannelField::BannerExternalUrl,
        api_part: ApiPart::BrandingSettings,
        bucket: Bucket::Static,
        wire_name: "bannerExternalUrl",
    },
    FieldSpec {
        field: ChannelField::UnsubscribedTrailer,
        api_part: ApiPart::BrandingSettings,
        bucket: Bucket::Static,
        wire_name: "unsubscribedTrailer",
    },
    FieldSpec {
        field: ChannelField::UploadsPlaylistId,
        api_part: ApiPart::ContentDetails,
        bucket: Bucket::Static,
        wire_name: "uploadsPlaylistId",
    },
    FieldSpec {
        field: ChannelField::TopicIds,
        api_part: ApiPart::TopicDetails,
        bucket: Bucket::Static,
        wire_name: "topicIds",
    },
    FieldSpec {
        field: ChannelField::TopicCategories,
        api_part: ApiPart::TopicDetails,
        bucket: Bucket::Static,
        wire_name: "topicCategories",
    },
    FieldSpec {
        field: ChannelField::PrivacyStatus,
        api_part: ApiPart::Status,
        bucket: Bucket::Static,
        wire_name: "privacyStatus",
    },
    FieldSpec {
        field: ChannelField::IsLinked,
        api_part: ApiPart::Status,
        bucket: Bucket::Static,
        wire_name: "isLinked",
    },
    FieldSpec {
        field: ChannelField::LongUploadsStatus,
        api_part: ApiPart::Status,
        bucket: Bucket::Static,
        wire_name: "longUploadsStatus",
    },
    FieldSpec {
        field: ChannelField::MadeForKids,
        api_part: ApiPart::Status,
        bucket: Bucket::Static,
        wire_name: "madeForKids",
    },
    FieldSpec {
        field: ChannelField::SelfDeclaredMadeForKids,
        api_part: ApiPart::Status,
        bucket: Bucket::Static,
        wire_name: "selfDeclaredMadeForKids",
    },
];

impl ChannelField {
    /// Registry row for this field.
    ///
    /// # Panics
    ///
    /// Never panics: every variant has exactly one row in [`CHANNEL_FIELDS`],
    /// which `registry_covers_every_field` asserts.
    #[must_use]
    pub fn spec(self) -> &'static FieldSpec {
        CHANNEL_FIELDS
            .iter()
            .find(|s| s.field == self)
            .expect("every ChannelField has a registry row")
    }

    #[must_use]
    pub fn api_part(self) -> ApiPart {
        self.spec().api_part
    }

    #[must_use]
    pub fn bucket(self) -> Bucket {
        self.spec().bucket
    }

    #[must_use]
    pub fn wire_name(self) -> &'static str {
        self.spec().wire_name
    }
}

/// A derived metric, in computation order.
///
/// The declaration order here is the evaluation order of the metrics engine;
/// later metrics may depend on intermediates produced by earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DerivedField {
    AverageViewsPerVideo,
    SubscribersPerVideo,
    ViewsPerSubscriber,
    ChannelAgeInDays,
    UploadsPerWeek,
    SubsGainedPerDay,
    ViewsGainedPerDay,
    SubsGainedPerMonth,
    SubsGainedPerYear,
    ViralIndex,
    ShortsCount,
    LongformCount,
    TotalShortsDuration,
    EstimatedShortsViews,
    ShortsViewsPercentage,
    EstimatedLongformViews,
    LongformViewsPercentage,
}

impl DerivedField {
    /// All derived fields in computation order.
    pub const ALL: [DerivedField; 17] = [
        DerivedField::AverageViewsPerVideo,
        DerivedField::SubscribersPerVideo,
        DerivedField::ViewsPerSubscriber,
        DerivedField::ChannelAgeInDays,
        DerivedField::UploadsPerWeek,
        DerivedField::SubsGainedPerDay,
        DerivedField::ViewsGainedPerDay,
        DerivedField::SubsGainedPerMonth,
        DerivedField::SubsGainedPerYear,
        DerivedField::ViralIndex,
        DerivedField::ShortsCount,
        DerivedField::LongformCount,
        DerivedField::TotalShortsDuration,
        DerivedField::EstimatedShortsViews,
        DerivedField::ShortsViewsPercentage,
        DerivedField::EstimatedLongformViews,
        DerivedField::LongformViewsPercentage,
    ];

    /// 4-character key used for compact persisted storage.
    #[must_use]
    pub fn short_key(self) -> &'static str {
        match self {
            DerivedField::AverageViewsPerVideo => "gavg",
            DerivedField::SubscribersPerVideo => "gsub",
            DerivedField::ViewsPerSubscriber => "gvps",
            DerivedField::ChannelAgeInDays => "gage",
            DerivedField::UploadsPerWeek => "gupw",
            DerivedField::SubsGainedPerDay => "gspd",
            DerivedField::ViewsGainedPerDay => "gvpd",
            DerivedField::SubsGainedPerMonth => "gspm",
            DerivedField::SubsGainedPerYear => "gspy",
            DerivedField::ViralIndex => "gvir",
            DerivedField::ShortsCount => "csct",
            DerivedField::LongformCount => "clct",
            DerivedField::TotalShortsDuration => "csdr",
            DerivedField::EstimatedShortsViews => "vesv",
            DerivedField::ShortsViewsPercentage => "vsvp",
            DerivedField::EstimatedLongformViews => "velv",
            DerivedField::LongformViewsPercentage => "vlvp",
        }
    }

    /// Whether computing this metric requires the shorts aggregate scan.
    #[must_use]
    pub fn needs_shorts_aggregate(self) -> bool {
        matches!(
            self,
            DerivedField::ShortsCount
                | DerivedField::LongformCount
                | DerivedField::TotalShortsDuration
                | DerivedField::EstimatedShortsViews
                | DerivedField::ShortsViewsPercentage
                | DerivedField::EstimatedLongformViews
                | DerivedField::LongformViewsPercentage
        )
    }

    /// Whether computing this metric requires the channel publish date.
    #[must_use]
    pub fn needs_published_at(self) -> bool {
        matches!(
            self,
            DerivedField::ChannelAgeInDays
                | DerivedField::UploadsPerWeek
                | DerivedField::SubsGainedPerDay
                | DerivedField::ViewsGainedPerDay
                | DerivedField::SubsGainedPerMonth
                | DerivedField::SubsGainedPerYear
        )
    }
}

/// The set of raw fields to request for one collection cycle.
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    fields: BTreeSet<ChannelField>,
}

impl FieldSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The fields a full collection cycle needs: everything the completeness
    /// validator requires plus the publish date for age-derived metrics.
    #[must_use]
    pub fn collection_default() -> Self {
        let mut set = Self::new();
        for field in [
            ChannelField::Title,
            ChannelField::CustomUrl,
            ChannelField::Country,
            ChannelField::ThumbnailDefault,
            ChannelField::PublishedAt,
            ChannelField::UploadsPlaylistId,
            ChannelField::SubscriberCount,
            ChannelField::ViewCount,
            ChannelField::VideoCount,
        ] {
            set.insert(field);
        }
        set
    }

    pub fn insert(&mut self, field: ChannelField) {
        self.fields.insert(field);
    }

    #[must_use]
    pub fn contains(&self, field: ChannelField) -> bool {
        self.fields.contains(&field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ChannelField> + '_ {
        self.fields.iter().copied()
    }

    /// Add the raw fields the requested derived metrics depend on.
    pub fn ensure_derived_inputs(&mut self, requested: &BTreeSet<DerivedField>) {
        if requested.contains(&DerivedField::LongformCount) {
            self.insert(ChannelField::VideoCount);
        }
        if requested.iter().any(|f| f.needs_shorts_aggregate()) {
            self.insert(ChannelField::UploadsPlaylistId);
        }
        if requested.iter().any(|f| f.needs_published_at()) {
            self.insert(ChannelField::PublishedAt);
        }
    }

    /// Add the raw fields the history mergers depend on: the uploads playlist
    /// for thumbnails plus the two counters the view/subscriber windows track.
    pub fn ensure_history_inputs(&mut self) {
        self.insert(ChannelField::UploadsPlaylistId);
        self.insert(ChannelField::ViewCount);
        self.insert(ChannelField::SubscriberCount);
    }

    /// The `part=` values needed to satisfy this field set.
    #[must_use]
    pub fn parts(&self) -> BTreeSet<ApiPart> {
        self.fields.iter().map(|f| f.api_part()).collect()
    }
}

impl FromIterator<ChannelField> for FieldSet {
    fn from_iter<I: IntoIterator<Item = ChannelField>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_field() {
        // spec() panics if a variant is missing a row; exercise all of them.
        for spec in CHANNEL_FIELDS {
            assert_eq!(spec.field.spec().wire_name, spec.wire_name);
        }
        assert_eq!(CHANNEL_FIELDS.len(), 25);
    }

    #[test]
    fn statistics_fields_are_snapshot_bucket() {
        assert_eq!(ChannelField::ViewCount.bucket(), Bucket::Snapshot);
        assert_eq!(ChannelField::SubscriberCount.bucket(), Bucket::Snapshot);
        assert_eq!(ChannelField::VideoCount.bucket(), Bucket::Snapshot);
        assert_eq!(ChannelField::Title.bucket(), Bucket::Static);
    }

    #[test]
    fn parts_for_mixed_fields() {
        let set: FieldSet = [
            ChannelField::Title,
            ChannelField::ViewCount,
            ChannelField::UploadsPlaylistId,
        ]
        .into_iter()
        .collect();
        let parts = set.parts();
        assert!(parts.contains(&ApiPart::Snippet));
        assert!(parts.contains(&ApiPart::Statistics));
        assert!(parts.contains(&ApiPart::ContentDetails));
        assert_eq!(parts.len(), 3);
    }

    #[test]
    fn empty_field_set_needs_no_parts() {
        let set = FieldSet::new();
        assert!(set.is_empty());
        assert!(set.parts().is_empty());
    }

    #[test]
    fn short_keys_are_unique_and_four_chars() {
        let mut seen = std::collections::HashSet::new();
        for field in DerivedField::ALL {
            let key = field.short_key();
            assert_eq!(key.len(), 4, "short key {key} must be 4 chars");
            assert!(seen.insert(key), "duplicate short key {key}");
        }
        assert_eq!(seen.len(), 17);
    }

    #[test]
    fn derived_inputs_pull_in_playlist_and_publish_date() {
        let requested: BTreeSet<DerivedField> =
            [DerivedField::LongformCount, DerivedField::ChannelAgeInDays]
                .into_iter()
                .collect();
        let mut set = FieldSet::new();
        set.ensure_derived_inputs(&requested);
        assert!(set.contains(ChannelField::UploadsPlaylistId));
        assert!(set.contains(ChannelField::PublishedAt));
        assert!(set.contains(ChannelField::VideoCount));
    }

    #[test]
    fn history_inputs_force_counters() {
        let mut set = FieldSet::new();
        set.ensure_history_inputs();
        assert!(set.contains(ChannelField::ViewCount));
        assert!(set.contains(ChannelField::SubscriberCount));
        assert!(set.contains(ChannelField::UploadsPlaylistId));
    }
}
