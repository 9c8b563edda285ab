//! Mapping from a raw `channels.list` item to the static/snapshot buckets,
//! honoring the requested field set.

use ytcdb_core::registry::{ChannelField, FieldSet};
use ytcdb_core::snapshot::{RawSnapshot, StaticData};

use crate::types::ChannelItem;

/// Copy the requested fields out of one channel item, splitting them into
/// the static and snapshot buckets the registry assigns.
///
/// Absent statistics counters default to `"0"` strings (the API omits
/// counters the channel hides); everything else stays absent when the API
/// did not return it.
pub(crate) fn map_channel_item(item: &ChannelItem, fields: &FieldSet) -> (StaticData, RawSnapshot) {
    let mut static_data = StaticData::default();
    let mut snapshot = RawSnapshot::default();

    if let Some(snippet) = &item.snippet {
        let wants = |f| fields.contains(f);
        if wants(ChannelField::Title) {
            static_data.title.clone_from(&snippet.title);
        }
        if wants(ChannelField::Description) {
            static_data.description.clone_from(&snippet.description);
        }
        if wants(ChannelField::CustomUrl) {
            static_data.custom_url.clone_from(&snippet.custom_url);
        }
        if wants(ChannelField::PublishedAt) {
            static_data.published_at.clone_from(&snippet.published_at);
        }
        if wants(ChannelField::DefaultLanguage) {
            static_data
                .default_language
                .clone_from(&snippet.default_language);
        }
        if wants(ChannelField::Country) {
            static_data.country.clone_from(&snippet.country);
        }
        if let Some(thumbnails) = &snippet.thumbnails {
            if wants(ChannelField::ThumbnailUrl) {
                static_data.thumbnail_url = thumbnails.profile_url().map(str::to_owned);
            }
            if wants(ChannelField::ThumbnailDefault) {
                static_data.thumbnail_default =
                    thumbnails.default.as_ref().map(|t| t.url.clone());
            }
            if wants(ChannelField::ThumbnailMedium) {
                static_data.thumbnail_medium = thumbnails.medium.as_ref().map(|t| t.url.clone());
            }
            if wants(ChannelField::ThumbnailHigh) {
                static_data.thumbnail_high = thumbnails.high.as_ref().map(|t| t.url.clone());
            }
        }
    }

    if let Some(statistics) = &item.statistics {
        let or_zero = |count: &Option<String>| -> Option<String> {
            Some(count.clone().unwrap_or_else(|| "0".to_string()))
        };
        if fields.contains(ChannelField::SubscriberCount) {
            snapshot.subscriber_count = or_zero(&statistics.subscriber_count);
        }
        if fields.contains(ChannelField::ViewCount) {
            snapshot.view_count = or_zero(&statistics.view_count);
        }
        if fields.contains(ChannelField::VideoCount) {
            snapshot.video_count = or_zero(&statistics.video_count);
        }
        if fields.contains(ChannelField::HiddenSubscriberCount) {
            snapshot.hidden_subscriber_count = statistics.hidden_subscriber_count;
        }
    }

    if let Some(branding) = &item.branding_settings {
        if let Some(channel) = &branding.channel {
            if fields.contains(ChannelField::Keywords) {
                static_data.keywords.clone_from(&channel.keywords);
            }
            if fields.contains(ChannelField::UnsubscribedTrailer) {
                static_data
                    .unsubscribed_trailer
                    .clone_from(&channel.unsubscribed_trailer);
            }
        }
        if let Some(image) = &branding.image {
            if fields.contains(ChannelField::BannerExternalUrl) {
                static_data
                    .banner_external_url
                    .clone_from(&image.banner_external_url);
            }
        }
    }

    if let Some(content) = &item.content_details {
        if let Some(playlists) = &content.related_playlists {
            if fields.contains(ChannelField::UploadsPlaylistId) {
                static_data.uploads_playlist_id.clone_from(&playlists.uploads);
            }
        }
    }

    if let Some(topics) = &item.topic_details {
        if fields.contains(ChannelField::TopicIds) {
            static_data.topic_ids.clone_from(&topics.topic_ids);
        }
        if fields.contains(ChannelField::TopicCategories) {
            static_data
                .topic_categories
                .clone_from(&topics.topic_categories);
        }
    }

    if let Some(status) = &item.status {
        if fields.contains(ChannelField::PrivacyStatus) {
            static_data.privacy_status.clone_from(&status.privacy_status);
        }
        if fields.contains(ChannelField::IsLinked) {
            static_data.is_linked = status.is_linked;
        }
        if fields.contains(ChannelField::LongUploadsStatus) {
            static_data
                .long_uploads_status
                .clone_from(&status.long_uploads_status);
        }
        if fields.contains(ChannelField::MadeForKids) {
            static_data.made_for_kids = status.made_for_kids;
        }
        if fields.contains(ChannelField::SelfDeclaredMadeForKids) {
            static_data.self_declared_made_for_kids = status.self_declared_made_for_kids;
        }
    }

    (static_data, snapshot)
}
