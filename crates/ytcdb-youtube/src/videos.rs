//! Uploads-playlist scans: the shorts aggregate and the recent-thumbnail
//! window.

use tracing::{debug, warn};

use ytcdb_core::snapshot::{RecentThumbnail, ShortsAggregate};

use crate::client::{parse_value, YoutubeClient, PAGE_SIZE};
use crate::duration::parse_iso8601_duration;
use crate::error::YoutubeError;
use crate::types::{PlaylistItemsResponse, Thumbnails, VideoListResponse};

/// A video counts as a short when its duration is in `(0, 60]` seconds.
const SHORT_MAX_SECS: u64 = 60;

/// Entries kept in the recent-thumbnails window.
const RECENT_THUMBNAIL_COUNT: usize = 7;

impl YoutubeClient {
    /// Scans the channel's most recent uploads (up to the configured limit,
    /// default 1000) and classifies each by duration, summing the view
    /// counts of the qualifying shorts.
    ///
    /// A failed video-detail batch is logged and skipped rather than
    /// failing the scan; quota exhaustion always propagates.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::QuotaExceeded`] when the daily quota is exhausted.
    /// - [`YoutubeError::ApiError`] / [`YoutubeError::Http`] /
    ///   [`YoutubeError::Deserialize`] when the playlist itself cannot be
    ///   listed.
    pub async fn fetch_shorts_aggregate(
        &self,
        uploads_playlist_id: &str,
    ) -> Result<ShortsAggregate, YoutubeError> {
        let mut video_ids: Vec<String> = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .playlist_page(uploads_playlist_id, page_token.as_deref(), PAGE_SIZE)
                .await?;
            video_ids.extend(
                page.items
                    .into_iter()
                    .filter_map(|item| item.content_details.and_then(|c| c.video_id)),
            );
            if video_ids.len() >= self.shorts_scan_limit {
                video_ids.truncate(self.shorts_scan_limit);
                break;
            }
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        let mut shorts_count = 0u64;
        let mut total_shorts_views = 0u64;

        for batch in video_ids.chunks(PAGE_SIZE) {
            let ids = batch.join(",");
            let url =
                self.build_url("videos", &[("part", "contentDetails,statistics"), ("id", &ids)])?;
            let context = format!("videos(playlist={uploads_playlist_id})");
            let body = match self.get_json(url, &context).await {
                Ok(body) => body,
                Err(e @ YoutubeError::QuotaExceeded(_)) => return Err(e),
                Err(e) => {
                    warn!(error = %e, "video detail batch failed; skipping");
                    continue;
                }
            };
            let response: VideoListResponse = parse_value(body, &context)?;

            for video in response.items {
                let Some(duration) = video.content_details.and_then(|c| c.duration) else {
                    continue;
                };
                let secs = parse_iso8601_duration(&duration);
                if secs > 0 && secs <= SHORT_MAX_SECS {
                    shorts_count += 1;
                    let views = video
                        .statistics
                        .and_then(|s| s.view_count)
                        .and_then(|v| v.parse::<u64>().ok())
                        .unwrap_or(0);
                    total_shorts_views += views;
                }
            }
        }

        debug!(
            uploads_playlist_id,
            scanned = video_ids.len(),
            shorts_count,
            "shorts scan complete"
        );
        Ok(ShortsAggregate {
            shorts_count,
            total_shorts_views,
        })
    }

    /// The 7 most recently published videos' thumbnails, newest first.
    ///
    /// This window is rebuilt from scratch every cycle; it never merges
    /// with previously stored entries.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`YoutubeClient::fetch_shorts_aggregate`].
    pub async fn fetch_recent_thumbnails(
        &self,
        uploads_playlist_id: &str,
    ) -> Result<Vec<RecentThumbnail>, YoutubeError> {
        let page = self
            .playlist_page(uploads_playlist_id, None, RECENT_THUMBNAIL_COUNT)
            .await?;
        let video_ids: Vec<String> = page
            .items
            .into_iter()
            .filter_map(|item| item.content_details.and_then(|c| c.video_id))
            .collect();

        let mut thumbnails: Vec<RecentThumbnail> = Vec::new();
        for batch in video_ids.chunks(PAGE_SIZE) {
            let ids = batch.join(",");
            let url = self.build_url("videos", &[("part", "snippet"), ("id", &ids)])?;
            let context = format!("videos(snippet, playlist={uploads_playlist_id})");
            let body = match self.get_json(url, &context).await {
                Ok(body) => body,
                Err(e @ YoutubeError::QuotaExceeded(_)) => return Err(e),
                Err(e) => {
                    warn!(error = %e, "thumbnail detail batch failed; skipping");
                    continue;
                }
            };
            let response: VideoListResponse = parse_value(body, &context)?;

            for video in response.items {
                let Some(snippet) = video.snippet else { continue };
                let Some(published_at) = snippet.published_at else {
                    continue;
                };
                let Some(url) = snippet.thumbnails.as_ref().and_then(Thumbnails::best_url)
                else {
                    continue;
                };
                thumbnails.push(RecentThumbnail {
                    date: published_at.chars().take(10).collect(),
                    url: url.to_owned(),
                    title: snippet.title.unwrap_or_else(|| "Untitled".to_string()),
                });
            }
        }

        thumbnails.sort_by(|a, b| b.date.cmp(&a.date));
        thumbnails.truncate(RECENT_THUMBNAIL_COUNT);
        Ok(thumbnails)
    }

    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
        max_results: usize,
    ) -> Result<PlaylistItemsResponse, YoutubeError> {
        let max = max_results.to_string();
        let mut params = vec![
            ("part", "contentDetails"),
            ("playlistId", playlist_id),
            ("maxResults", max.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }
        let url = self.build_url("playlistItems", &params)?;
        let context = format!("playlistItems(playlistId={playlist_id})");
        let body = self.get_json(url, &context).await?;
        parse_value(body, &context)
    }
}
