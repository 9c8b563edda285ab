//! Channel discovery: keyword search plus statistics-based filtering, and
//! handle-to-id resolution.

use tracing::{debug, warn};

use crate::client::{parse_value, YoutubeClient, PAGE_SIZE};
use crate::error::YoutubeError;
use crate::types::{ChannelListResponse, SearchListResponse};

/// Ordering applied to discovered channels after the subscriber filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoverSort {
    /// Highest total view count first.
    ViewCount,
    /// Fewest uploaded videos first.
    VideoCountAsc,
}

#[derive(Debug)]
struct Candidate {
    id: String,
    subscribers: u64,
    views: u64,
    videos: u64,
}

impl YoutubeClient {
    /// Resolves a channel handle (`@name`) to its canonical `UC…` id via
    /// the search endpoint.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::NotFound`] when no channel matches the handle.
    /// - The usual client taxonomy otherwise.
    pub async fn resolve_handle(&self, handle: &str) -> Result<String, YoutubeError> {
        let name = handle.strip_prefix('@').unwrap_or(handle);
        let url = self.build_url(
            "search",
            &[
                ("part", "snippet"),
                ("q", name),
                ("type", "channel"),
                ("maxResults", "1"),
            ],
        )?;
        let context = format!("search(handle={handle})");
        let body = self.get_json(url, &context).await?;
        let response: SearchListResponse = parse_value(body, &context)?;

        response
            .items
            .first()
            .and_then(|item| item.snippet.as_ref())
            .and_then(|snippet| snippet.channel_id.clone())
            .ok_or_else(|| YoutubeError::NotFound {
                context: format!("channel handle {handle}"),
            })
    }

    /// Finds channels matching `keyword`, keeps the ones at or under
    /// `subscriber_cap` subscribers, orders them, and returns up to
    /// `max_results` channel ids.
    ///
    /// Channels in `exclude` (already-tracked ids) are dropped before the
    /// statistics fetch so they cost no extra quota. A failed statistics
    /// batch is logged and skipped; quota exhaustion always propagates.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::QuotaExceeded`] when the daily quota is exhausted.
    /// - [`YoutubeError::ApiError`] / [`YoutubeError::Http`] /
    ///   [`YoutubeError::Deserialize`] when the search itself fails.
    pub async fn discover_channels(
        &self,
        keyword: &str,
        subscriber_cap: u64,
        sort: DiscoverSort,
        max_results: usize,
        category_id: Option<&str>,
        exclude: &[String],
    ) -> Result<Vec<String>, YoutubeError> {
        let mut params = vec![
            ("part", "snippet"),
            ("type", "channel"),
            ("q", keyword),
            ("order", "viewCount"),
            ("maxResults", "50"),
        ];
        if let Some(category) = category_id {
            params.push(("videoCategoryId", category));
        }
        let url = self.build_url("search", &params)?;
        let context = format!("search(q={keyword})");
        let body = self.get_json(url, &context).await?;
        let response: SearchListResponse = parse_value(body, &context)?;

        let found: Vec<String> = response
            .items
            .into_iter()
            .filter_map(|item| item.snippet.and_then(|s| s.channel_id))
            .filter(|id| !exclude.contains(id))
            .collect();
        if found.is_empty() {
            debug!(keyword, "search returned no new channels");
            return Ok(Vec::new());
        }

        let mut candidates: Vec<Candidate> = Vec::new();
        for batch in found.chunks(PAGE_SIZE) {
            let ids = batch.join(",");
            let url = self.build_url("channels", &[("part", "statistics"), ("id", &ids)])?;
            let context = "channels(statistics batch)";
            let body = match self.get_json(url, context).await {
                Ok(body) => body,
                Err(e @ YoutubeError::QuotaExceeded(_)) => return Err(e),
                Err(e) => {
                    warn!(error = %e, "statistics batch failed; skipping");
                    continue;
                }
            };
            let response: ChannelListResponse = parse_value(body, context)?;
            for item in response.items {
                let Some(id) = item.id else { continue };
                let Some(stats) = item.statistics else { continue };
                let count = |raw: Option<String>| {
                    raw.and_then(|v| v.parse::<u64>().ok()).unwrap_or(0)
                };
                candidates.push(Candidate {
                    id,
                    subscribers: count(stats.subscriber_count),
                    views: count(stats.view_count),
                    videos: count(stats.video_count),
                });
            }
        }

        candidates.retain(|c| c.subscribers <= subscriber_cap);
        match sort {
            DiscoverSort::ViewCount => candidates.sort_by(|a, b| b.views.cmp(&a.views)),
            DiscoverSort::VideoCountAsc => candidates.sort_by(|a, b| a.videos.cmp(&b.videos)),
        }
        candidates.truncate(max_results);

        Ok(candidates.into_iter().map(|c| c.id).collect())
    }
}
