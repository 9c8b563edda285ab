//! Derived-metrics engine.
//!
//! Computes up to 17 secondary metrics from one raw statistics snapshot.
//! Metrics are evaluated in the order [`DerivedField::ALL`] declares; each is
//! computed only when requested AND all of its inputs are present with
//! nonzero denominators, and silently omitted otherwise — never defaulted
//! to zero. Later metrics reuse unrounded intermediates from earlier ones
//! (threaded through [`Intermediates`] rather than left implicit).

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ytcdb_core::registry::DerivedField;
use ytcdb_core::snapshot::{RawSnapshot, ShortsAggregate};

use crate::error::MetricsError;

/// Average month/year lengths in days, for extrapolating daily gain rates.
const DAYS_PER_MONTH: f64 = 30.44;
const DAYS_PER_YEAR: f64 = 365.25;

/// Longest uploads-playlist prefix the shorts scan inspects.
const SHORTS_SCAN_CAP: u64 = 1000;

/// Assumed length of one short, in seconds.
const SECONDS_PER_SHORT: u64 = 60;

/// The 17 derived metrics, keyed for persistence by their 4-char short keys.
///
/// `None` means the metric was not requested or an input was missing; the
/// completeness validator decides whether that blocks persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// averageViewsPerVideo
    #[serde(rename = "gavg", skip_serializing_if = "Option::is_none")]
    pub average_views_per_video: Option<u64>,
    /// subscribersPerVideo — subscriber conversion rate, percent.
    #[serde(rename = "gsub", skip_serializing_if = "Option::is_none")]
    pub subscribers_per_video: Option<f64>,
    /// viewsPerSubscriber, percent.
    #[serde(rename = "gvps", skip_serializing_if = "Option::is_none")]
    pub views_per_subscriber: Option<f64>,
    /// channelAgeInDays
    #[serde(rename = "gage", skip_serializing_if = "Option::is_none")]
    pub channel_age_in_days: Option<i64>,
    /// uploadsPerWeek
    #[serde(rename = "gupw", skip_serializing_if = "Option::is_none")]
    pub uploads_per_week: Option<f64>,
    /// subsGainedPerDay
    #[serde(rename = "gspd", skip_serializing_if = "Option::is_none")]
    pub subs_gained_per_day: Option<u64>,
    /// viewsGainedPerDay
    #[serde(rename = "gvpd", skip_serializing_if = "Option::is_none")]
    pub views_gained_per_day: Option<u64>,
    /// subsGainedPerMonth
    #[serde(rename = "gspm", skip_serializing_if = "Option::is_none")]
    pub subs_gained_per_month: Option<u64>,
    /// subsGainedPerYear
    #[serde(rename = "gspy", skip_serializing_if = "Option::is_none")]
    pub subs_gained_per_year: Option<u64>,
    /// viralIndex
    #[serde(rename = "gvir", skip_serializing_if = "Option::is_none")]
    pub viral_index: Option<u64>,
    /// shortsCount
    #[serde(rename = "csct", skip_serializing_if = "Option::is_none")]
    pub shorts_count: Option<u64>,
    /// longformCount
    #[serde(rename = "clct", skip_serializing_if = "Option::is_none")]
    pub longform_count: Option<i64>,
    /// totalShortsDuration, seconds (estimated).
    #[serde(rename = "csdr", skip_serializing_if = "Option::is_none")]
    pub total_shorts_duration: Option<u64>,
    /// estimatedShortsViews
    #[serde(rename = "vesv", skip_serializing_if = "Option::is_none")]
    pub estimated_shorts_views: Option<u64>,
    /// shortsViewsPercentage
    #[serde(rename = "vsvp", skip_serializing_if = "Option::is_none")]
    pub shorts_views_percentage: Option<f64>,
    /// estimatedLongformViews
    #[serde(rename = "velv", skip_serializing_if = "Option::is_none")]
    pub estimated_longform_views: Option<u64>,
    /// longformViewsPercentage
    #[serde(rename = "vlvp", skip_serializing_if = "Option::is_none")]
    pub longform_views_percentage: Option<f64>,
}

impl DerivedMetrics {
    /// Whether the given metric was computed.
    #[must_use]
    pub fn has(&self, field: DerivedField) -> bool {
        match field {
            DerivedField::AverageViewsPerVideo => self.average_views_per_video.is_some(),
            DerivedField::SubscribersPerVideo => self.subscribers_per_video.is_some(),
            DerivedField::ViewsPerSubscriber => self.views_per_subscriber.is_some(),
            DerivedField::ChannelAgeInDays => self.channel_age_in_days.is_some(),
            DerivedField::UploadsPerWeek => self.uploads_per_week.is_some(),
            DerivedField::SubsGainedPerDay => self.subs_gained_per_day.is_some(),
            DerivedField::ViewsGainedPerDay => self.views_gained_per_day.is_some(),
            DerivedField::SubsGainedPerMonth => self.subs_gained_per_month.is_some(),
            DerivedField::SubsGainedPerYear => self.subs_gained_per_year.is_some(),
            DerivedField::ViralIndex => self.viral_index.is_some(),
            DerivedField::ShortsCount => self.shorts_count.is_some(),
            DerivedField::LongformCount => self.longform_count.is_some(),
            DerivedField::TotalShortsDuration => self.total_shorts_duration.is_some(),
            DerivedField::EstimatedShortsViews => self.estimated_shorts_views.is_some(),
            DerivedField::ShortsViewsPercentage => self.shorts_views_percentage.is_some(),
            DerivedField::EstimatedLongformViews => self.estimated_longform_views.is_some(),
            DerivedField::LongformViewsPercentage => self.longform_views_percentage.is_some(),
        }
    }
}

/// Unrounded values that later metrics reuse.
///
/// Keeping these explicit (rather than relying on statement order) is what
/// lets `subsGainedPerMonth`/`subsGainedPerYear` extrapolate from the exact
/// daily rate instead of the rounded one.
#[derive(Debug, Default)]
struct Intermediates {
    channel_age_days: Option<i64>,
    subs_gained_per_day_raw: Option<f64>,
    estimated_shorts_views: Option<u64>,
}

/// Compute the requested derived metrics from one raw snapshot.
///
/// `now` is injected so tests can pin the clock.
///
/// # Errors
///
/// Returns [`MetricsError::CrawlArtifact`] when the snapshot carries zero
/// views AND zero videos — such a snapshot is an upstream crawl failure and
/// must not be persisted.
pub fn compute(
    raw: &RawSnapshot,
    published_at: Option<DateTime<Utc>>,
    shorts: Option<ShortsAggregate>,
    requested: &BTreeSet<DerivedField>,
    now: DateTime<Utc>,
) -> Result<DerivedMetrics, MetricsError> {
    let subscriber_count = raw.subscriber_count_u64();
    let view_count = raw.view_count_u64();
    let video_count = raw.video_count_u64();

    if view_count == Some(0) && video_count == Some(0) {
        return Err(MetricsError::CrawlArtifact);
    }

    let req = |f: DerivedField| requested.contains(&f);
    let mut metrics = DerivedMetrics::default();
    let mut inter = Intermediates::default();

    // 1. averageViewsPerVideo
    if req(DerivedField::AverageViewsPerVideo) {
        if let (Some(views), Some(videos)) = (nonzero(view_count), nonzero(video_count)) {
            metrics.average_views_per_video = Some(round_u64(ratio(views, videos)));
        }
    }

    // 2. subscribersPerVideo (subscriber conversion rate)
    if req(DerivedField::SubscribersPerVideo) {
        if let (Some(subs), Some(views)) = (nonzero(subscriber_count), nonzero(view_count)) {
            metrics.subscribers_per_video = Some(round_to(ratio(subs, views) * 100.0, 4));
        }
    }

    // 3. viewsPerSubscriber
    if req(DerivedField::ViewsPerSubscriber) {
        if let (Some(views), Some(subs)) = (nonzero(view_count), nonzero(subscriber_count)) {
            metrics.views_per_subscriber = Some(round_to(ratio(views, subs) * 100.0, 2));
        }
    }

    // 4. channelAgeInDays — the base for 5–9.
    if req(DerivedField::ChannelAgeInDays) {
        if let Some(published) = published_at {
            let age_days = (now - published).num_days();
            inter.channel_age_days = Some(age_days);
            metrics.channel_age_in_days = Some(age_days);
        }
    }

    // A channel published today has age 0; age-rate metrics are omitted
    // rather than divided by zero.
    let positive_age = inter.channel_age_days.filter(|d| *d > 0);

    // 5. uploadsPerWeek
    if req(DerivedField::UploadsPerWeek) {
        if let (Some(videos), Some(age)) = (nonzero(video_count), positive_age) {
            #[allow(clippy::cast_precision_loss)]
            let weeks = age as f64 / 7.0;
            #[allow(clippy::cast_precision_loss)]
            let per_week = videos as f64 / weeks;
            metrics.uploads_per_week = Some(round_to(per_week, 2));
        }
    }

    // 6. subsGainedPerDay — unrounded value retained for 8 and 9.
    if req(DerivedField::SubsGainedPerDay) {
        if let (Some(subs), Some(age)) = (nonzero(subscriber_count), positive_age) {
            #[allow(clippy::cast_precision_loss)]
            let per_day = subs as f64 / age as f64;
            inter.subs_gained_per_day_raw = Some(per_day);
            metrics.subs_gained_per_day = Some(round_u64(per_day));
        }
    }

    // 7. viewsGainedPerDay
    if req(DerivedField::ViewsGainedPerDay) {
        if let (Some(views), Some(age)) = (nonzero(view_count), positive_age) {
            #[allow(clippy::cast_precision_loss)]
            let per_day = views as f64 / age as f64;
            metrics.views_gained_per_day = Some(round_u64(per_day));
        }
    }

    // 8. subsGainedPerMonth
    if req(DerivedField::SubsGainedPerMonth) {
        if let Some(per_day) = inter.subs_gained_per_day_raw {
            metrics.subs_gained_per_month = Some(round_u64(per_day * DAYS_PER_MONTH));
        }
    }

    // 9. subsGainedPerYear
    if req(DerivedField::SubsGainedPerYear) {
        if let Some(per_day) = inter.subs_gained_per_day_raw {
            metrics.subs_gained_per_year = Some(round_u64(per_day * DAYS_PER_YEAR));
        }
    }

    // 10. viralIndex
    if req(DerivedField::ViralIndex) {
        if let (Some(subs), Some(views), Some(videos)) = (
            nonzero(subscriber_count),
            nonzero(view_count),
            nonzero(video_count),
        ) {
            let conversion_rate_percent = ratio(subs, views) * 100.0;
            let avg_views_per_video = ratio(views, videos);
            metrics.viral_index = Some(round_u64(
                conversion_rate_percent * 100.0 + avg_views_per_video / 1_000_000.0,
            ));
        }
    }

    // 11. shortsCount — pass-through from the scan.
    if req(DerivedField::ShortsCount) {
        if let Some(agg) = shorts {
            metrics.shorts_count = Some(agg.shorts_count);
        }
    }

    // 12. longformCount — only the scanned prefix is classified.
    if req(DerivedField::LongformCount) {
        if let (Some(videos), Some(agg)) = (nonzero(video_count), shorts) {
            let analyzed = videos.min(SHORTS_SCAN_CAP);
            #[allow(clippy::cast_possible_wrap)]
            let longform = analyzed as i64 - agg.shorts_count as i64;
            metrics.longform_count = Some(longform);
        }
    }

    // 13. totalShortsDuration
    if req(DerivedField::TotalShortsDuration) {
        if let Some(agg) = shorts {
            metrics.total_shorts_duration = Some(agg.shorts_count * SECONDS_PER_SHORT);
        }
    }

    // 14. estimatedShortsViews — the base for 15–17.
    if req(DerivedField::EstimatedShortsViews) {
        if let Some(agg) = shorts {
            inter.estimated_shorts_views = Some(agg.total_shorts_views);
            metrics.estimated_shorts_views = Some(agg.total_shorts_views);
        }
    }

    // 15. shortsViewsPercentage
    if req(DerivedField::ShortsViewsPercentage) {
        if let (Some(views), Some(esv)) = (nonzero(view_count), inter.estimated_shorts_views) {
            metrics.shorts_views_percentage = Some(round_to(ratio(esv, views) * 100.0, 2));
        }
    }

    // 16. estimatedLongformViews
    if req(DerivedField::EstimatedLongformViews) {
        if let (Some(views), Some(esv)) = (nonzero(view_count), inter.estimated_shorts_views) {
            metrics.estimated_longform_views = Some(views.saturating_sub(esv));
        }
    }

    // 17. longformViewsPercentage
    if req(DerivedField::LongformViewsPercentage) {
        if let (Some(views), Some(elv)) = (nonzero(view_count), metrics.estimated_longform_views) {
            metrics.longform_views_percentage = Some(round_to(ratio(elv, views) * 100.0, 2));
        }
    }

    Ok(metrics)
}

/// A zero count gates every metric that would use it, as numerator or
/// denominator, so fold it into absence.
fn nonzero(count: Option<u64>) -> Option<u64> {
    count.filter(|v| *v > 0)
}

#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: u64, denominator: u64) -> f64 {
    numerator as f64 / denominator as f64
}

/// Round half away from zero to the nearest integer.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_u64(value: f64) -> u64 {
    value.round().max(0.0) as u64
}

/// Round to `digits` decimal places.
fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10_f64.powi(i32::try_from(digits).unwrap_or(0));
    (value * factor).round() / factor
}
