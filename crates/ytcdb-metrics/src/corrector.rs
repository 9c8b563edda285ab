//! Consistency correction for the shorts/longform view split.
//!
//! A bucket that contains at least one video must never display a literal
//! 0 % view share: a rounded-down share would misread as "this channel has
//! no shorts (or longform) views at all". The corrector floors the affected
//! share at ε = 1 % and re-derives the absolute view estimates from the
//! adjusted split.

use tracing::debug;

use crate::engine::DerivedMetrics;

/// Minimum nonzero share, in percent.
const EPSILON: f64 = 1.0;

/// Apply the share-floor rules in place. Returns `true` when either rule fired.
///
/// Rule A: `longform_count >= 1` with a 0 % longform share floors the
/// longform share. Rule B is the symmetric shorts-side rule, checked second
/// against the possibly already-corrected snapshot. The two guards are
/// disjoint in practice (both shares cannot round to zero at once).
pub fn correct(metrics: &mut DerivedMetrics, view_count: u64) -> bool {
    let mut applied = false;

    // Rule A: longform videos exist but the longform share rounded to 0 %.
    if metrics.longform_count.is_some_and(|c| c >= 1)
        && metrics.longform_views_percentage == Some(0.0)
    {
        metrics.longform_views_percentage = Some(EPSILON);
        metrics.shorts_views_percentage = Some(100.0 - EPSILON);
        let shorts_views = share_of(view_count, 100.0 - EPSILON);
        metrics.estimated_shorts_views = Some(shorts_views);
        metrics.estimated_longform_views = Some(view_count.saturating_sub(shorts_views));
        debug!("longform share floored to {EPSILON}%");
        applied = true;
    }

    // Rule B: shorts exist but the shorts share rounded to 0 %.
    if metrics.shorts_count.is_some_and(|c| c >= 1)
        && metrics.shorts_views_percentage == Some(0.0)
    {
        metrics.shorts_views_percentage = Some(EPSILON);
        metrics.longform_views_percentage = Some(100.0 - EPSILON);
        let longform_views = share_of(view_count, 100.0 - EPSILON);
        metrics.estimated_longform_views = Some(longform_views);
        metrics.estimated_shorts_views = Some(view_count.saturating_sub(longform_views));
        debug!("shorts share floored to {EPSILON}%");
        applied = true;
    }

    applied
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn share_of(view_count: u64, percentage: f64) -> u64 {
    (view_count as f64 * percentage / 100.0).round().max(0.0) as u64
}
