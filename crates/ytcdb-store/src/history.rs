//! Rolling-window history maintenance.
//!
//! Four independent sub-algorithms, each keyed by channel id and each with
//! its own retention and refresh cadence: daily views (7 entries, one per
//! calendar day), weekly views (4 entries, a new one only once the last
//! window is at least 7 days old), monthly subscriber counts (5 entries),
//! and recent thumbnails (full replacement, handled at fetch time).
//!
//! The merge cores are pure — prior state and today's date come in as
//! arguments — and the store-reading wrappers around them treat any failure
//! to load prior state as "no history yet": a broken document seeds a fresh
//! window instead of aborting the channel's cycle.

use chrono::{Days, NaiveDate};
use tracing::warn;

use crate::document::{
    ChannelDocument, DailyViewsEntry, StoredSnapshot, SubscriberHistoryEntry, WeeklyViewsEntry,
};
use crate::store::DocumentStore;

const DAILY_CAP: usize = 7;
const WEEKLY_CAP: usize = 4;
const SUBSCRIBER_CAP: usize = 5;

/// Days a weekly window must span before a new entry is due.
const WEEKLY_GAP_DAYS: i64 = 7;

const DATE_FORMAT: &str = "%Y-%m-%d";
const MONTH_FORMAT: &str = "%Y-%m";

/// Merge today's view total into the daily window, reading prior state from
/// the store. Load failures fall back to the seed case.
pub async fn daily_views_history<S: DocumentStore>(
    store: &S,
    channel_id: &str,
    today: NaiveDate,
    current_views: u64,
) -> Vec<DailyViewsEntry> {
    let prior = load_prior(store, channel_id).await;
    merge_daily(prior.as_ref(), today, current_views)
}

/// Merge today's view total into the weekly window, reading prior state
/// from the store. Load failures fall back to the seed case.
pub async fn weekly_views_history<S: DocumentStore>(
    store: &S,
    channel_id: &str,
    today: NaiveDate,
    current_views: u64,
) -> Vec<WeeklyViewsEntry> {
    let prior = load_prior(store, channel_id).await;
    merge_weekly(prior.as_ref(), today, current_views)
}

/// Merge this month's subscriber count into the monthly window, reading
/// prior state from the store. Load failures fall back to the seed case.
pub async fn subscriber_history<S: DocumentStore>(
    store: &S,
    channel_id: &str,
    today: NaiveDate,
    current_count: &str,
) -> Vec<SubscriberHistoryEntry> {
    let prior = load_prior(store, channel_id).await;
    let month = today.format(MONTH_FORMAT).to_string();
    merge_subscriber(prior.as_ref(), &month, current_count)
}

async fn load_prior<S: DocumentStore>(store: &S, channel_id: &str) -> Option<ChannelDocument> {
    match store.load(channel_id).await {
        Ok(doc) => doc,
        Err(e) => {
            warn!(
                channel_id,
                error = %e,
                "failed to load prior document; treating as no history"
            );
            None
        }
    }
}

/// Daily window merge (cap 7, key = calendar date).
///
/// Today's entry replaces any existing entry for the same date, so re-running
/// within one day is idempotent. The increase is diffed against the most
/// recent remaining day. When the document predates daily tracking the
/// window is first synthesized from its legacy snapshot list.
#[must_use]
pub fn merge_daily(
    prior: Option<&ChannelDocument>,
    today: NaiveDate,
    current_views: u64,
) -> Vec<DailyViewsEntry> {
    let today_str = today.format(DATE_FORMAT).to_string();

    let Some(doc) = prior else {
        return vec![DailyViewsEntry {
            date: today_str,
            total_views: current_views.to_string(),
            daily_increase: "0".to_string(),
        }];
    };

    let mut history = doc.daily_views_history.clone();
    if history.is_empty() && !doc.snapshots.is_empty() {
        history = synthesize_daily_from_snapshots(&doc.snapshots);
    }

    history.retain(|entry| entry.date != today_str);

    // Diff against the most recent prior day. With no prior day there is
    // nothing to diff, same as the seed case — anything else would make a
    // same-day re-run produce a different increase than the first run.
    let daily_increase = history
        .iter()
        .max_by(|a, b| a.date.cmp(&b.date))
        .map_or(0, |entry| {
            signed(current_views) - entry.total_views.parse::<i64>().unwrap_or(0)
        });

    history.push(DailyViewsEntry {
        date: today_str,
        total_views: current_views.to_string(),
        daily_increase: daily_increase.to_string(),
    });

    history.sort_by(|a, b| b.date.cmp(&a.date));
    history.truncate(DAILY_CAP);
    history
}

/// Rebuild a daily window from legacy per-day snapshots, oldest to newest,
/// diffing consecutive view counts.
fn synthesize_daily_from_snapshots(snapshots: &[StoredSnapshot]) -> Vec<DailyViewsEntry> {
    let mut sorted: Vec<&StoredSnapshot> = snapshots.iter().collect();
    sorted.sort_by(|a, b| a.ts.cmp(&b.ts));

    let mut entries = Vec::with_capacity(sorted.len());
    let mut previous: Option<i64> = None;
    for snapshot in sorted {
        let total_views = snapshot
            .view_count
            .clone()
            .unwrap_or_else(|| "0".to_string());
        let total = total_views.parse::<i64>().unwrap_or(0);
        let increase = previous.map_or(0, |p| total - p);
        entries.push(DailyViewsEntry {
            // ISO timestamps order lexicographically; the date is the prefix.
            date: snapshot.ts.chars().take(10).collect(),
            total_views,
            daily_increase: increase.to_string(),
        });
        previous = Some(total);
    }
    entries
}

/// Weekly window merge (cap 4).
///
/// A new entry is appended only when at least 7 days have passed since the
/// most recent entry's end date; a smaller gap returns the history
/// unchanged — a deliberate "not yet due" no-op, not a failure.
#[must_use]
pub fn merge_weekly(
    prior: Option<&ChannelDocument>,
    today: NaiveDate,
    current_views: u64,
) -> Vec<WeeklyViewsEntry> {
    let today_str = today.format(DATE_FORMAT).to_string();
    let seed = |today_str: String| {
        let week_ago = today
            .checked_sub_days(Days::new(7))
            .unwrap_or(today)
            .format(DATE_FORMAT)
            .to_string();
        vec![WeeklyViewsEntry {
            start_date: week_ago,
            end_date: today_str,
            total_views: current_views.to_string(),
            weekly_increase: "0".to_string(),
        }]
    };

    let Some(doc) = prior else {
        return seed(today_str);
    };
    let history = &doc.weekly_views_history;
    if history.is_empty() {
        return seed(today_str);
    }

    let last = &history[0];
    let Ok(last_end) = NaiveDate::parse_from_str(&last.end_date, DATE_FORMAT) else {
        warn!(
            end_date = %last.end_date,
            "unparseable weekly endDate; leaving history unchanged"
        );
        return history.clone();
    };

    if (today - last_end).num_days() < WEEKLY_GAP_DAYS {
        return history.clone();
    }

    let previous_total = last.total_views.parse::<i64>().unwrap_or(0);
    let weekly_increase = signed(current_views) - previous_total;

    let mut merged = Vec::with_capacity(WEEKLY_CAP);
    merged.push(WeeklyViewsEntry {
        start_date: last.end_date.clone(),
        end_date: today_str,
        total_views: current_views.to_string(),
        weekly_increase: weekly_increase.to_string(),
    });
    merged.extend(history.iter().take(WEEKLY_CAP - 1).cloned());
    merged
}

/// Monthly subscriber merge (cap 5, key = `YYYY-MM`).
///
/// A second run within the same calendar month overwrites that month's
/// count in place; a new month prepends.
#[must_use]
pub fn merge_subscriber(
    prior: Option<&ChannelDocument>,
    month: &str,
    current_count: &str,
) -> Vec<SubscriberHistoryEntry> {
    let new_entry = SubscriberHistoryEntry {
        month: month.to_string(),
        count: current_count.to_string(),
    };

    let Some(doc) = prior else {
        return vec![new_entry];
    };

    let mut history = doc.subscriber_history.clone();
    if let Some(existing) = history.iter_mut().find(|entry| entry.month == month) {
        existing.count = current_count.to_string();
    } else {
        history.insert(0, new_entry);
        history.truncate(SUBSCRIBER_CAP);
    }
    history
}

/// View counts fit comfortably in i64; saturate rather than wrap on the
/// absurd.
fn signed(views: u64) -> i64 {
    i64::try_from(views).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentStatic;
    use crate::store::MemoryStore;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn empty_doc() -> ChannelDocument {
        ChannelDocument {
            channel_id: "UCtest".to_string(),
            static_data: DocumentStatic::default(),
            snapshots: Vec::new(),
            subscriber_history: Vec::new(),
            daily_views_history: Vec::new(),
            weekly_views_history: Vec::new(),
            recent_thumbnails_history: Vec::new(),
            metadata: None,
        }
    }

    fn daily(date: &str, total: &str, increase: &str) -> DailyViewsEntry {
        DailyViewsEntry {
            date: date.to_string(),
            total_views: total.to_string(),
            daily_increase: increase.to_string(),
        }
    }

    fn weekly(start: &str, end: &str, total: &str, increase: &str) -> WeeklyViewsEntry {
        WeeklyViewsEntry {
            start_date: start.to_string(),
            end_date: end.to_string(),
            total_views: total.to_string(),
            weekly_increase: increase.to_string(),
        }
    }

    // ---- daily ----

    #[test]
    fn daily_seeds_with_zero_increase_when_no_prior_document() {
        let merged = merge_daily(None, date("2025-08-06"), 50_000);
        assert_eq!(merged, vec![daily("2025-08-06", "50000", "0")]);
    }

    #[test]
    fn daily_appends_with_increase_over_most_recent_day() {
        let mut doc = empty_doc();
        doc.daily_views_history = vec![
            daily("2025-08-05", "49000", "400"),
            daily("2025-08-04", "48600", "300"),
        ];
        let merged = merge_daily(Some(&doc), date("2025-08-06"), 50_000);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0], daily("2025-08-06", "50000", "1000"));
        assert_eq!(merged[1].date, "2025-08-05");
    }

    #[test]
    fn daily_merge_is_idempotent_within_a_day() {
        let mut doc = empty_doc();
        doc.daily_views_history = vec![
            daily("2025-08-05", "900", "100"),
            daily("2025-08-04", "800", "100"),
            daily("2025-08-03", "700", "100"),
            daily("2025-08-02", "600", "100"),
            daily("2025-08-01", "500", "100"),
            daily("2025-07-31", "400", "100"),
            daily("2025-07-30", "300", "100"),
        ];

        let first = merge_daily(Some(&doc), date("2025-08-06"), 1_000);
        doc.daily_views_history = first.clone();
        let second = merge_daily(Some(&doc), date("2025-08-06"), 1_000);

        assert_eq!(first, second, "same-day re-run must replace, not duplicate");
        assert_eq!(first.len(), DAILY_CAP);
        assert_eq!(first[0], daily("2025-08-06", "1000", "100"));
    }

    #[test]
    fn daily_window_is_capped_at_seven_newest_first() {
        let mut doc = empty_doc();
        doc.daily_views_history = vec![
            daily("2025-08-05", "700", "0"),
            daily("2025-08-04", "600", "0"),
            daily("2025-08-03", "500", "0"),
            daily("2025-08-02", "400", "0"),
            daily("2025-08-01", "300", "0"),
            daily("2025-07-31", "200", "0"),
            daily("2025-07-30", "100", "0"),
        ];
        let merged = merge_daily(Some(&doc), date("2025-08-06"), 800);
        assert_eq!(merged.len(), DAILY_CAP);
        assert_eq!(merged[0].date, "2025-08-06");
        assert_eq!(merged[DAILY_CAP - 1].date, "2025-07-31", "oldest day evicted");
    }

    #[test]
    fn daily_increase_may_be_negative() {
        let mut doc = empty_doc();
        doc.daily_views_history = vec![daily("2025-08-05", "50000", "0")];
        let merged = merge_daily(Some(&doc), date("2025-08-06"), 49_000);
        assert_eq!(merged[0].daily_increase, "-1000");
    }

    #[test]
    fn daily_synthesizes_from_legacy_snapshots_when_window_is_empty() {
        let mut doc = empty_doc();
        doc.snapshots = vec![
            StoredSnapshot {
                ts: "2025-08-02T10:00:00.000Z".to_string(),
                view_count: Some("300".to_string()),
                ..StoredSnapshot::default()
            },
            StoredSnapshot {
                ts: "2025-08-01T10:00:00.000Z".to_string(),
                view_count: Some("100".to_string()),
                ..StoredSnapshot::default()
            },
        ];
        let merged = merge_daily(Some(&doc), date("2025-08-03"), 500);
        assert_eq!(merged.len(), 3);
        // Newest first; increases diff consecutive snapshots oldest→newest.
        assert_eq!(merged[0], daily("2025-08-03", "500", "200"));
        assert_eq!(merged[1], daily("2025-08-02", "300", "200"));
        assert_eq!(merged[2], daily("2025-08-01", "100", "0"));
    }

    #[test]
    fn daily_with_prior_doc_but_no_history_seeds_zero_increase() {
        let doc = empty_doc();
        let merged = merge_daily(Some(&doc), date("2025-08-06"), 4_200);
        assert_eq!(merged, vec![daily("2025-08-06", "4200", "0")]);
    }

    #[test]
    fn daily_rerun_on_the_seed_day_reproduces_the_seed() {
        let seeded = merge_daily(None, date("2025-08-06"), 4_200);
        let mut doc = empty_doc();
        doc.daily_views_history = seeded.clone();
        let rerun = merge_daily(Some(&doc), date("2025-08-06"), 4_200);
        assert_eq!(rerun, seeded);
    }

    #[test]
    fn daily_rerun_at_the_cap_is_still_idempotent() {
        // The eviction of the oldest day must not change what today's
        // increase is diffed against on a re-run.
        let mut doc = empty_doc();
        doc.daily_views_history = vec![
            daily("2025-08-05", "700", "100"),
            daily("2025-08-04", "600", "100"),
            daily("2025-08-03", "500", "100"),
            daily("2025-08-02", "400", "100"),
            daily("2025-08-01", "300", "100"),
            daily("2025-07-31", "200", "100"),
            daily("2025-07-30", "100", "0"),
        ];
        let first = merge_daily(Some(&doc), date("2025-08-06"), 800);
        doc.daily_views_history = first.clone();
        let second = merge_daily(Some(&doc), date("2025-08-06"), 800);
        assert_eq!(first, second);
        assert_eq!(first[0], daily("2025-08-06", "800", "100"));
    }

    // ---- weekly ----

    #[test]
    fn weekly_seeds_a_window_ending_today_when_no_prior_document() {
        let merged = merge_weekly(None, date("2025-08-06"), 50_000);
        assert_eq!(
            merged,
            vec![weekly("2025-07-30", "2025-08-06", "50000", "0")]
        );
    }

    #[test]
    fn weekly_seeds_when_prior_history_is_empty() {
        let doc = empty_doc();
        let merged = merge_weekly(Some(&doc), date("2025-08-06"), 50_000);
        assert_eq!(merged[0].start_date, "2025-07-30");
    }

    #[test]
    fn weekly_gap_under_seven_days_is_a_no_op() {
        let mut doc = empty_doc();
        doc.weekly_views_history = vec![weekly("2025-07-25", "2025-08-01", "40000", "0")];
        let before = doc.weekly_views_history.clone();
        let merged = merge_weekly(Some(&doc), date("2025-08-06"), 50_000);
        assert_eq!(merged, before, "5-day gap must not add an entry");
    }

    #[test]
    fn weekly_gap_of_exactly_seven_days_appends_one_entry() {
        let mut doc = empty_doc();
        doc.weekly_views_history = vec![weekly("2025-07-23", "2025-07-30", "40000", "0")];
        let merged = merge_weekly(Some(&doc), date("2025-08-06"), 50_000);
        assert_eq!(merged.len(), 2);
        assert_eq!(
            merged[0],
            weekly("2025-07-30", "2025-08-06", "50000", "10000")
        );
        assert_eq!(merged[1].end_date, "2025-07-30");
    }

    #[test]
    fn weekly_window_is_capped_at_four() {
        let mut doc = empty_doc();
        doc.weekly_views_history = vec![
            weekly("2025-07-23", "2025-07-30", "400", "100"),
            weekly("2025-07-16", "2025-07-23", "300", "100"),
            weekly("2025-07-09", "2025-07-16", "200", "100"),
            weekly("2025-07-02", "2025-07-09", "100", "100"),
        ];
        let merged = merge_weekly(Some(&doc), date("2025-08-06"), 500);
        assert_eq!(merged.len(), WEEKLY_CAP);
        assert_eq!(merged[0].end_date, "2025-08-06");
        assert_eq!(merged[WEEKLY_CAP - 1].end_date, "2025-07-16", "oldest week evicted");
    }

    #[test]
    fn weekly_unparseable_end_date_leaves_history_unchanged() {
        let mut doc = empty_doc();
        doc.weekly_views_history = vec![weekly("2025-07-23", "not-a-date", "400", "0")];
        let before = doc.weekly_views_history.clone();
        let merged = merge_weekly(Some(&doc), date("2025-08-06"), 500);
        assert_eq!(merged, before);
    }

    // ---- subscriber ----

    #[test]
    fn subscriber_seeds_when_no_prior_document() {
        let merged = merge_subscriber(None, "2025-08", "1000");
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].month, "2025-08");
        assert_eq!(merged[0].count, "1000");
    }

    #[test]
    fn subscriber_same_month_overwrites_in_place() {
        let mut doc = empty_doc();
        doc.subscriber_history = vec![
            SubscriberHistoryEntry {
                month: "2025-08".to_string(),
                count: "900".to_string(),
            },
            SubscriberHistoryEntry {
                month: "2025-07".to_string(),
                count: "800".to_string(),
            },
        ];
        let merged = merge_subscriber(Some(&doc), "2025-08", "950");
        assert_eq!(merged.len(), 2, "length unchanged on same-month merge");
        assert_eq!(merged[0].count, "950");
        assert_eq!(merged[1].count, "800");
    }

    #[test]
    fn subscriber_new_month_prepends_and_caps_at_five() {
        let mut doc = empty_doc();
        doc.subscriber_history = (3..8)
            .map(|m| SubscriberHistoryEntry {
                month: format!("2025-0{m}"),
                count: format!("{m}00"),
            })
            .collect();
        doc.subscriber_history.reverse(); // newest (2025-07) first
        let merged = merge_subscriber(Some(&doc), "2025-08", "800");
        assert_eq!(merged.len(), SUBSCRIBER_CAP);
        assert_eq!(merged[0].month, "2025-08");
        assert_eq!(merged[SUBSCRIBER_CAP - 1].month, "2025-04", "oldest month evicted");
    }

    // ---- store wrappers ----

    #[tokio::test]
    async fn wrappers_seed_when_prior_document_is_malformed() {
        let store = MemoryStore::new();
        store.seed_raw("UCbroken", "{not valid json");

        let today = date("2025-08-06");
        let merged = daily_views_history(&store, "UCbroken", today, 100).await;
        assert_eq!(merged, vec![daily("2025-08-06", "100", "0")]);

        let merged = weekly_views_history(&store, "UCbroken", today, 100).await;
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].weekly_increase, "0");

        let merged = subscriber_history(&store, "UCbroken", today, "100").await;
        assert_eq!(merged[0].month, "2025-08");
    }

    #[tokio::test]
    async fn wrappers_read_prior_state_through_the_store() {
        let store = MemoryStore::new();
        let mut doc = empty_doc();
        doc.daily_views_history = vec![daily("2025-08-05", "900", "0")];
        store.save(&doc).await.unwrap();

        let merged = daily_views_history(&store, "UCtest", date("2025-08-06"), 1_000).await;
        assert_eq!(merged[0], daily("2025-08-06", "1000", "100"));
        assert_eq!(merged[1].date, "2025-08-05");
    }
}
