//! The channel index document (`_channel_index.json`).
//!
//! One summary row per known channel, kept in sync best-effort after every
//! successful channel write so the read side can enumerate channels without
//! listing the whole store.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelIndex {
    #[serde(default)]
    pub last_updated: String,
    #[serde(default)]
    pub total_channels: u64,
    #[serde(default)]
    pub channels: Vec<IndexEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub channel_id: String,
    pub title: String,
    /// Present only for channels first seen by this store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_collected: Option<String>,
    pub last_updated: String,
    pub total_snapshots: u64,
}

impl ChannelIndex {
    /// An empty index stamped with `now`.
    #[must_use]
    pub fn new(now: &str) -> Self {
        Self {
            last_updated: now.to_string(),
            total_channels: 0,
            channels: Vec::new(),
        }
    }

    /// Insert or refresh one channel's row and restamp the index.
    ///
    /// An existing row keeps its `title` and `firstCollected`; only
    /// `lastUpdated` and `totalSnapshots` move.
    pub fn upsert(&mut self, entry: IndexEntry, now: &str) {
        if let Some(existing) = self
            .channels
            .iter_mut()
            .find(|c| c.channel_id == entry.channel_id)
        {
            existing.last_updated = entry.last_updated;
            existing.total_snapshots = entry.total_snapshots;
        } else {
            self.channels.push(entry);
        }
        self.total_channels = self.channels.len() as u64;
        self.last_updated = now.to_string();
    }

    /// The channel ids this store already knows, for discovery exclusion.
    #[must_use]
    pub fn channel_ids(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.channel_id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, snapshots: u64) -> IndexEntry {
        IndexEntry {
            channel_id: id.to_string(),
            title: "Channel".to_string(),
            first_collected: Some("2025-01-01T00:00:00.000Z".to_string()),
            last_updated: "2025-08-06T00:00:00.000Z".to_string(),
            total_snapshots: snapshots,
        }
    }

    #[test]
    fn upsert_adds_a_new_channel() {
        let mut index = ChannelIndex::new("2025-08-06T00:00:00.000Z");
        index.upsert(entry("UCa", 1), "2025-08-06T00:00:00.000Z");
        assert_eq!(index.total_channels, 1);
        assert_eq!(index.channels[0].channel_id, "UCa");
    }

    #[test]
    fn upsert_refreshes_existing_row_keeping_first_collected() {
        let mut index = ChannelIndex::new("t0");
        index.upsert(entry("UCa", 1), "t0");

        let mut update = entry("UCa", 2);
        update.first_collected = None;
        update.title = "Renamed".to_string();
        index.upsert(update, "t1");

        assert_eq!(index.total_channels, 1);
        let row = &index.channels[0];
        assert_eq!(row.total_snapshots, 2);
        assert_eq!(row.title, "Channel", "existing title is kept");
        assert!(row.first_collected.is_some(), "firstCollected is kept");
        assert_eq!(index.last_updated, "t1");
    }

    #[test]
    fn channel_ids_lists_every_known_channel() {
        let mut index = ChannelIndex::new("t0");
        index.upsert(entry("UCa", 1), "t0");
        index.upsert(entry("UCb", 1), "t0");
        assert_eq!(index.channel_ids(), vec!["UCa", "UCb"]);
    }
}
