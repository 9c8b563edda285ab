//! Batch progress checkpoint, written after every channel so an interrupted
//! run (Ctrl-C, quota exhaustion) resumes where it stopped.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub(crate) const PROGRESS_FILE: &str = "_collect_progress.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CollectProgress {
    /// Channels fully processed; the next run starts at this index.
    pub complete: usize,
    pub total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// Load the checkpoint; a missing or unreadable file means a fresh start.
pub(crate) async fn load(data_dir: &Path) -> CollectProgress {
    let path = data_dir.join(PROGRESS_FILE);
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(progress) => progress,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt progress file; starting fresh");
                CollectProgress::default()
            }
        },
        Err(_) => CollectProgress::default(),
    }
}

/// Write the checkpoint, best-effort: a failure is logged, never fatal.
pub(crate) async fn save(data_dir: &Path, progress: &CollectProgress) {
    let path = data_dir.join(PROGRESS_FILE);
    let content = match serde_json::to_string_pretty(progress) {
        Ok(content) => content,
        Err(e) => {
            warn!(error = %e, "could not serialize progress checkpoint");
            return;
        }
    };
    if let Err(e) = tokio::fs::write(&path, content).await {
        warn!(path = %path.display(), error = %e, "could not write progress checkpoint");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock before epoch")
            .as_nanos();
        let dir =
            std::env::temp_dir().join(format!("ytcdb-progress-{tag}-{}-{nanos}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn missing_file_means_fresh_start() {
        let dir = temp_dir("missing");
        assert_eq!(load(&dir).await, CollectProgress::default());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn checkpoint_round_trips() {
        let dir = temp_dir("roundtrip");
        let progress = CollectProgress {
            complete: 42,
            total: 120,
            last_updated: Some("2025-08-06T12:00:00.000Z".to_string()),
        };
        save(&dir, &progress).await;
        assert_eq!(load(&dir).await, progress);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn corrupt_checkpoint_falls_back_to_default() {
        let dir = temp_dir("corrupt");
        std::fs::write(dir.join(PROGRESS_FILE), "{oops").unwrap();
        assert_eq!(load(&dir).await, CollectProgress::default());
        std::fs::remove_dir_all(&dir).ok();
    }
}
