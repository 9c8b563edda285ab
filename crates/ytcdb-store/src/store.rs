//! The document-store interface and its two implementations.
//!
//! The store is injected into the history mergers and the persistence path,
//! scoped to one batch run — no process-wide file caches. [`DirStore`] keeps
//! one pretty-printed `<channelId>.json` per channel plus
//! `_channel_index.json`; [`MemoryStore`] backs tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::document::ChannelDocument;
use crate::error::StoreError;
use crate::index::ChannelIndex;

const INDEX_FILE: &str = "_channel_index.json";

/// Find/read/write primitives over persisted channel documents.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// Load a channel's document, `None` when the channel is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the document exists but cannot be read
    /// or parsed.
    async fn load(&self, channel_id: &str) -> Result<Option<ChannelDocument>, StoreError>;

    /// Create or overwrite a channel's document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the document cannot be serialized or
    /// written.
    async fn save(&self, doc: &ChannelDocument) -> Result<(), StoreError>;

    /// Load the channel index, `None` when no index exists yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the index exists but cannot be read or
    /// parsed.
    async fn load_index(&self) -> Result<Option<ChannelIndex>, StoreError>;

    /// Create or overwrite the channel index.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the index cannot be serialized or written.
    async fn save_index(&self, index: &ChannelIndex) -> Result<(), StoreError>;
}

/// Directory-backed store: one JSON file per channel.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Open (creating if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| StoreError::Io {
                path: root.display().to_string(),
                source: e,
            })?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, channel_id: &str) -> PathBuf {
        self.root.join(format!("{channel_id}.json"))
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        path: &Path,
    ) -> Result<Option<T>, StoreError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };
        let parsed = serde_json::from_str(&content).map_err(|e| StoreError::Deserialize {
            context: path.display().to_string(),
            source: e,
        })?;
        Ok(Some(parsed))
    }

    async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
        let content =
            serde_json::to_string_pretty(value).map_err(|e| StoreError::Serialize {
                context: path.display().to_string(),
                source: e,
            })?;
        tokio::fs::write(path, content)
            .await
            .map_err(|e| StoreError::Io {
                path: path.display().to_string(),
                source: e,
            })
    }
}

impl DocumentStore for DirStore {
    async fn load(&self, channel_id: &str) -> Result<Option<ChannelDocument>, StoreError> {
        Self::read_json(&self.document_path(channel_id)).await
    }

    async fn save(&self, doc: &ChannelDocument) -> Result<(), StoreError> {
        Self::write_json(&self.document_path(&doc.channel_id), doc).await
    }

    async fn load_index(&self) -> Result<Option<ChannelIndex>, StoreError> {
        Self::read_json(&self.root.join(INDEX_FILE)).await
    }

    async fn save_index(&self, index: &ChannelIndex) -> Result<(), StoreError> {
        Self::write_json(&self.root.join(INDEX_FILE), index).await
    }
}

/// In-memory store for tests and dry runs.
///
/// Documents are held as serialized JSON so the full contract — including
/// the snapshot's flattened short keys — is exercised on every round trip.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, String>>,
    index: Mutex<Option<String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored channel documents.
    ///
    /// # Panics
    ///
    /// Panics if the interior lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.lock().expect("store lock poisoned").len()
    }

    /// # Panics
    ///
    /// Panics if the interior lock is poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Seed a raw JSON document, bypassing the typed model — for tests that
    /// need malformed or legacy content.
    ///
    /// # Panics
    ///
    /// Panics if the interior lock is poisoned.
    pub fn seed_raw(&self, channel_id: &str, content: &str) {
        self.documents
            .lock()
            .expect("store lock poisoned")
            .insert(channel_id.to_string(), content.to_string());
    }
}

impl DocumentStore for MemoryStore {
    async fn load(&self, channel_id: &str) -> Result<Option<ChannelDocument>, StoreError> {
        let guard = self.documents.lock().expect("store lock poisoned");
        match guard.get(channel_id) {
            None => Ok(None),
            Some(content) => serde_json::from_str(content)
                .map(Some)
                .map_err(|e| StoreError::Deserialize {
                    context: format!("{channel_id}.json"),
                    source: e,
                }),
        }
    }

    async fn save(&self, doc: &ChannelDocument) -> Result<(), StoreError> {
        let content = serde_json::to_string(doc).map_err(|e| StoreError::Serialize {
            context: format!("{}.json", doc.channel_id),
            source: e,
        })?;
        self.documents
            .lock()
            .expect("store lock poisoned")
            .insert(doc.channel_id.clone(), content);
        Ok(())
    }

    async fn load_index(&self) -> Result<Option<ChannelIndex>, StoreError> {
        let guard = self.index.lock().expect("store lock poisoned");
        match guard.as_ref() {
            None => Ok(None),
            Some(content) => serde_json::from_str(content)
                .map(Some)
                .map_err(|e| StoreError::Deserialize {
                    context: INDEX_FILE.to_string(),
                    source: e,
                }),
        }
    }

    async fn save_index(&self, index: &ChannelIndex) -> Result<(), StoreError> {
        let content = serde_json::to_string(index).map_err(|e| StoreError::Serialize {
            context: INDEX_FILE.to_string(),
            source: e,
        })?;
        *self.index.lock().expect("store lock poisoned") = Some(content);
        Ok(())
    }
}
