pub mod document;
pub mod error;
pub mod history;
pub mod index;
pub mod persist;
pub mod store;

pub use document::{
    ChannelDocument, DailyViewsEntry, DocumentMetadata, DocumentStatic, StoredSnapshot,
    SubscriberHistoryEntry, WeeklyViewsEntry,
};
pub use error::StoreError;
pub use index::{ChannelIndex, IndexEntry};
pub use persist::{upsert_channel, ChannelUpsert};
pub use store::{DirStore, DocumentStore, MemoryStore};
