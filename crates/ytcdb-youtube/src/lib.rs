pub mod client;
pub mod discover;
pub mod duration;
pub mod error;
mod normalize;
mod retry;
pub mod types;
mod videos;

pub use client::{ChannelParts, YoutubeClient};
pub use discover::DiscoverSort;
pub use duration::parse_iso8601_duration;
pub use error::YoutubeError;
