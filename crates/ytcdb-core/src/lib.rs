use thiserror::Error;

pub mod app_config;
pub mod channels;
pub mod config;
pub mod registry;
pub mod snapshot;

pub use app_config::AppConfig;
pub use channels::{load_channels, ChannelEntry, ChannelsFile};
pub use config::{load_app_config, load_app_config_from_env};
pub use registry::{ApiPart, Bucket, ChannelField, DerivedField, FieldSet};
pub use snapshot::{RawSnapshot, RecentThumbnail, ShortsAggregate, StaticData};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read channels file {path}: {source}")]
    ChannelsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse channels file: {0}")]
    ChannelsFileParse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}
