use thiserror::Error;

/// Errors from the derived-metrics engine.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// The snapshot reported zero views AND zero videos — the signature of a
    /// failed upstream crawl, not a legitimately empty channel. The caller
    /// must skip persistence for this channel.
    #[error("crawl artifact: snapshot has zero views and zero videos")]
    CrawlArtifact,
}
