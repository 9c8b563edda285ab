use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub youtube_api_key: String,
    pub data_dir: PathBuf,
    pub log_level: String,
    pub channels_path: PathBuf,
    pub request_timeout_secs: u64,
    pub inter_channel_delay_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub shorts_scan_limit: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("youtube_api_key", &"[redacted]")
            .field("data_dir", &self.data_dir)
            .field("log_level", &self.log_level)
            .field("channels_path", &self.channels_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("inter_channel_delay_ms", &self.inter_channel_delay_ms)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("shorts_scan_limit", &self.shorts_scan_limit)
            .finish()
    }
}
