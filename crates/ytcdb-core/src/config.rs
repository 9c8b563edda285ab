use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let youtube_api_key = require("YTCDB_YOUTUBE_API_KEY")?;

    let data_dir = PathBuf::from(or_default("YTCDB_DATA_DIR", "./data"));
    let log_level = or_default("YTCDB_LOG_LEVEL", "info");
    let channels_path = PathBuf::from(or_default("YTCDB_CHANNELS_PATH", "./config/channels.yaml"));

    let request_timeout_secs = parse_u64("YTCDB_REQUEST_TIMEOUT_SECS", "30")?;
    let inter_channel_delay_ms = parse_u64("YTCDB_INTER_CHANNEL_DELAY_MS", "1000")?;
    let max_retries = parse_u32("YTCDB_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("YTCDB_RETRY_BACKOFF_BASE_MS", "1000")?;
    let shorts_scan_limit = parse_usize("YTCDB_SHORTS_SCAN_LIMIT", "1000")?;

    Ok(AppConfig {
        youtube_api_key,
        data_dir,
        log_level,
        channels_path,
        request_timeout_secs,
        inter_channel_delay_ms,
        max_retries,
        retry_backoff_base_ms,
        shorts_scan_limit,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    /// Returns a map with all required env vars populated with valid defaults.
    fn full_env<'a>() -> HashMap<&'a str, &'a str> {
        let mut m = HashMap::new();
        m.insert("YTCDB_YOUTUBE_API_KEY", "test-api-key");
        m
    }

    #[test]
    fn build_app_config_fails_without_api_key() {
        let map: HashMap<&str, &str> = HashMap::new();
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "YTCDB_YOUTUBE_API_KEY"),
            "expected MissingEnvVar(YTCDB_YOUTUBE_API_KEY), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_succeeds_with_all_required_vars() {
        let map = full_env();
        let result = build_app_config(lookup_from_map(&map));
        assert!(result.is_ok(), "expected Ok, got: {result:?}");
        let cfg = result.unwrap();
        assert_eq!(cfg.youtube_api_key, "test-api-key");
        assert_eq!(cfg.data_dir.to_string_lossy(), "./data");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.inter_channel_delay_ms, 1000);
        assert_eq!(cfg.max_retries, 3);
        assert_eq!(cfg.retry_backoff_base_ms, 1000);
        assert_eq!(cfg.shorts_scan_limit, 1000);
    }

    #[test]
    fn inter_channel_delay_override() {
        let mut map = full_env();
        map.insert("YTCDB_INTER_CHANNEL_DELAY_MS", "250");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.inter_channel_delay_ms, 250);
    }

    #[test]
    fn inter_channel_delay_invalid() {
        let mut map = full_env();
        map.insert("YTCDB_INTER_CHANNEL_DELAY_MS", "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "YTCDB_INTER_CHANNEL_DELAY_MS"),
            "expected InvalidEnvVar(YTCDB_INTER_CHANNEL_DELAY_MS), got: {result:?}"
        );
    }

    #[test]
    fn max_retries_override() {
        let mut map = full_env();
        map.insert("YTCDB_MAX_RETRIES", "5");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.max_retries, 5);
    }

    #[test]
    fn max_retries_invalid() {
        let mut map = full_env();
        map.insert("YTCDB_MAX_RETRIES", "many");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "YTCDB_MAX_RETRIES"),
            "expected InvalidEnvVar(YTCDB_MAX_RETRIES), got: {result:?}"
        );
    }

    #[test]
    fn data_dir_override() {
        let mut map = full_env();
        map.insert("YTCDB_DATA_DIR", "/var/lib/ytcdb");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.data_dir.to_string_lossy(), "/var/lib/ytcdb");
    }

    #[test]
    fn shorts_scan_limit_override() {
        let mut map = full_env();
        map.insert("YTCDB_SHORTS_SCAN_LIMIT", "500");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.shorts_scan_limit, 500);
    }

    #[test]
    fn debug_redacts_api_key() {
        let map = full_env();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(
            !rendered.contains("test-api-key"),
            "Debug output must not leak the API key: {rendered}"
        );
        assert!(rendered.contains("[redacted]"));
    }
}
