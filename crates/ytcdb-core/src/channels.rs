use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One tracked channel from `config/channels.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelEntry {
    /// Canonical channel id (`UC…`).
    pub id: String,
    /// Human-readable label for logs; the API title is authoritative.
    pub label: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelsFile {
    pub channels: Vec<ChannelEntry>,
}

/// Load and validate the tracked-channel roster from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_channels(path: &Path) -> Result<ChannelsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ChannelsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let channels_file: ChannelsFile = serde_yaml::from_str(&content)?;

    validate_channels(&channels_file)?;

    Ok(channels_file)
}

fn validate_channels(channels_file: &ChannelsFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for entry in &channels_file.channels {
        let id = entry.id.trim();
        if id.is_empty() {
            return Err(ConfigError::Validation(
                "channel id must be non-empty".to_string(),
            ));
        }
        if !id.starts_with("UC") {
            return Err(ConfigError::Validation(format!(
                "channel id '{id}' does not look like a canonical UC… id"
            )));
        }
        if !seen.insert(id.to_string()) {
            return Err(ConfigError::Validation(format!(
                "duplicate channel id: '{id}'"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str) -> ChannelEntry {
        ChannelEntry {
            id: id.to_string(),
            label: None,
        }
    }

    #[test]
    fn validate_accepts_canonical_ids() {
        let file = ChannelsFile {
            channels: vec![entry("UCX6OQ3DkcsbYNE6H8uQQuVA"), entry("UCBR8-60-B28hp2BmDPdntcQ")],
        };
        assert!(validate_channels(&file).is_ok());
    }

    #[test]
    fn validate_rejects_empty_id() {
        let file = ChannelsFile {
            channels: vec![entry("  ")],
        };
        let err = validate_channels(&file).unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn validate_rejects_non_uc_id() {
        let file = ChannelsFile {
            channels: vec![entry("@mrbeast")],
        };
        let err = validate_channels(&file).unwrap_err();
        assert!(err.to_string().contains("canonical"));
    }

    #[test]
    fn validate_rejects_duplicate_id() {
        let file = ChannelsFile {
            channels: vec![
                entry("UCX6OQ3DkcsbYNE6H8uQQuVA"),
                entry("UCX6OQ3DkcsbYNE6H8uQQuVA"),
            ],
        };
        let err = validate_channels(&file).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn parse_yaml_roster() {
        let yaml = r"
channels:
  - id: UCX6OQ3DkcsbYNE6H8uQQuVA
    label: MrBeast
  - id: UCBR8-60-B28hp2BmDPdntcQ
";
        let file: ChannelsFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(file.channels.len(), 2);
        assert_eq!(file.channels[0].label.as_deref(), Some("MrBeast"));
        assert!(file.channels[1].label.is_none());
        assert!(validate_channels(&file).is_ok());
    }
}
