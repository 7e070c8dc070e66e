//! Dotted config keys and their validation
//!
//! Shared by `config set` and by the store when it loads a hand-edited file.

use super::app_config::parse_codec_list;
use super::{AppConfig, ComposeConfig};
use crate::domain::error::ConfigError;
use crate::domain::recording::codec::{FLAC, WAV};
use crate::domain::recording::{Codec, Duration};

/// Every settable key, in listing order
pub const CONFIG_KEYS: &[&str] = &[
    "codecs",
    "timeslice",
    "max_duration",
    "metadata_timeout",
    "state_dir",
    "outbox_dir",
    "compose.codec",
    "compose.sample_rate",
];

const MIN_SAMPLE_RATE: u32 = 8000;
const MAX_SAMPLE_RATE: u32 = 192_000;

pub fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        key: key.to_string(),
        message: message.into(),
    }
}

/// String form of a key's current value, if set
pub fn read_value(config: &AppConfig, key: &str) -> Option<String> {
    let compose = config.compose.as_ref();
    match key {
        "codecs" => config.codecs.clone(),
        "timeslice" => config.timeslice.clone(),
        "max_duration" => config.max_duration.clone(),
        "metadata_timeout" => config.metadata_timeout.clone(),
        "state_dir" => config.state_dir.clone(),
        "outbox_dir" => config.outbox_dir.clone(),
        "compose.codec" => compose.and_then(|c| c.codec.clone()),
        "compose.sample_rate" => compose.and_then(|c| c.sample_rate).map(|r| r.to_string()),
        _ => None,
    }
}

/// Set a key from its string form. The value is not validated here.
pub fn apply_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let value = value.trim().to_string();
    match key {
        "codecs" => config.codecs = Some(value),
        "timeslice" => config.timeslice = Some(value),
        "max_duration" => config.max_duration = Some(value),
        "metadata_timeout" => config.metadata_timeout = Some(value),
        "state_dir" => config.state_dir = Some(value),
        "outbox_dir" => config.outbox_dir = Some(value),
        "compose.codec" => {
            config.compose.get_or_insert_with(ComposeConfig::default).codec = Some(value)
        }
        "compose.sample_rate" => {
            let rate = parse_sample_rate(key, &value)?;
            config
                .compose
                .get_or_insert_with(ComposeConfig::default)
                .sample_rate = Some(rate);
        }
        _ => return Err(invalid(key, "Unknown key")),
    }
    Ok(())
}

/// Unset a key. An emptied `[compose]` table is removed.
pub fn clear_value(config: &mut AppConfig, key: &str) {
    match key {
        "codecs" => config.codecs = None,
        "timeslice" => config.timeslice = None,
        "max_duration" => config.max_duration = None,
        "metadata_timeout" => config.metadata_timeout = None,
        "state_dir" => config.state_dir = None,
        "outbox_dir" => config.outbox_dir = None,
        "compose.codec" | "compose.sample_rate" => {
            if let Some(compose) = config.compose.as_mut() {
                if key == "compose.codec" {
                    compose.codec = None;
                } else {
                    compose.sample_rate = None;
                }
                if compose.codec.is_none() && compose.sample_rate.is_none() {
                    config.compose = None;
                }
            }
        }
        _ => {}
    }
}

/// Validate a value based on key type
pub fn validate_value(key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "timeslice" | "max_duration" | "metadata_timeout" => {
            let duration = value
                .parse::<Duration>()
                .map_err(|e| invalid(key, e.to_string()))?;
            if key == "max_duration" && duration > Duration::max_message() {
                return Err(invalid(
                    key,
                    format!("Must not exceed {}", Duration::max_message()),
                ));
            }
        }
        "codecs" => {
            if parse_codec_list(value).is_empty() {
                return Err(invalid(key, "Expected a comma-separated list of MIME types"));
            }
        }
        "compose.codec" => {
            let codec = value
                .parse::<Codec>()
                .map_err(|e| invalid(key, e.to_string()))?;
            if !matches!(codec.mime_type(), FLAC | WAV) {
                return Err(invalid(
                    key,
                    format!("Invalid value '{}'. Valid options: {}, {}", value, FLAC, WAV),
                ));
            }
        }
        "compose.sample_rate" => {
            parse_sample_rate(key, value)?;
        }
        "state_dir" | "outbox_dir" => {
            if value.trim().is_empty() {
                return Err(invalid(key, "Path must not be empty"));
            }
        }
        _ => {}
    }
    Ok(())
}

/// Unset every key whose value fails validation, returning the errors
pub fn drop_invalid(config: &mut AppConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    for key in CONFIG_KEYS {
        let Some(value) = read_value(config, key) else {
            continue;
        };
        if let Err(e) = validate_value(key, &value) {
            clear_value(config, key);
            errors.push(e);
        }
    }
    errors
}

fn parse_sample_rate(key: &str, value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(rate) if (MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&rate) => Ok(rate),
        _ => Err(invalid(
            key,
            format!(
                "Sample rate must be between {} and {}",
                MIN_SAMPLE_RATE, MAX_SAMPLE_RATE
            ),
        )),
    }
}
