//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::recording::codec::{self, Codec};
use crate::domain::recording::Duration;

/// Default render rate for compositions
pub const DEFAULT_RENDER_SAMPLE_RATE: u32 = 48000;

/// Composition settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComposeConfig {
    pub codec: Option<String>,
    pub sample_rate: Option<u32>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub codecs: Option<String>,
    pub timeslice: Option<String>,
    pub max_duration: Option<String>,
    pub metadata_timeout: Option<String>,
    pub state_dir: Option<String>,
    pub outbox_dir: Option<String>,
    pub compose: Option<ComposeConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            codecs: Some(
                codec::default_preferences()
                    .iter()
                    .map(Codec::as_str)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            timeslice: Some(Duration::default_timeslice().to_string()),
            max_duration: Some(Duration::max_message().to_string()),
            metadata_timeout: Some(Duration::default_metadata_timeout().to_string()),
            state_dir: None,
            outbox_dir: None,
            compose: Some(ComposeConfig {
                codec: Some(codec::FLAC.to_string()),
                sample_rate: Some(DEFAULT_RENDER_SAMPLE_RATE),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            codecs: other.codecs.or(self.codecs),
            timeslice: other.timeslice.or(self.timeslice),
            max_duration: other.max_duration.or(self.max_duration),
            metadata_timeout: other.metadata_timeout.or(self.metadata_timeout),
            state_dir: other.state_dir.or(self.state_dir),
            outbox_dir: other.outbox_dir.or(self.outbox_dir),
            compose: Self::merge_compose_config(self.compose, other.compose),
        }
    }

    fn merge_compose_config(
        base: Option<ComposeConfig>,
        other: Option<ComposeConfig>,
    ) -> Option<ComposeConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(ComposeConfig {
                codec: o.codec.or(b.codec),
                sample_rate: o.sample_rate.or(b.sample_rate),
            }),
        }
    }

    /// Capture preference list; unparseable entries are skipped
    pub fn codecs_or_default(&self) -> Vec<Codec> {
        let parsed: Vec<Codec> = self
            .codecs
            .as_deref()
            .map(parse_codec_list)
            .unwrap_or_default();
        if parsed.is_empty() {
            codec::default_preferences()
        } else {
            parsed
        }
    }

    pub fn timeslice_or_default(&self) -> Duration {
        self.timeslice
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_timeslice)
    }

    /// Longest allowed recording, never above the relay limit
    pub fn max_duration_or_default(&self) -> Duration {
        self.max_duration
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::max_message)
            .min(Duration::max_message())
    }

    pub fn metadata_timeout_or_default(&self) -> Duration {
        self.metadata_timeout
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_metadata_timeout)
    }

    /// Checkpoint directory, falling back to the platform data dir
    pub fn state_dir_or_default(&self) -> PathBuf {
        self.state_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| default_data_dir().join("sessions"))
    }

    /// Upload outbox directory, falling back to the platform data dir
    pub fn outbox_dir_or_default(&self) -> PathBuf {
        self.outbox_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| default_data_dir().join("outbox"))
    }

    /// Output codec for compositions
    pub fn compose_codec_or_default(&self) -> Codec {
        self.compose
            .as_ref()
            .and_then(|c| c.codec.as_deref())
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Codec::flac)
    }

    pub fn render_sample_rate_or_default(&self) -> u32 {
        self.compose
            .as_ref()
            .and_then(|c| c.sample_rate)
            .filter(|rate| *rate > 0)
            .unwrap_or(DEFAULT_RENDER_SAMPLE_RATE)
    }
}

/// Parse a comma-separated codec list, dropping invalid entries
pub fn parse_codec_list(input: &str) -> Vec<Codec> {
    input
        .split(',')
        .filter_map(|s| s.parse::<Codec>().ok())
        .collect()
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from(".local/share"))
        .join("voxrelay")
}
