//! Domain error types

use thiserror::Error;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration format: \"{input}\". Expected <number>ms, <number>s, <number>m or a combination (e.g., 500ms, 3s, 2m30s)")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when a codec identifier cannot be parsed
#[derive(Debug, Clone, Error)]
#[error("Invalid codec: \"{input}\". Expected a MIME type such as audio/wav or audio/webm;codecs=opus")]
pub struct CodecParseError {
    pub input: String,
}

/// Error when decoded channel data does not form a valid track
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTrack {
    #[error("Track has no channels")]
    NoChannels,

    #[error("Track sample rate must be positive")]
    ZeroSampleRate,

    #[error("Channel {channel} has {actual} frames, expected {expected}")]
    RaggedChannels {
        channel: usize,
        expected: usize,
        actual: usize,
    },
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
