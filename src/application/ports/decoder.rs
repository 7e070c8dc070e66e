//! Decoding and metadata ports

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::composition::AudioTrack;

/// Decode errors
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    #[error("Unrecognized audio format: {0}")]
    UnsupportedFormat(String),

    #[error("No audio track found")]
    NoAudioTrack,

    #[error("Corrupt audio stream: {0}")]
    Corrupt(String),

    #[error("Resampling failed: {0}")]
    Resample(String),

    #[error("Decoded at {actual} Hz, expected {expected} Hz")]
    RateMismatch { expected: u32, actual: u32 },
}

/// Port for turning an encoded blob into samples at the render rate
#[async_trait]
pub trait AudioDecoder: Send + Sync {
    /// Rate every decoded track is converted to
    fn target_sample_rate(&self) -> u32;

    async fn decode(&self, bytes: &[u8]) -> Result<AudioTrack, DecodeError>;
}

/// Metadata inspection errors
#[derive(Debug, Clone, Error)]
#[error("Metadata inspection failed: {0}")]
pub struct MetadataError(pub String);

/// Port for reading container-level duration metadata
#[async_trait]
pub trait MetadataReader: Send + Sync {
    /// Duration in seconds as declared by the container, if any
    async fn read_duration(&self, bytes: &[u8]) -> Result<Option<f64>, MetadataError>;
}
