//! Playback probe port
//!
//! Probing checks that an artifact would play; playing it is a separate call.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::EncodedArtifact;

/// Result of probing an artifact
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// Metadata loaded; the artifact is playable
    Ready(Duration),
    /// Decode or playback setup failed
    Failed(String),
}

impl ProbeOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Errors that can occur during playback
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Artifact is not playable: {0}")]
    NotPlayable(String),

    #[error("Audio device not available: {0}")]
    DeviceNotAvailable(String),

    #[error("Playback failed: {0}")]
    PlaybackFailed(String),
}

/// Port trait for artifact validation and preview playback
#[async_trait]
pub trait PlaybackProbe: Send + Sync {
    /// Load metadata without producing audible output
    async fn probe(&self, artifact: &EncodedArtifact) -> ProbeOutcome;

    /// Probe, then play to completion
    async fn play(&self, artifact: &EncodedArtifact) -> Result<(), ProbeError>;
}
