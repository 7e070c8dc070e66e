//! Rodio-based playback probe
//!
//! Probing opens a decoder on the artifact bytes and reads its duration; no
//! output device is touched. Playing goes through the same decoder.

use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use rodio::{Decoder, OutputStream, Sink, Source};
use tracing::debug;

use crate::application::ports::{PlaybackProbe, ProbeError, ProbeOutcome};
use crate::domain::recording::EncodedArtifact;

/// Playback probe implementation using rodio
pub struct RodioProbe;

impl RodioProbe {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RodioProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlaybackProbe for RodioProbe {
    async fn probe(&self, artifact: &EncodedArtifact) -> ProbeOutcome {
        let bytes = artifact.bytes().to_vec();
        match tokio::task::spawn_blocking(move || probe_sync(bytes)).await {
            Ok(outcome) => outcome,
            Err(e) => ProbeOutcome::Failed(format!("probe task: {}", e)),
        }
    }

    async fn play(&self, artifact: &EncodedArtifact) -> Result<(), ProbeError> {
        if let ProbeOutcome::Failed(reason) = self.probe(artifact).await {
            return Err(ProbeError::NotPlayable(reason));
        }
        let bytes = artifact.bytes().to_vec();
        tokio::task::spawn_blocking(move || play_sync(bytes))
            .await
            .map_err(|e| ProbeError::PlaybackFailed(format!("Task join error: {}", e)))?
    }
}

/// Load metadata, counting samples when the container declares no length
fn probe_sync(bytes: Vec<u8>) -> ProbeOutcome {
    if bytes.is_empty() {
        return ProbeOutcome::Failed("artifact is empty".into());
    }
    let decoder = match Decoder::new(Cursor::new(bytes)) {
        Ok(d) => d,
        Err(e) => return ProbeOutcome::Failed(e.to_string()),
    };

    let duration = match decoder.total_duration() {
        Some(d) => d,
        None => {
            let channels = decoder.channels().max(1) as u64;
            let rate = decoder.sample_rate().max(1) as u64;
            let frames = decoder.count() as u64 / channels;
            Duration::from_secs_f64(frames as f64 / rate as f64)
        }
    };

    if duration.is_zero() {
        return ProbeOutcome::Failed("artifact has no audio".into());
    }
    debug!(duration_ms = duration.as_millis() as u64, "artifact probed");
    ProbeOutcome::Ready(duration)
}

fn play_sync(bytes: Vec<u8>) -> Result<(), ProbeError> {
    let (_stream, handle) =
        OutputStream::try_default().map_err(|e| ProbeError::DeviceNotAvailable(e.to_string()))?;
    let sink = Sink::try_new(&handle).map_err(|e| ProbeError::PlaybackFailed(e.to_string()))?;
    let source =
        Decoder::new(Cursor::new(bytes)).map_err(|e| ProbeError::NotPlayable(e.to_string()))?;
    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}
