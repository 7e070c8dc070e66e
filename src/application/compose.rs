//! Audio composition use case
//!
//! Decodes a preamble and an original message, concatenates them on one
//! timeline, renders interleaved samples and re-encodes them through a
//! regular encoder session fed from the rendered buffer.

use std::fmt;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::composition::{AudioTrack, CompositionPlan};
use crate::domain::recording::{Codec, EncodedArtifact, EncodedSegment};

use super::codec::negotiate_codec;
use super::ports::{AudioDecoder, CaptureEvent, DecodeError, EncodeError, MediaEncoder};

/// Which input of a composition failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackRole {
    Preamble,
    Original,
}

impl fmt::Display for TrackRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preamble => write!(f, "preamble"),
            Self::Original => write!(f, "original message"),
        }
    }
}

/// Errors from the compose use case. No partial artifact accompanies any of them.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Failed to decode {which}: {source}")]
    DecodeFailed {
        which: TrackRole,
        source: DecodeError,
    },

    #[error("Re-encoding produced no audio")]
    EmptyComposition,

    #[error("Encoder failed to start: {0}")]
    Encoder(#[from] EncodeError),

    #[error("Encoder failed during composition: {0}")]
    EncodeFailed(String),
}

impl ComposeError {
    pub fn user_message(&self) -> String {
        match self {
            Self::DecodeFailed { which, .. } => {
                format!("Could not process the {}. The file may be damaged.", which)
            }
            Self::EmptyComposition => {
                "The combined recording came out empty. Record a longer message.".to_string()
            }
            Self::Encoder(_) | Self::EncodeFailed(_) => {
                "Could not process recording.".to_string()
            }
        }
    }
}

/// Configuration for the composer
#[derive(Debug, Clone)]
pub struct ComposerConfig {
    /// Ordered output codec preferences
    pub codecs: Vec<Codec>,
    /// Frames per chunk fed to the encoder
    pub chunk_frames: usize,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            codecs: vec![Codec::flac(), Codec::wav()],
            chunk_frames: 4096,
        }
    }
}

/// A re-encoded composition and its timeline facts
#[derive(Debug, Clone)]
pub struct ComposedArtifact {
    pub artifact: EncodedArtifact,
    /// Sum of the input durations, not re-measured from the output bytes
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub channels: usize,
    pub frame_count: usize,
}

/// Compose use case
pub struct AudioComposer<D, E>
where
    D: AudioDecoder,
    E: MediaEncoder,
{
    decoder: D,
    encoder: E,
    config: ComposerConfig,
}

impl<D, E> AudioComposer<D, E>
where
    D: AudioDecoder,
    E: MediaEncoder,
{
    pub fn new(decoder: D, encoder: E, config: ComposerConfig) -> Self {
        Self {
            decoder,
            encoder,
            config,
        }
    }

    /// Combine `preamble` then `original` into one encoded artifact.
    pub async fn compose(
        &self,
        preamble: &[u8],
        original: &[u8],
    ) -> Result<ComposedArtifact, ComposeError> {
        let (preamble, original) =
            tokio::join!(self.decoder.decode(preamble), self.decoder.decode(original));
        let render_rate = self.decoder.target_sample_rate();
        let preamble = at_render_rate(preamble, render_rate, TrackRole::Preamble)?;
        let original = at_render_rate(original, render_rate, TrackRole::Original)?;

        let plan = CompositionPlan::new(preamble, original, render_rate);
        debug!(
            preamble_frames = plan.preamble().frame_count(),
            original_frames = plan.original().frame_count(),
            sample_rate = plan.sample_rate(),
            channels = plan.channel_count(),
            "composition plan built"
        );

        let rendered = plan.concatenate().render();
        let codec = negotiate_codec(&self.config.codecs, &self.encoder);

        let chunk_len = self.config.chunk_frames.max(1) * plan.channel_count().max(1);
        let (tx, source) = mpsc::channel(8);
        let mut session = self.encoder.start(&codec, rendered.format, source)?;

        for chunk in rendered.samples.chunks(chunk_len) {
            if tx.send(chunk.to_vec()).await.is_err() {
                warn!("encoder stopped accepting rendered audio early");
                break;
            }
        }
        drop(tx);

        let mut segments: Vec<EncodedSegment> = Vec::new();
        while let Some(event) = session.events.recv().await {
            match event {
                CaptureEvent::Segment(segment) if !segment.is_empty() => segments.push(segment),
                CaptureEvent::Segment(_) => {}
                CaptureEvent::Error(message) => return Err(ComposeError::EncodeFailed(message)),
            }
        }

        if segments.is_empty() {
            return Err(ComposeError::EmptyComposition);
        }

        let artifact = EncodedArtifact::assemble(session.codec, &segments);
        info!(
            codec = %artifact.codec(),
            size = %artifact.human_readable_size(),
            duration_secs = plan.duration_secs(),
            "composition encoded"
        );

        Ok(ComposedArtifact {
            artifact,
            duration_secs: plan.duration_secs(),
            sample_rate: plan.sample_rate(),
            channels: plan.channel_count(),
            frame_count: plan.frame_count(),
        })
    }
}

/// Accept a decoded track only if it already sits on the render rate
fn at_render_rate(
    decoded: Result<AudioTrack, DecodeError>,
    render_rate: u32,
    which: TrackRole,
) -> Result<AudioTrack, ComposeError> {
    let track = decoded.map_err(|source| ComposeError::DecodeFailed { which, source })?;
    if track.sample_rate() != render_rate {
        return Err(ComposeError::DecodeFailed {
            which,
            source: DecodeError::RateMismatch {
                expected: render_rate,
                actual: track.sample_rate(),
            },
        });
    }
    Ok(track)
}
