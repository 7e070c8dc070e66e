//! Capture and encoder port interfaces

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::recording::{Codec, EncodedSegment, PcmChunk, PcmFormat};

/// Capture device errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Microphone permission denied: {0}")]
    PermissionDenied(String),

    #[error("No audio input device available")]
    NoInputDevice,

    #[error("Failed to open input stream: {0}")]
    StreamFailed(String),

    #[error("Input stream source was already taken")]
    SourceTaken,
}

/// Encoder errors
#[derive(Debug, Clone, Error)]
pub enum EncodeError {
    #[error("Unsupported codec: {0}")]
    UnsupportedCodec(String),

    #[error("Encoder initialization failed: {0}")]
    Init(String),

    #[error("Encoding failed: {0}")]
    Encode(String),
}

/// Output of an encoder session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// A timeslice (or the final flush) produced this segment
    Segment(EncodedSegment),
    /// The encoder hit a fault; the session keeps its current state
    Error(String),
}

/// A running encoder: the codec it actually emits plus its event stream
#[derive(Debug)]
pub struct EncoderSession {
    pub codec: Codec,
    pub events: mpsc::UnboundedReceiver<CaptureEvent>,
}

/// A live input held by exactly one recording session.
pub trait InputStream: Send {
    /// Sample layout delivered by the source
    fn format(&self) -> PcmFormat;

    /// Take the PCM receiver. Returns `None` once taken.
    fn take_source(&mut self) -> Option<mpsc::Receiver<PcmChunk>>;

    /// Gate delivery without releasing the device
    fn set_paused(&self, paused: bool);

    /// Stop all tracks and close the source. Idempotent.
    fn release(&mut self);
}

/// Port for acquiring the capture device
#[async_trait]
pub trait AudioInput: Send + Sync {
    /// Acquire the default input.
    ///
    /// # Returns
    /// A started stream, or an error if permission is denied or no device exists
    async fn acquire(&self) -> Result<Box<dyn InputStream>, CaptureError>;
}

/// Port for the platform encoder.
///
/// An encoder session drains `source`, emits a segment every timeslice and a
/// final one when the source closes, then closes the event channel. The
/// returned codec is the one tagged on every segment; an unspecified request
/// resolves to the encoder's own default.
pub trait MediaEncoder: Send + Sync {
    fn is_type_supported(&self, codec: &Codec) -> bool;

    fn start(
        &self,
        codec: &Codec,
        format: PcmFormat,
        source: mpsc::Receiver<PcmChunk>,
    ) -> Result<EncoderSession, EncodeError>;
}
