//! Encoder infrastructure module
//!
//! `TimesliceEncoder` drives a chunk encoder from a PCM source and emits one
//! segment per timeslice plus a final one when the source closes.

mod flac;
mod wav;

use std::time::Duration as StdDuration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::application::ports::{CaptureEvent, EncodeError, EncoderSession, MediaEncoder};
use crate::domain::recording::codec::FLAC;
use crate::domain::recording::{Codec, Duration, EncodedSegment, PcmChunk, PcmFormat};

pub use flac::{encode_to_flac, FlacChunkEncoder};
pub use wav::WavChunkEncoder;

/// Incremental encoder for one session
pub trait ChunkEncoder: Send {
    fn push(&mut self, samples: &[f32]) -> Result<(), EncodeError>;

    /// Bytes ready for emission; may be empty
    fn take_ready(&mut self) -> Vec<u8>;

    /// Flush everything still buffered
    fn finish(self: Box<Self>) -> Result<Vec<u8>, EncodeError>;
}

/// Platform encoder. WAV streams per timeslice; FLAC, when enabled, is
/// emitted once on finish.
#[derive(Debug, Clone)]
pub struct TimesliceEncoder {
    timeslice: StdDuration,
    buffered_codecs: bool,
}

impl TimesliceEncoder {
    /// Streaming-only encoder for live capture
    pub fn new(timeslice: Duration) -> Self {
        Self {
            timeslice: timeslice.as_std().max(StdDuration::from_millis(1)),
            buffered_codecs: false,
        }
    }

    /// Encoder for offline rendering, where single-segment output is fine
    pub fn offline() -> Self {
        Self {
            buffered_codecs: true,
            ..Self::new(Duration::default_timeslice())
        }
    }

    fn resolve(&self, codec: &Codec) -> Result<Codec, EncodeError> {
        if codec.is_unspecified() {
            return Ok(Codec::wav());
        }
        if self.is_type_supported(codec) {
            return Ok(codec.clone());
        }
        Err(EncodeError::UnsupportedCodec(codec.to_string()))
    }
}

impl Default for TimesliceEncoder {
    fn default() -> Self {
        Self::new(Duration::default_timeslice())
    }
}

impl MediaEncoder for TimesliceEncoder {
    fn is_type_supported(&self, codec: &Codec) -> bool {
        codec.is_wav() || (self.buffered_codecs && codec.mime_type() == FLAC)
    }

    fn start(
        &self,
        codec: &Codec,
        format: PcmFormat,
        source: mpsc::Receiver<PcmChunk>,
    ) -> Result<EncoderSession, EncodeError> {
        let codec = self.resolve(codec)?;
        let encoder: Box<dyn ChunkEncoder> = if codec.is_wav() {
            Box::new(WavChunkEncoder::new(format)?)
        } else {
            Box::new(FlacChunkEncoder::new(format)?)
        };

        let (events_tx, events) = mpsc::unbounded_channel();
        debug!(%codec, %format, timeslice_ms = self.timeslice.as_millis() as u64, "encoder started");
        tokio::spawn(run_encoder(
            encoder,
            codec.clone(),
            source,
            self.timeslice,
            events_tx,
        ));
        Ok(EncoderSession { codec, events })
    }
}

async fn run_encoder(
    mut encoder: Box<dyn ChunkEncoder>,
    codec: Codec,
    mut source: mpsc::Receiver<PcmChunk>,
    timeslice: StdDuration,
    events: mpsc::UnboundedSender<CaptureEvent>,
) {
    let emit = |bytes: Vec<u8>| {
        if !bytes.is_empty() {
            let _ = events.send(CaptureEvent::Segment(EncodedSegment::new(bytes, codec.clone())));
        }
    };

    let mut ticker = time::interval_at(Instant::now() + timeslice, timeslice);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            chunk = source.recv() => match chunk {
                Some(samples) => {
                    if let Err(e) = encoder.push(&samples) {
                        warn!(error = %e, "encoder rejected samples");
                        let _ = events.send(CaptureEvent::Error(e.to_string()));
                    }
                }
                None => break,
            },
            _ = ticker.tick() => emit(encoder.take_ready()),
        }
    }

    match encoder.finish() {
        Ok(bytes) => emit(bytes),
        Err(e) => {
            let _ = events.send(CaptureEvent::Error(e.to_string()));
        }
    }
}
