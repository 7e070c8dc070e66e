//! Streaming 16-bit PCM WAV encoder
//!
//! The header is written once, ahead of the first samples, with placeholder
//! sizes. Joining the segments and rewriting those sizes yields a normal
//! WAV file.

use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::application::ports::EncodeError;
use crate::domain::recording::segment::mark_wav_streaming;
use crate::domain::recording::PcmFormat;

use super::ChunkEncoder;

const BITS_PER_SAMPLE: u16 = 16;

pub struct WavChunkEncoder {
    header: Option<Vec<u8>>,
    pending: Vec<u8>,
}

impl WavChunkEncoder {
    pub fn new(format: PcmFormat) -> Result<Self, EncodeError> {
        Ok(Self {
            header: Some(streaming_header(format)?),
            pending: Vec::new(),
        })
    }
}

impl ChunkEncoder for WavChunkEncoder {
    fn push(&mut self, samples: &[f32]) -> Result<(), EncodeError> {
        self.pending.reserve(samples.len() * 2);
        for &s in samples {
            self.pending.extend_from_slice(&to_i16(s).to_le_bytes());
        }
        Ok(())
    }

    fn take_ready(&mut self) -> Vec<u8> {
        if self.pending.is_empty() {
            return Vec::new();
        }
        let mut out = self.header.take().unwrap_or_default();
        out.append(&mut self.pending);
        out
    }

    fn finish(mut self: Box<Self>) -> Result<Vec<u8>, EncodeError> {
        Ok(self.take_ready())
    }
}

/// Header-only WAV with streaming placeholder sizes
fn streaming_header(format: PcmFormat) -> Result<Vec<u8>, EncodeError> {
    if format.channels == 0 || format.sample_rate == 0 {
        return Err(EncodeError::Init(format!("invalid PCM format {}", format)));
    }
    let spec = WavSpec {
        channels: format.channels,
        sample_rate: format.sample_rate,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let writer =
        WavWriter::new(&mut cursor, spec).map_err(|e| EncodeError::Init(e.to_string()))?;
    writer
        .finalize()
        .map_err(|e| EncodeError::Init(e.to_string()))?;

    let mut header = cursor.into_inner();
    mark_wav_streaming(&mut header);
    Ok(header)
}

pub(crate) fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0) as i16
}
