//! Buffered FLAC encoder
//!
//! FLAC frames cannot be emitted per timeslice without a valid STREAMINFO,
//! so all samples are buffered and encoded into one stream on finish.

use flacenc::bitsink::ByteSink;
use flacenc::component::BitRepr;
use flacenc::config;
use flacenc::error::Verify;
use flacenc::source::MemSource;

use crate::application::ports::EncodeError;
use crate::domain::recording::PcmFormat;

use super::wav::to_i16;
use super::ChunkEncoder;

/// Bits per sample (16-bit audio)
const BITS_PER_SAMPLE: usize = 16;

pub struct FlacChunkEncoder {
    format: PcmFormat,
    samples: Vec<i32>,
}

impl FlacChunkEncoder {
    pub fn new(format: PcmFormat) -> Result<Self, EncodeError> {
        if format.channels == 0 || format.sample_rate == 0 {
            return Err(EncodeError::Init(format!("invalid PCM format {}", format)));
        }
        Ok(Self {
            format,
            samples: Vec::new(),
        })
    }
}

impl ChunkEncoder for FlacChunkEncoder {
    fn push(&mut self, samples: &[f32]) -> Result<(), EncodeError> {
        self.samples.extend(samples.iter().map(|&s| to_i16(s) as i32));
        Ok(())
    }

    fn take_ready(&mut self) -> Vec<u8> {
        Vec::new()
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>, EncodeError> {
        encode_to_flac(&self.samples, self.format)
    }
}

/// Encode interleaved 16-bit samples to a FLAC stream.
///
/// Returns no bytes for empty input.
pub fn encode_to_flac(samples: &[i32], format: PcmFormat) -> Result<Vec<u8>, EncodeError> {
    if samples.is_empty() {
        return Ok(Vec::new());
    }

    let config = config::Encoder::default()
        .into_verified()
        .map_err(|(_, e)| EncodeError::Init(format!("FLAC config: {:?}", e)))?;

    let source = MemSource::from_samples(
        samples,
        format.channels as usize,
        BITS_PER_SAMPLE,
        format.sample_rate as usize,
    );

    let stream = flacenc::encode_with_fixed_block_size(&config, source, config.block_size)
        .map_err(|e| EncodeError::Encode(format!("FLAC: {:?}", e)))?;

    let mut sink = ByteSink::new();
    stream
        .write(&mut sink)
        .map_err(|e| EncodeError::Encode(format!("FLAC write: {}", e)))?;

    Ok(sink.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_silence() {
        let silence = vec![0i32; 16000];
        let flac = encode_to_flac(&silence, PcmFormat::new(16000, 1)).unwrap();
        assert!(flac.len() > 50);
        assert_eq!(&flac[0..4], b"fLaC");
    }

    #[test]
    fn encode_stereo_sine_compresses() {
        let rate = 48000;
        let samples: Vec<i32> = (0..rate as usize)
            .flat_map(|i| {
                let t = i as f32 / rate as f32;
                let s = (f32::sin(2.0 * std::f32::consts::PI * 440.0 * t) * 16000.0) as i32;
                [s, s]
            })
            .collect();

        let flac = encode_to_flac(&samples, PcmFormat::new(rate, 2)).unwrap();
        assert_eq!(&flac[0..4], b"fLaC");
        assert!(flac.len() < samples.len() * 2);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(encode_to_flac(&[], PcmFormat::new(16000, 1)).unwrap().is_empty());
    }

    #[test]
    fn chunk_encoder_emits_only_on_finish() {
        let mut enc = Box::new(FlacChunkEncoder::new(PcmFormat::new(16000, 1)).unwrap());
        enc.push(&[0.1; 1600]).unwrap();
        assert!(enc.take_ready().is_empty());
        assert_eq!(&enc.finish().unwrap()[0..4], b"fLaC");
    }
}
