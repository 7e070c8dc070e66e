//! Symphonia-backed decoder and metadata reader

use std::io::Cursor;

use async_trait::async_trait;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::application::ports::{AudioDecoder, DecodeError, MetadataError, MetadataReader};
use crate::domain::composition::AudioTrack;
use crate::domain::config::app_config::DEFAULT_RENDER_SAMPLE_RATE;

use super::resample::resample;

/// Decodes any container symphonia can probe, then resamples to the render rate
pub struct SymphoniaDecoder {
    target_rate: u32,
}

impl SymphoniaDecoder {
    pub fn new(target_rate: u32) -> Self {
        Self { target_rate }
    }
}

impl Default for SymphoniaDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_RENDER_SAMPLE_RATE)
    }
}

#[async_trait]
impl AudioDecoder for SymphoniaDecoder {
    fn target_sample_rate(&self) -> u32 {
        self.target_rate
    }

    async fn decode(&self, bytes: &[u8]) -> Result<AudioTrack, DecodeError> {
        let bytes = bytes.to_vec();
        let target = self.target_rate;
        tokio::task::spawn_blocking(move || decode_blocking(bytes, target))
            .await
            .map_err(|e| DecodeError::Corrupt(format!("decode task: {}", e)))?
    }
}

fn open(bytes: Vec<u8>) -> Result<Box<dyn FormatReader>, SymphoniaError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());
    let probed = symphonia::default::get_probe().format(
        &Hint::new(),
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    Ok(probed.format)
}

fn decode_blocking(bytes: Vec<u8>, target_rate: u32) -> Result<AudioTrack, DecodeError> {
    let mut format = open(bytes).map_err(|e| DecodeError::UnsupportedFormat(e.to_string()))?;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoAudioTrack)?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&params, &DecoderOptions::default())
        .map_err(|e| DecodeError::UnsupportedFormat(e.to_string()))?;

    let mut channels: Vec<Vec<f32>> =
        vec![Vec::new(); params.channels.map(|c| c.count()).unwrap_or(0)];
    let mut source_rate = params.sample_rate.unwrap_or(0);

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(DecodeError::Corrupt(e.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(msg)) => {
                warn!(error = msg, "skipping undecodable packet");
                continue;
            }
            Err(e) => return Err(DecodeError::Corrupt(e.to_string())),
        };

        let spec = *decoded.spec();
        let count = spec.channels.count();
        source_rate = spec.rate;
        if channels.len() != count {
            if channels.iter().any(|c| !c.is_empty()) {
                return Err(DecodeError::Corrupt("channel layout changed mid-stream".into()));
            }
            channels = vec![Vec::new(); count];
        }

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        for frame in buffer.samples().chunks(count) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }
    }

    if channels.is_empty() {
        return Err(DecodeError::NoAudioTrack);
    }
    if source_rate == 0 {
        return Err(DecodeError::Corrupt("unknown sample rate".into()));
    }

    debug!(
        frames = channels[0].len(),
        channels = channels.len(),
        source_rate,
        target_rate,
        "decoded track"
    );

    let channels = resample(channels, source_rate, target_rate)?;
    AudioTrack::new(channels, target_rate).map_err(|e| DecodeError::Corrupt(e.to_string()))
}

/// Reads the container's declared frame count
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaMetadataReader;

impl SymphoniaMetadataReader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MetadataReader for SymphoniaMetadataReader {
    async fn read_duration(&self, bytes: &[u8]) -> Result<Option<f64>, MetadataError> {
        let bytes = bytes.to_vec();
        tokio::task::spawn_blocking(move || {
            let format = open(bytes).map_err(|e| MetadataError(e.to_string()))?;
            let Some(track) = format
                .tracks()
                .iter()
                .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            else {
                return Ok(None);
            };
            let params = &track.codec_params;
            Ok(match (params.n_frames, params.sample_rate) {
                (Some(frames), Some(rate)) if rate > 0 => Some(frames as f64 / rate as f64),
                _ => None,
            })
        })
        .await
        .map_err(|e| MetadataError(format!("metadata task: {}", e)))?
    }
}
