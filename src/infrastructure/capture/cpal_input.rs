//! Microphone input using cpal
//!
//! `cpal::Stream` is not `Send`, so each acquired stream lives on its own
//! thread. The stream's callback downmixes to mono f32 and pushes chunks into
//! a bounded channel; dropping the stream closes that channel.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::application::ports::{AudioInput, CaptureError, InputStream};
use crate::domain::recording::{PcmChunk, PcmFormat};

/// Speech-optimized capture rate, used when the device supports it
pub const PREFERRED_SAMPLE_RATE: u32 = 16000;

/// Chunks buffered between the device callback and the encoder
const SOURCE_CAPACITY: usize = 64;

/// Default-device microphone input
pub struct CpalInput {
    preferred_rate: u32,
}

impl CpalInput {
    pub fn new() -> Self {
        Self {
            preferred_rate: PREFERRED_SAMPLE_RATE,
        }
    }

    pub fn with_preferred_rate(preferred_rate: u32) -> Self {
        Self { preferred_rate }
    }

    fn input_device() -> Result<cpal::Device, CaptureError> {
        cpal::default_host()
            .default_input_device()
            .ok_or(CaptureError::NoInputDevice)
    }

    /// Pick an i16/f32 config, preferring fewer channels and the preferred rate
    fn input_config(
        device: &cpal::Device,
        preferred_rate: u32,
    ) -> Result<(StreamConfig, SampleFormat), CaptureError> {
        let supported = device.supported_input_configs().map_err(map_device_error)?;

        let mut best: Option<cpal::SupportedStreamConfigRange> = None;
        for config in supported {
            if !matches!(config.sample_format(), SampleFormat::I16 | SampleFormat::F32) {
                continue;
            }
            let includes_preferred = config.min_sample_rate().0 <= preferred_rate
                && config.max_sample_rate().0 >= preferred_rate;
            let is_better = match &best {
                None => true,
                Some(current) => {
                    config.channels() < current.channels()
                        || (includes_preferred && current.min_sample_rate().0 > preferred_rate)
                }
            };
            if is_better {
                best = Some(config);
            }
        }

        let range = best.ok_or_else(|| {
            CaptureError::StreamFailed("no i16 or f32 input configuration".into())
        })?;

        let sample_rate = if range.min_sample_rate().0 <= preferred_rate
            && range.max_sample_rate().0 >= preferred_rate
        {
            SampleRate(preferred_rate)
        } else {
            range.min_sample_rate()
        };

        Ok((
            StreamConfig {
                channels: range.channels(),
                sample_rate,
                buffer_size: cpal::BufferSize::Default,
            },
            range.sample_format(),
        ))
    }
}

impl Default for CpalInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioInput for CpalInput {
    async fn acquire(&self) -> Result<Box<dyn InputStream>, CaptureError> {
        let (ready_tx, ready_rx) = oneshot::channel();
        let (pcm_tx, pcm_rx) = mpsc::channel(SOURCE_CAPACITY);
        let control = Arc::new(StreamControl::default());
        let preferred_rate = self.preferred_rate;

        let thread_control = Arc::clone(&control);
        std::thread::Builder::new()
            .name("voxrelay-capture".into())
            .spawn(move || run_stream(preferred_rate, pcm_tx, thread_control, ready_tx))
            .map_err(|e| CaptureError::StreamFailed(format!("capture thread: {}", e)))?;

        let format = ready_rx
            .await
            .map_err(|_| CaptureError::StreamFailed("capture thread exited".into()))??;
        debug!(%format, "microphone acquired");

        Ok(Box::new(CpalStream {
            format,
            source: Some(pcm_rx),
            control,
        }))
    }
}

#[derive(Default)]
struct StreamControl {
    running: AtomicBool,
    paused: AtomicBool,
    dropped_chunks: AtomicU64,
}

/// Handle to a stream owned by its capture thread
pub struct CpalStream {
    format: PcmFormat,
    source: Option<mpsc::Receiver<PcmChunk>>,
    control: Arc<StreamControl>,
}

impl InputStream for CpalStream {
    fn format(&self) -> PcmFormat {
        self.format
    }

    fn take_source(&mut self) -> Option<mpsc::Receiver<PcmChunk>> {
        self.source.take()
    }

    fn set_paused(&self, paused: bool) {
        self.control.paused.store(paused, Ordering::SeqCst);
    }

    fn release(&mut self) {
        if self.control.running.swap(false, Ordering::SeqCst) {
            let dropped = self.control.dropped_chunks.load(Ordering::Relaxed);
            if dropped > 0 {
                warn!(dropped, "capture chunks dropped while the encoder lagged");
            }
            debug!("microphone released");
        }
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        self.release();
    }
}

/// Body of the capture thread: build, play, park until released
fn run_stream(
    preferred_rate: u32,
    pcm_tx: mpsc::Sender<PcmChunk>,
    control: Arc<StreamControl>,
    ready: oneshot::Sender<Result<PcmFormat, CaptureError>>,
) {
    let (stream, format) = match build_stream(preferred_rate, pcm_tx, Arc::clone(&control)) {
        Ok(built) => built,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    control.running.store(true, Ordering::SeqCst);
    if let Err(e) = stream.play() {
        control.running.store(false, Ordering::SeqCst);
        let _ = ready.send(Err(CaptureError::StreamFailed(e.to_string())));
        return;
    }
    if ready.send(Ok(format)).is_err() {
        control.running.store(false, Ordering::SeqCst);
        return;
    }

    while control.running.load(Ordering::SeqCst) {
        std::thread::sleep(StdDuration::from_millis(50));
    }
    drop(stream);
}

fn build_stream(
    preferred_rate: u32,
    pcm_tx: mpsc::Sender<PcmChunk>,
    control: Arc<StreamControl>,
) -> Result<(cpal::Stream, PcmFormat), CaptureError> {
    let device = CpalInput::input_device()?;
    let (config, sample_format) = CpalInput::input_config(&device, preferred_rate)?;
    let channels = config.channels;
    let format = PcmFormat::new(config.sample_rate.0, 1);

    let on_error = |err: cpal::StreamError| warn!(error = %err, "audio input stream error");

    let stream = match sample_format {
        SampleFormat::I16 => device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                deliver(&control, &pcm_tx, downmix_i16(data, channels));
            },
            on_error,
            None,
        ),
        SampleFormat::F32 => device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                deliver(&control, &pcm_tx, downmix_f32(data, channels));
            },
            on_error,
            None,
        ),
        other => {
            return Err(CaptureError::StreamFailed(format!(
                "unsupported sample format {:?}",
                other
            )))
        }
    }
    .map_err(map_build_error)?;

    Ok((stream, format))
}

fn deliver(control: &StreamControl, tx: &mpsc::Sender<PcmChunk>, chunk: PcmChunk) {
    if !control.running.load(Ordering::SeqCst) || control.paused.load(Ordering::SeqCst) {
        return;
    }
    if tx.try_send(chunk).is_err() {
        control.dropped_chunks.fetch_add(1, Ordering::Relaxed);
    }
}

fn map_device_error(err: impl std::fmt::Display) -> CaptureError {
    classify(err.to_string())
}

fn map_build_error(err: cpal::BuildStreamError) -> CaptureError {
    match err {
        cpal::BuildStreamError::DeviceNotAvailable => CaptureError::NoInputDevice,
        other => classify(other.to_string()),
    }
}

/// Backends report permission problems only as text
fn classify(message: String) -> CaptureError {
    let lower = message.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not authorized") {
        CaptureError::PermissionDenied(message)
    } else {
        CaptureError::StreamFailed(message)
    }
}

/// Average interleaved i16 frames into mono f32
fn downmix_i16(samples: &[i16], channels: u16) -> PcmChunk {
    let channels = channels.max(1) as usize;
    samples
        .chunks(channels)
        .map(|frame| {
            let sum: f32 = frame.iter().map(|&s| s as f32 / 32768.0).sum();
            sum / frame.len() as f32
        })
        .collect()
}

/// Average interleaved f32 frames into mono
fn downmix_f32(samples: &[f32], channels: u16) -> PcmChunk {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels as usize)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_single_channel_is_identity() {
        let mono = vec![0.1f32, -0.2, 0.3];
        assert_eq!(downmix_f32(&mono, 1), mono);
    }

    #[test]
    fn downmix_averages_frames() {
        let stereo = vec![0.5f32, 0.25, -1.0, 1.0];
        assert_eq!(downmix_f32(&stereo, 2), vec![0.375, 0.0]);
    }

    #[test]
    fn downmix_i16_scales_to_unit_range() {
        let stereo = vec![16384i16, 16384, -32768, -32768];
        assert_eq!(downmix_i16(&stereo, 2), vec![0.5, -1.0]);
    }

    #[test]
    fn permission_messages_are_classified() {
        assert!(matches!(
            classify("Permission denied (os error 13)".into()),
            CaptureError::PermissionDenied(_)
        ));
        assert!(matches!(
            classify("device busy".into()),
            CaptureError::StreamFailed(_)
        ));
    }

    #[test]
    fn paused_stream_drops_chunks_silently() {
        let (tx, mut rx) = mpsc::channel(4);
        let control = StreamControl::default();
        control.running.store(true, Ordering::SeqCst);

        deliver(&control, &tx, vec![0.1]);
        control.paused.store(true, Ordering::SeqCst);
        deliver(&control, &tx, vec![0.2]);

        assert_eq!(rx.try_recv().unwrap(), vec![0.1]);
        assert!(rx.try_recv().is_err());
        assert_eq!(control.dropped_chunks.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn full_channel_counts_drops() {
        let (tx, _rx) = mpsc::channel(1);
        let control = StreamControl::default();
        control.running.store(true, Ordering::SeqCst);

        deliver(&control, &tx, vec![0.1]);
        deliver(&control, &tx, vec![0.2]);
        assert_eq!(control.dropped_chunks.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    #[ignore = "requires a microphone"]
    async fn acquire_and_release_default_device() {
        let input = CpalInput::new();
        let mut stream = input.acquire().await.unwrap();
        let mut source = stream.take_source().unwrap();
        assert!(stream.take_source().is_none());
        stream.release();
        while source.recv().await.is_some() {}
    }
}
