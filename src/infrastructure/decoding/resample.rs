//! Sample-rate conversion with rubato

use rubato::{FftFixedIn, Resampler};

use crate::application::ports::DecodeError;

const CHUNK_FRAMES: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Convert planar channels from `from` Hz to `to` Hz.
///
/// Output length is `round(frames * to / from)`; the resampler's delay is
/// trimmed from the front.
pub fn resample(
    channels: Vec<Vec<f32>>,
    from: u32,
    to: u32,
) -> Result<Vec<Vec<f32>>, DecodeError> {
    let frames = channels.first().map_or(0, Vec::len);
    if from == to || frames == 0 {
        return Ok(channels);
    }

    let count = channels.len();
    let out_len = (frames as f64 * to as f64 / from as f64).round() as usize;

    let mut resampler =
        FftFixedIn::<f32>::new(from as usize, to as usize, CHUNK_FRAMES, SUB_CHUNKS, count)
            .map_err(|e| DecodeError::Resample(format!("init: {}", e)))?;
    let delay = resampler.output_delay();

    let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity(out_len + delay); count];
    let mut pos = 0;

    while pos < frames || output[0].len() < out_len + delay {
        let needed = resampler.input_frames_next();
        let end = (pos + needed).min(frames);
        // Zero-pad the tail so the final partial chunk and the delay flush out
        let chunk: Vec<Vec<f32>> = channels
            .iter()
            .map(|c| {
                let mut block = c.get(pos..end).unwrap_or_default().to_vec();
                block.resize(needed, 0.0);
                block
            })
            .collect();

        let processed = resampler
            .process(&chunk, None)
            .map_err(|e| DecodeError::Resample(e.to_string()))?;
        for (out, block) in output.iter_mut().zip(processed) {
            out.extend(block);
        }
        pos = end;
    }

    for out in output.iter_mut() {
        out.drain(..delay.min(out.len()));
        out.truncate(out_len);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_rate_is_passthrough() {
        let input = vec![vec![0.1, 0.2, 0.3]];
        assert_eq!(resample(input.clone(), 16000, 16000).unwrap(), input);
    }

    #[test]
    fn upsampling_scales_length() {
        let out = resample(vec![vec![0.0; 16000], vec![0.0; 16000]], 16000, 48000).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|c| c.len() == 48000));
    }

    #[test]
    fn downsampling_scales_length() {
        let out = resample(vec![vec![0.0; 44100]], 44100, 16000).unwrap();
        assert_eq!(out[0].len(), 16000);
    }

    #[test]
    fn short_input_still_produces_output() {
        let out = resample(vec![vec![0.5; 10]], 8000, 48000).unwrap();
        assert_eq!(out[0].len(), 60);
    }

    #[test]
    fn constant_signal_is_preserved_mid_track() {
        let out = resample(vec![vec![0.5; 32000]], 16000, 48000).unwrap();
        let mid = out[0][48000];
        assert!((mid - 0.5).abs() < 0.01, "mid sample {}", mid);
    }
}
