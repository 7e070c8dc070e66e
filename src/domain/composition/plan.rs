//! Composition plan: preamble followed by original on one timeline

use crate::domain::recording::PcmFormat;

use super::track::AudioTrack;

/// Planar buffer holding the concatenated tracks
#[derive(Debug, Clone, PartialEq)]
pub struct RenderBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl RenderBuffer {
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn frame_count(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Offline render pass: materialize interleaved samples.
    pub fn render(&self) -> RenderedAudio {
        let channels = self.channel_count();
        let frames = self.frame_count();
        let mut samples = Vec::with_capacity(frames * channels);
        for frame in 0..frames {
            for channel in &self.channels {
                samples.push(channel[frame]);
            }
        }
        RenderedAudio {
            samples,
            format: PcmFormat::new(self.sample_rate, channels as u16),
        }
    }
}

/// Interleaved output of the render pass
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedAudio {
    pub samples: Vec<f32>,
    pub format: PcmFormat,
}

impl RenderedAudio {
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.format.channels.max(1) as usize
    }
}

/// Two decoded tracks in fixed order: preamble first, original second.
///
/// Both tracks must already be at the plan's sample rate; samples are copied
/// without conversion.
#[derive(Debug)]
pub struct CompositionPlan {
    tracks: [AudioTrack; 2],
    sample_rate: u32,
    channel_count: usize,
}

impl CompositionPlan {
    pub fn new(preamble: AudioTrack, original: AudioTrack, sample_rate: u32) -> Self {
        let channel_count = preamble.channels().max(original.channels());
        Self {
            tracks: [preamble, original],
            sample_rate,
            channel_count,
        }
    }

    pub fn preamble(&self) -> &AudioTrack {
        &self.tracks[0]
    }

    pub fn original(&self) -> &AudioTrack {
        &self.tracks[1]
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn frame_count(&self) -> usize {
        self.tracks.iter().map(AudioTrack::frame_count).sum()
    }

    /// Summed source durations, independent of any later re-encode
    pub fn duration_secs(&self) -> f64 {
        self.tracks.iter().map(AudioTrack::duration_secs).sum()
    }

    /// Copy both tracks into one buffer.
    ///
    /// Output channel `c` takes source channel `c % source.channels()`, so a
    /// mono source on a stereo plan lands on both channels.
    pub fn concatenate(&self) -> RenderBuffer {
        let total = self.frame_count();
        let mut channels = Vec::with_capacity(self.channel_count);

        for c in 0..self.channel_count {
            let mut out = Vec::with_capacity(total);
            for track in &self.tracks {
                out.extend_from_slice(track.channel(c % track.channels()));
            }
            channels.push(out);
        }

        RenderBuffer {
            channels,
            sample_rate: self.sample_rate,
        }
    }
}
