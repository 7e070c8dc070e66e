//! Decoded audio track

use crate::domain::error::InvalidTrack;

/// Planar samples of one decoded source.
///
/// Lives only for the duration of a composition: decoded, consumed, dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTrack {
    channel_data: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl AudioTrack {
    /// Build a track, checking every channel has the same length
    pub fn new(channel_data: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self, InvalidTrack> {
        if channel_data.is_empty() {
            return Err(InvalidTrack::NoChannels);
        }
        if sample_rate == 0 {
            return Err(InvalidTrack::ZeroSampleRate);
        }
        let expected = channel_data[0].len();
        if let Some((channel, data)) = channel_data
            .iter()
            .enumerate()
            .find(|(_, data)| data.len() != expected)
        {
            return Err(InvalidTrack::RaggedChannels {
                channel,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            channel_data,
            sample_rate,
        })
    }

    /// Silent track with `channels` channels
    pub fn empty(channels: usize, sample_rate: u32) -> Result<Self, InvalidTrack> {
        Self::new(vec![Vec::new(); channels], sample_rate)
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channel_data[index]
    }

    pub fn channels(&self) -> usize {
        self.channel_data.len()
    }

    pub fn frame_count(&self) -> usize {
        self.channel_data[0].len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }
}
