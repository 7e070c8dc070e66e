//! Raw PCM format description

use std::fmt;

/// Interleaved f32 samples as delivered by a capture or render source
pub type PcmChunk = Vec<f32>;

/// Sample layout of an interleaved PCM stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmFormat {
    pub const fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Number of interleaved samples spanning `millis` of audio
    pub fn samples_for_millis(&self, millis: u64) -> usize {
        let frames = self.sample_rate as u64 * millis / 1000;
        frames as usize * self.channels as usize
    }
}

impl fmt::Display for PcmFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Hz/{}ch", self.sample_rate, self.channels)
    }
}
