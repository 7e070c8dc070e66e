//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};

/// 16-bit PCM WAV with a quiet sawtooth on every channel
pub fn wav_bytes(sample_rate: u32, channels: u16, seconds: f64) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let frames = (sample_rate as f64 * seconds).round() as usize;
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
    for i in 0..frames {
        let value = ((i % 200) as i16 - 100) * 50;
        for _ in 0..channels {
            writer.write_sample(value).unwrap();
        }
    }
    writer.finalize().unwrap();
    cursor.into_inner()
}

pub fn write_wav(dir: &Path, name: &str, sample_rate: u32, channels: u16, seconds: f64) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, wav_bytes(sample_rate, channels, seconds)).unwrap();
    path
}

/// Sample count of a WAV blob, across all channels
pub fn wav_sample_count(bytes: &[u8]) -> usize {
    let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
    reader.into_samples::<i16>().filter_map(Result::ok).count()
}
