//! Encoded segment and artifact value objects

use std::sync::Arc;

use super::codec::Codec;

/// Size placeholder used by streaming WAV headers whose length is unknown
pub const STREAMING_SIZE: u32 = u32::MAX;

/// One chunk of encoder output, in emission order.
///
/// The payload is shared, never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSegment {
    bytes: Arc<[u8]>,
    codec: Codec,
}

impl EncodedSegment {
    pub fn new(bytes: Vec<u8>, codec: Codec) -> Self {
        Self {
            bytes: bytes.into(),
            codec,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A single transportable blob: the concatenation of a session's segments,
/// or the output of a composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedArtifact {
    bytes: Vec<u8>,
    codec: Codec,
}

impl EncodedArtifact {
    pub fn new(bytes: Vec<u8>, codec: Codec) -> Self {
        Self { bytes, codec }
    }

    /// Join segments in order into one artifact.
    ///
    /// Streaming WAV headers carry placeholder sizes while recording; they are
    /// rewritten here so the joined blob reports its real length.
    pub fn assemble(codec: Codec, segments: &[EncodedSegment]) -> Self {
        let total: usize = segments.iter().map(EncodedSegment::len).sum();
        let mut bytes = Vec::with_capacity(total);
        for segment in segments {
            bytes.extend_from_slice(segment.bytes());
        }
        if codec.is_wav() {
            finalize_wav_sizes(&mut bytes);
        }
        Self { bytes, codec }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }
}

/// Locate the `data` chunk of a RIFF/WAVE blob.
/// Returns the offset of the chunk's size field.
fn find_wav_data_chunk(bytes: &[u8]) -> Option<usize> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return None;
    }
    let mut offset = 12;
    while offset + 8 <= bytes.len() {
        let id = &bytes[offset..offset + 4];
        if id == b"data" {
            return Some(offset + 4);
        }
        let size = read_u32_le(bytes, offset + 4)? as usize;
        offset = offset.checked_add(8 + size + (size & 1))?;
    }
    None
}

fn read_u32_le(bytes: &[u8], at: usize) -> Option<u32> {
    let raw: [u8; 4] = bytes.get(at..at + 4)?.try_into().ok()?;
    Some(u32::from_le_bytes(raw))
}

fn write_u32_le(bytes: &mut [u8], at: usize, value: u32) {
    bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

/// Overwrite the RIFF and data sizes with the streaming placeholder.
pub fn mark_wav_streaming(header: &mut [u8]) {
    if let Some(data_size_at) = find_wav_data_chunk(header) {
        write_u32_le(header, 4, STREAMING_SIZE);
        write_u32_le(header, data_size_at, STREAMING_SIZE);
    }
}

/// Rewrite RIFF and data sizes to match the blob's actual length.
pub fn finalize_wav_sizes(bytes: &mut [u8]) {
    let Some(data_size_at) = find_wav_data_chunk(bytes) else {
        return;
    };
    let len = bytes.len();
    let riff_size = u32::try_from(len - 8).unwrap_or(STREAMING_SIZE);
    let data_size = u32::try_from(len - (data_size_at + 4)).unwrap_or(STREAMING_SIZE);
    write_u32_le(bytes, 4, riff_size);
    write_u32_le(bytes, data_size_at, data_size);
}
