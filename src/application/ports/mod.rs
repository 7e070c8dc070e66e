//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod artifact;
pub mod capture;
pub mod checkpoint;
pub mod config;
pub mod decoder;
pub mod playback;

// Re-export common types
pub use artifact::{
    ArtifactFetcher, ArtifactRef, ArtifactUploader, FetchError, UploadError, UploadReceipt,
};
pub use capture::{
    AudioInput, CaptureError, CaptureEvent, EncodeError, EncoderSession, InputStream, MediaEncoder,
};
pub use checkpoint::{CheckpointError, CheckpointStore};
pub use config::ConfigStore;
pub use decoder::{AudioDecoder, DecodeError, MetadataError, MetadataReader};
pub use playback::{PlaybackProbe, ProbeError, ProbeOutcome};
