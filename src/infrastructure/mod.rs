//! Infrastructure layer - Adapter implementations
//!
//! Concrete implementations of the port interfaces: microphone capture with
//! cpal, timeslice encoding, symphonia decoding, rodio playback, file-backed
//! checkpoints and artifact transfer.

pub mod artifacts;
pub mod capture;
pub mod config;
pub mod decoding;
pub mod encoding;
pub mod persistence;
pub mod playback;

// Re-export adapters
pub use artifacts::{ArtifactLoader, OutboxUploader};
pub use capture::CpalInput;
pub use config::XdgConfigStore;
pub use decoding::{SymphoniaDecoder, SymphoniaMetadataReader};
pub use encoding::TimesliceEncoder;
pub use persistence::JsonCheckpointStore;
pub use playback::RodioProbe;
