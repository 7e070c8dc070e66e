//! Domain layer - Core business logic
//!
//! Contains value objects, the session state machine, the composition plan,
//! and domain errors. This layer has no dependencies on external systems.

pub mod composition;
pub mod config;
pub mod error;
pub mod recording;

// Re-export common types
pub use composition::{AudioTrack, CompositionPlan, RenderedAudio};
pub use config::AppConfig;
pub use error::*;
pub use recording::{
    Codec, Duration, EncodedArtifact, EncodedSegment, PcmChunk, PcmFormat, SessionId,
    SessionState, SessionStatus,
};
