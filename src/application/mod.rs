//! Application layer - Use cases and port interfaces
//!
//! Contains the capture and composition operations and trait definitions
//! for external system interactions.

pub mod codec;
pub mod compose;
pub mod duration;
pub mod forward;
pub mod ports;
pub mod recording;

// Re-export use cases
pub use codec::negotiate_codec;
pub use compose::{AudioComposer, ComposeError, ComposedArtifact, ComposerConfig, TrackRole};
pub use duration::{DurationEstimate, DurationEstimator, DurationSource};
pub use forward::{
    ForwardCallbacks, ForwardError, ForwardInput, ForwardMessageUseCase, ForwardOutput,
    ForwardStage,
};
pub use recording::{RecordingConfig, RecordingError, RecordingSession};
