//! Recording value objects and the session state machine

pub mod codec;
pub mod duration;
pub mod pcm;
pub mod segment;
pub mod session;

pub use codec::Codec;
pub use duration::Duration;
pub use pcm::{PcmChunk, PcmFormat};
pub use segment::{EncodedArtifact, EncodedSegment};
pub use session::{InvalidStateTransition, SessionId, SessionState, SessionStatus};
