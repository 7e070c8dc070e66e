//! voxrelay - resumable voice capture and preamble composition
//!
//! Records voice messages from the microphone in timesliced segments that
//! are checkpointed as they arrive, and forwards stored messages with a
//! freshly recorded spoken preamble joined in front.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: codecs, segments, the session state machine, tracks and composition plans
//! - **Application**: use cases (recording session, composer, duration estimator, forward) and port traits
//! - **Infrastructure**: adapters for cpal, symphonia, rubato, flacenc, rodio, the filesystem and HTTP
//! - **CLI**: argument parsing, output formatting and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
