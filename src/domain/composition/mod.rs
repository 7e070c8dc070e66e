//! Composition of a preamble and an original message

pub mod plan;
pub mod track;

pub use plan::{CompositionPlan, RenderBuffer, RenderedAudio};
pub use track::AudioTrack;
