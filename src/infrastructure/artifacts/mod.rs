//! Artifact transfer adapters

mod loader;
mod outbox;

pub use loader::ArtifactLoader;
pub use outbox::{OutboxEntry, OutboxUploader};
