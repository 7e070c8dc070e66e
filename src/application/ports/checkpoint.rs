//! Checkpoint persistence port

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::{EncodedSegment, SessionId, SessionStatus};

/// Checkpoint write errors
#[derive(Debug, Clone, Error)]
pub enum CheckpointError {
    #[error("Checkpoint write failed: {0}")]
    WriteFailed(String),

    #[error("Checkpoint store unavailable: {0}")]
    Unavailable(String),
}

/// Port for durable session checkpoints
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Persist the full segment list with its status and elapsed time.
    ///
    /// `None` creates a record; an existing id is updated in place. Must be
    /// idempotent under retry and keep `status`/`segments` together.
    ///
    /// # Returns
    /// The id of the written record
    async fn checkpoint(
        &self,
        id: Option<&SessionId>,
        segments: &[EncodedSegment],
        status: SessionStatus,
        elapsed_secs: u64,
    ) -> Result<SessionId, CheckpointError>;
}
