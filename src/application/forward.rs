//! Forward message use case
//!
//! Prepends a freshly recorded preamble to a stored message, validates the
//! result and hands it to the upload collaborator.

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::recording::{EncodedArtifact, EncodedSegment};

use super::compose::{AudioComposer, ComposeError};
use super::duration::{clamp_seconds, DurationEstimator};
use super::ports::{
    ArtifactFetcher, ArtifactRef, ArtifactUploader, AudioDecoder, FetchError, MediaEncoder,
    MetadataReader, PlaybackProbe, ProbeOutcome, UploadError, UploadReceipt,
};

/// Errors from the forward use case
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("No preamble audio was recorded")]
    EmptyPreamble,

    #[error("Failed to fetch original message: {0}")]
    FetchFailed(#[from] FetchError),

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error("Composed message is not playable: {0}")]
    ProbeFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(#[from] UploadError),
}

impl ForwardError {
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyPreamble => "Record a short introduction before forwarding.".to_string(),
            Self::FetchFailed(_) => "Could not load the original message.".to_string(),
            Self::Compose(e) => e.user_message(),
            Self::ProbeFailed(_) => "The forwarded message could not be played back.".to_string(),
            Self::UploadFailed(_) => "Could not send the forwarded message.".to_string(),
        }
    }
}

/// Progress stages reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardStage {
    Fetching,
    Composing,
    Validating,
    Uploading,
}

/// Input parameters for the forward use case
#[derive(Debug, Clone)]
pub struct ForwardInput {
    /// Finalized preamble segments, in emission order
    pub preamble: Vec<EncodedSegment>,
    /// Where the original message lives
    pub original: ArtifactRef,
}

/// Output from the forward use case
#[derive(Debug, Clone)]
pub struct ForwardOutput {
    pub receipt: UploadReceipt,
    /// Whole seconds handed to the uploader
    pub duration_secs: u64,
    pub artifact_size: String,
}

/// Callbacks for status updates
#[derive(Default)]
pub struct ForwardCallbacks {
    pub on_stage: Option<Box<dyn Fn(ForwardStage) + Send + Sync>>,
}

impl ForwardCallbacks {
    fn stage(&self, stage: ForwardStage) {
        if let Some(cb) = &self.on_stage {
            cb(stage);
        }
    }
}

/// Forward message use case
pub struct ForwardMessageUseCase<F, D, E, M, P, U>
where
    F: ArtifactFetcher,
    D: AudioDecoder,
    E: MediaEncoder,
    M: MetadataReader,
    P: PlaybackProbe,
    U: ArtifactUploader,
{
    fetcher: F,
    composer: AudioComposer<D, E>,
    estimator: DurationEstimator<M>,
    probe: P,
    uploader: U,
}

impl<F, D, E, M, P, U> ForwardMessageUseCase<F, D, E, M, P, U>
where
    F: ArtifactFetcher,
    D: AudioDecoder,
    E: MediaEncoder,
    M: MetadataReader,
    P: PlaybackProbe,
    U: ArtifactUploader,
{
    pub fn new(
        fetcher: F,
        composer: AudioComposer<D, E>,
        estimator: DurationEstimator<M>,
        probe: P,
        uploader: U,
    ) -> Self {
        Self {
            fetcher,
            composer,
            estimator,
            probe,
            uploader,
        }
    }

    /// Compose, validate and upload a forwarded message
    pub async fn execute(
        &self,
        input: ForwardInput,
        callbacks: &ForwardCallbacks,
    ) -> Result<ForwardOutput, ForwardError> {
        let Some(first) = input.preamble.first() else {
            return Err(ForwardError::EmptyPreamble);
        };
        let preamble = EncodedArtifact::assemble(first.codec().clone(), &input.preamble);

        callbacks.stage(ForwardStage::Fetching);
        let original = self.fetcher.fetch(&input.original).await?;
        debug!(reference = %input.original, bytes = original.len(), "original fetched");

        callbacks.stage(ForwardStage::Composing);
        let composed = self.composer.compose(preamble.bytes(), &original).await?;

        let duration_secs = clamp_seconds(composed.duration_secs.round() as u64);
        let estimate = self.estimator.estimate_detailed(composed.artifact.bytes()).await;
        if estimate.seconds != duration_secs {
            debug!(
                composed = duration_secs,
                estimated = estimate.seconds,
                source = ?estimate.source,
                "estimated duration differs from timeline"
            );
        }

        callbacks.stage(ForwardStage::Validating);
        if let ProbeOutcome::Failed(reason) = self.probe.probe(&composed.artifact).await {
            return Err(ForwardError::ProbeFailed(reason));
        }

        callbacks.stage(ForwardStage::Uploading);
        let receipt = self.uploader.upload(&composed.artifact, duration_secs).await?;
        info!(id = %receipt.id, duration_secs, "forwarded message uploaded");

        Ok(ForwardOutput {
            receipt,
            duration_secs,
            artifact_size: composed.artifact.human_readable_size(),
        })
    }
}
