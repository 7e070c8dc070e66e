//! Fetch and upload ports for stored artifacts

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::EncodedArtifact;

/// Reference to a previously stored artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactRef {
    Path(PathBuf),
    Url(String),
}

impl ArtifactRef {
    /// `http(s)://` becomes a URL, anything else a local path
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let lower = trimmed.to_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::Path(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Url(u) => write!(f, "{}", u),
        }
    }
}

/// Fetch errors
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Artifact not found: {0}")]
    NotFound(String),

    #[error("Failed to read artifact: {0}")]
    Io(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server returned status {status} for {url}")]
    Status { status: u16, url: String },
}

/// Port for obtaining the raw bytes of a stored artifact
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    async fn fetch(&self, reference: &ArtifactRef) -> Result<Vec<u8>, FetchError>;
}

/// Upload errors
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    #[error("Upload rejected: {0}")]
    Rejected(String),

    #[error("Upload failed: {0}")]
    Failed(String),
}

/// Acknowledgement from the upload collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub id: String,
    pub location: String,
}

/// Port for handing off a finalized artifact
#[async_trait]
pub trait ArtifactUploader: Send + Sync {
    async fn upload(
        &self,
        artifact: &EncodedArtifact,
        duration_secs: u64,
    ) -> Result<UploadReceipt, UploadError>;
}
