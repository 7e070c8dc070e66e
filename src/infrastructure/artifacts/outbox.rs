//! Directory outbox standing in for the message relay
//!
//! Each upload lands as `<id>.<ext>` next to a `<id>.json` sidecar carrying
//! the codec, size and duration the relay would receive.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;
use uuid::Uuid;

use crate::application::ports::{ArtifactUploader, UploadError, UploadReceipt};
use crate::domain::recording::duration::MAX_MESSAGE_SECS;
use crate::domain::recording::{Codec, EncodedArtifact};

/// Sidecar written next to every uploaded artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxEntry {
    pub id: String,
    pub file: String,
    pub codec: Codec,
    pub size_bytes: usize,
    pub duration_secs: u64,
}

/// Uploader that writes into a local directory
pub struct OutboxUploader {
    dir: PathBuf,
}

impl OutboxUploader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ArtifactUploader for OutboxUploader {
    async fn upload(
        &self,
        artifact: &EncodedArtifact,
        duration_secs: u64,
    ) -> Result<UploadReceipt, UploadError> {
        if artifact.size_bytes() == 0 {
            return Err(UploadError::Rejected("artifact is empty".into()));
        }
        if duration_secs > MAX_MESSAGE_SECS {
            return Err(UploadError::Rejected(format!(
                "{}s exceeds the {}s message limit",
                duration_secs, MAX_MESSAGE_SECS
            )));
        }

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| UploadError::Failed(e.to_string()))?;

        let id = Uuid::new_v4().to_string();
        let file = format!("{}.{}", id, artifact.codec().extension());
        let path = self.dir.join(&file);
        fs::write(&path, artifact.bytes())
            .await
            .map_err(|e| UploadError::Failed(e.to_string()))?;

        let entry = OutboxEntry {
            id: id.clone(),
            file,
            codec: artifact.codec().clone(),
            size_bytes: artifact.size_bytes(),
            duration_secs,
        };
        let json =
            serde_json::to_vec_pretty(&entry).map_err(|e| UploadError::Failed(e.to_string()))?;
        fs::write(self.dir.join(format!("{}.json", id)), json)
            .await
            .map_err(|e| UploadError::Failed(e.to_string()))?;

        info!(%id, duration_secs, size = artifact.size_bytes(), "artifact queued in outbox");
        Ok(UploadReceipt {
            id,
            location: path.display().to_string(),
        })
    }
}
