//! Artifact fetcher for local files and HTTP(S) URLs

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::application::ports::{ArtifactFetcher, ArtifactRef, FetchError};

/// Reads local paths from disk and downloads URLs with reqwest
pub struct ArtifactLoader {
    client: reqwest::Client,
}

impl ArtifactLoader {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

impl Default for ArtifactLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArtifactFetcher for ArtifactLoader {
    async fn fetch(&self, reference: &ArtifactRef) -> Result<Vec<u8>, FetchError> {
        let bytes = match reference {
            ArtifactRef::Path(path) => fs::read(path).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FetchError::NotFound(path.display().to_string())
                } else {
                    FetchError::Io(e.to_string())
                }
            })?,
            ArtifactRef::Url(url) => self.download(url).await?,
        };
        debug!(%reference, bytes = bytes.len(), "artifact fetched");
        Ok(bytes)
    }
}
