//! File-backed checkpoint store
//!
//! Layout per session:
//!
//! ```text
//! <root>/<id>/session.json
//! <root>/<id>/segment-00000.bin
//! <root>/<id>/segment-00001.bin
//! ```
//!
//! Segments are immutable once written, so each checkpoint only writes the
//! files that are missing. `session.json` is replaced atomically last, which
//! keeps status and segment count consistent for readers.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::application::ports::{CheckpointError, CheckpointStore};
use crate::domain::recording::{Codec, EncodedArtifact, EncodedSegment, SessionId, SessionStatus};

const RECORD_FILE: &str = "session.json";

/// Persisted session record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub status: SessionStatus,
    pub elapsed_secs: u64,
    pub codec: Codec,
    pub segment_count: usize,
    /// Seconds since the Unix epoch
    pub updated_at: u64,
}

/// Checkpoint store writing one directory per session
#[derive(Debug, Clone)]
pub struct JsonCheckpointStore {
    root: PathBuf,
}

impl JsonCheckpointStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn session_dir(&self, id: &SessionId) -> PathBuf {
        self.root.join(id.as_str())
    }

    fn segment_path(dir: &Path, index: usize) -> PathBuf {
        dir.join(format!("segment-{:05}.bin", index))
    }

    /// Load one session's record and segments in order
    pub async fn load(
        &self,
        id: &SessionId,
    ) -> Result<(SessionRecord, Vec<EncodedSegment>), CheckpointError> {
        let dir = self.session_dir(id);
        let record = read_record(&dir.join(RECORD_FILE)).await?;

        let mut segments = Vec::with_capacity(record.segment_count);
        for index in 0..record.segment_count {
            let bytes = fs::read(Self::segment_path(&dir, index))
                .await
                .map_err(|e| CheckpointError::Unavailable(format!("segment {}: {}", index, e)))?;
            segments.push(EncodedSegment::new(bytes, record.codec.clone()));
        }
        Ok((record, segments))
    }

    /// Load a session and join its segments into one artifact
    pub async fn export(&self, id: &SessionId) -> Result<EncodedArtifact, CheckpointError> {
        let (record, segments) = self.load(id).await?;
        Ok(EncodedArtifact::assemble(record.codec, &segments))
    }

    /// All readable records, most recently updated first
    pub async fn list(&self) -> Result<Vec<SessionRecord>, CheckpointError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CheckpointError::Unavailable(e.to_string())),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CheckpointError::Unavailable(e.to_string()))?
        {
            match read_record(&entry.path().join(RECORD_FILE)).await {
                Ok(record) => records.push(record),
                Err(e) => debug!(path = %entry.path().display(), error = %e, "skipping entry"),
            }
        }
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }
}

#[async_trait]
impl CheckpointStore for JsonCheckpointStore {
    async fn checkpoint(
        &self,
        id: Option<&SessionId>,
        segments: &[EncodedSegment],
        status: SessionStatus,
        elapsed_secs: u64,
    ) -> Result<SessionId, CheckpointError> {
        let id = id.cloned().unwrap_or_else(SessionId::generate);
        let dir = self.session_dir(&id);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| CheckpointError::WriteFailed(e.to_string()))?;

        for (index, segment) in segments.iter().enumerate() {
            let path = Self::segment_path(&dir, index);
            if fs::try_exists(&path).await.unwrap_or(false) {
                continue;
            }
            write_atomic(&path, segment.bytes()).await?;
        }

        let record = SessionRecord {
            id: id.clone(),
            status,
            elapsed_secs,
            codec: segments.first().map(|s| s.codec().clone()).unwrap_or_default(),
            segment_count: segments.len(),
            updated_at: unix_now(),
        };
        let json = serde_json::to_vec_pretty(&record)
            .map_err(|e| CheckpointError::WriteFailed(e.to_string()))?;
        write_atomic(&dir.join(RECORD_FILE), &json).await?;

        debug!(session = %id, segments = segments.len(), %status, "checkpoint written");
        Ok(id)
    }
}

async fn read_record(path: &Path) -> Result<SessionRecord, CheckpointError> {
    let raw = fs::read(path)
        .await
        .map_err(|e| CheckpointError::Unavailable(format!("{}: {}", path.display(), e)))?;
    serde_json::from_slice(&raw)
        .map_err(|e| CheckpointError::Unavailable(format!("{}: {}", path.display(), e)))
}

/// Write to a sibling temp file, then rename over the target
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CheckpointError> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)
        .await
        .map_err(|e| CheckpointError::WriteFailed(e.to_string()))?;
    fs::rename(&tmp, path)
        .await
        .map_err(|e| CheckpointError::WriteFailed(e.to_string()))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn segments(lens: &[usize]) -> Vec<EncodedSegment> {
        lens.iter()
            .enumerate()
            .map(|(i, &n)| EncodedSegment::new(vec![i as u8; n], Codec::wav()))
            .collect()
    }

    #[tokio::test]
    async fn first_checkpoint_assigns_id_and_later_ones_update() {
        let dir = TempDir::new().unwrap();
        let store = JsonCheckpointStore::new(dir.path());

        let id = store
            .checkpoint(None, &segments(&[3]), SessionStatus::Recording, 1)
            .await
            .unwrap();
        let again = store
            .checkpoint(Some(&id), &segments(&[3, 2]), SessionStatus::Stopped, 2)
            .await
            .unwrap();

        assert_eq!(id, again);
        let records = store.list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, SessionStatus::Stopped);
        assert_eq!(records[0].segment_count, 2);
        assert_eq!(records[0].elapsed_secs, 2);
    }

    #[tokio::test]
    async fn retry_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = JsonCheckpointStore::new(dir.path());
        let segs = segments(&[4, 4]);

        let id = store
            .checkpoint(None, &segs, SessionStatus::Paused, 3)
            .await
            .unwrap();
        store
            .checkpoint(Some(&id), &segs, SessionStatus::Paused, 3)
            .await
            .unwrap();

        let (record, loaded) = store.load(&id).await.unwrap();
        assert_eq!(record.segment_count, 2);
        assert_eq!(loaded, segs);
    }

    #[tokio::test]
    async fn load_returns_segments_in_order() {
        let dir = TempDir::new().unwrap();
        let store = JsonCheckpointStore::new(dir.path());
        let segs = segments(&[1, 2, 3]);

        let id = store
            .checkpoint(None, &segs, SessionStatus::Stopped, 3)
            .await
            .unwrap();
        let (record, loaded) = store.load(&id).await.unwrap();

        assert_eq!(record.codec, Codec::wav());
        assert_eq!(loaded.iter().map(|s| s.len()).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(store.export(&id).await.unwrap().size_bytes(), 6);
    }

    #[tokio::test]
    async fn list_on_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonCheckpointStore::new(dir.path().join("absent"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn load_unknown_session_fails() {
        let dir = TempDir::new().unwrap();
        let store = JsonCheckpointStore::new(dir.path());
        assert!(store.load(&SessionId::new("missing")).await.is_err());
    }

    #[tokio::test]
    async fn record_round_trips_through_json() {
        let record = SessionRecord {
            id: SessionId::new("abc"),
            status: SessionStatus::Paused,
            elapsed_secs: 7,
            codec: Codec::flac(),
            segment_count: 2,
            updated_at: 1,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"paused\""));
        assert!(json.contains("\"audio/flac\""));
        assert_eq!(serde_json::from_str::<SessionRecord>(&json).unwrap(), record);
    }
}
