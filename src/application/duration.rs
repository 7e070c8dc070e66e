//! Best-effort playable duration of an encoded blob

use std::time::Duration as StdDuration;

use tokio::time;
use tracing::debug;

use crate::domain::recording::duration::MAX_MESSAGE_SECS;
use crate::domain::recording::Duration;

use super::ports::MetadataReader;

/// Bytes per estimated second in the size heuristic
const HEURISTIC_BYTES_PER_SEC: usize = 1024;

/// Where an estimate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationSource {
    Metadata,
    Heuristic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationEstimate {
    pub seconds: u64,
    pub source: DurationSource,
}

/// Clamp a duration to the `[1, 300]` second message range
pub fn clamp_seconds(seconds: u64) -> u64 {
    seconds.clamp(1, MAX_MESSAGE_SECS)
}

/// `min(ceil(len / 1024), 300)`, before clamping
pub fn heuristic_seconds(byte_len: usize) -> u64 {
    let secs = byte_len.div_ceil(HEURISTIC_BYTES_PER_SEC) as u64;
    secs.min(MAX_MESSAGE_SECS)
}

/// Metadata-first duration estimator with a size-based fallback.
///
/// The fallback is an approximation: it assumes roughly 1 KiB per second
/// of audio. Every result lies in `[1, 300]`.
pub struct DurationEstimator<M: MetadataReader> {
    reader: M,
    timeout: StdDuration,
}

impl<M: MetadataReader> DurationEstimator<M> {
    pub fn new(reader: M) -> Self {
        Self::with_timeout(reader, Duration::default_metadata_timeout())
    }

    pub fn with_timeout(reader: M, timeout: Duration) -> Self {
        Self {
            reader,
            timeout: timeout.as_std(),
        }
    }

    /// Estimated whole seconds
    pub async fn estimate(&self, blob: &[u8]) -> u64 {
        self.estimate_detailed(blob).await.seconds
    }

    pub async fn estimate_detailed(&self, blob: &[u8]) -> DurationEstimate {
        match time::timeout(self.timeout, self.reader.read_duration(blob)).await {
            Ok(Ok(Some(secs))) if secs.is_finite() && secs > 0.0 => {
                return DurationEstimate {
                    seconds: clamp_seconds(secs.round() as u64),
                    source: DurationSource::Metadata,
                };
            }
            Ok(Ok(value)) => debug!(?value, "no usable duration metadata"),
            Ok(Err(e)) => debug!(error = %e, "duration metadata unreadable"),
            Err(_) => debug!(timeout_ms = self.timeout.as_millis() as u64, "duration metadata timed out"),
        }

        DurationEstimate {
            seconds: clamp_seconds(heuristic_seconds(blob.len())),
            source: DurationSource::Heuristic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MetadataError;
    use async_trait::async_trait;

    enum Reader {
        Value(Option<f64>),
        Fails,
        Hangs,
    }

    #[async_trait]
    impl MetadataReader for Reader {
        async fn read_duration(&self, _bytes: &[u8]) -> Result<Option<f64>, MetadataError> {
            match self {
                Self::Value(v) => Ok(*v),
                Self::Fails => Err(MetadataError("truncated header".into())),
                Self::Hangs => {
                    std::future::pending::<()>().await;
                    Ok(None)
                }
            }
        }
    }

    async fn estimate(reader: Reader, len: usize) -> DurationEstimate {
        DurationEstimator::new(reader)
            .estimate_detailed(&vec![0u8; len])
            .await
    }

    #[tokio::test]
    async fn metadata_value_is_rounded() {
        let est = estimate(Reader::Value(Some(12.4)), 10).await;
        assert_eq!(est.seconds, 12);
        assert_eq!(est.source, DurationSource::Metadata);

        assert_eq!(estimate(Reader::Value(Some(12.5)), 10).await.seconds, 13);
    }

    #[tokio::test]
    async fn metadata_is_clamped() {
        assert_eq!(estimate(Reader::Value(Some(0.2)), 10).await.seconds, 1);
        assert_eq!(estimate(Reader::Value(Some(1e9)), 10).await.seconds, 300);
    }

    #[tokio::test]
    async fn unusable_metadata_falls_back() {
        for value in [None, Some(0.0), Some(-3.0), Some(f64::NAN), Some(f64::INFINITY)] {
            let est = estimate(Reader::Value(value), 5000).await;
            assert_eq!(est.source, DurationSource::Heuristic, "{:?}", value);
            assert_eq!(est.seconds, 5);
        }
    }

    #[tokio::test]
    async fn reader_error_falls_back() {
        let est = estimate(Reader::Fails, 2048).await;
        assert_eq!(est.source, DurationSource::Heuristic);
        assert_eq!(est.seconds, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_falls_back() {
        let est = estimate(Reader::Hangs, 2049).await;
        assert_eq!(est.source, DurationSource::Heuristic);
        assert_eq!(est.seconds, 3);
    }

    #[test]
    fn heuristic_bounds() {
        assert_eq!(heuristic_seconds(0), 0);
        assert_eq!(heuristic_seconds(1), 1);
        assert_eq!(heuristic_seconds(1024), 1);
        assert_eq!(heuristic_seconds(1025), 2);
        assert_eq!(heuristic_seconds(10 * 1024 * 1024), 300);
    }

    #[tokio::test]
    async fn every_estimate_is_in_range() {
        for len in [0, 1, 512, 1024, 4096, 307_200, 307_201, 5_000_000] {
            let secs = DurationEstimator::new(Reader::Value(None))
                .estimate(&vec![0u8; len])
                .await;
            assert!((1..=300).contains(&secs), "{} bytes -> {}", len, secs);
        }
    }
}
