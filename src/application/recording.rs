//! Recording session use case
//!
//! Owns the capture stream, the encoder session, the elapsed-time clock and
//! the ordered segment list. Checkpoints are written by a single worker task
//! in dispatch order, so a record never pairs a newer status with an older
//! segment list.

use std::sync::{Arc, Weak};
use std::time::Duration as StdDuration;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::domain::recording::codec::default_preferences;
use crate::domain::recording::{
    Codec, EncodedSegment, InvalidStateTransition, SessionId, SessionState, SessionStatus,
};

use super::codec::negotiate_codec;
use super::ports::{
    AudioInput, CaptureError, CaptureEvent, CheckpointStore, EncodeError, InputStream,
    MediaEncoder,
};

/// Errors from the recording use case
#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("Capture device unavailable: {0}")]
    DeviceUnavailable(#[from] CaptureError),

    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),

    #[error("Encoder failed to start: {0}")]
    Encoder(#[from] EncodeError),
}

impl RecordingError {
    /// One actionable line for the user
    pub fn user_message(&self) -> String {
        match self {
            Self::DeviceUnavailable(CaptureError::PermissionDenied(_)) => {
                "Grant microphone access and try again.".to_string()
            }
            Self::DeviceUnavailable(CaptureError::NoInputDevice) => {
                "No microphone found. Connect one and try again.".to_string()
            }
            Self::DeviceUnavailable(_) => {
                "Could not open the microphone. Try again.".to_string()
            }
            Self::InvalidState(e) => format!("A recording is already in progress ({}).", e.current_state),
            Self::Encoder(_) => "Could not start the audio encoder.".to_string(),
        }
    }
}

/// Configuration for a recording session
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Ordered capture codec preferences
    pub codecs: Vec<Codec>,
    /// How long `stop()` waits for the encoder to emit its final segment
    pub drain_timeout: StdDuration,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            codecs: default_preferences(),
            drain_timeout: StdDuration::from_secs(2),
        }
    }
}

/// Consistent view of one checkpoint's payload
#[derive(Debug)]
struct Snapshot {
    generation: u64,
    segments: Vec<EncodedSegment>,
    status: SessionStatus,
    elapsed_secs: u64,
}

#[derive(Debug)]
enum CheckpointRequest {
    Write(Snapshot),
    Flush(oneshot::Sender<()>),
}

#[derive(Default)]
struct Shared {
    state: SessionState,
    segments: Vec<EncodedSegment>,
    elapsed_secs: u64,
    codec: Codec,
    id: Option<SessionId>,
    // Bumped on every reset; work tagged with an older value is discarded
    generation: u64,
    stream: Option<Box<dyn InputStream>>,
    checkpointer: Option<mpsc::UnboundedSender<CheckpointRequest>>,
    pump: Option<JoinHandle<()>>,
    clock: Option<JoinHandle<()>>,
}

impl Shared {
    fn dispatch_checkpoint(&self) {
        let Some(tx) = &self.checkpointer else {
            return;
        };
        let snapshot = Snapshot {
            generation: self.generation,
            segments: self.segments.clone(),
            status: self.state.status(),
            elapsed_secs: self.elapsed_secs,
        };
        if tx.send(CheckpointRequest::Write(snapshot)).is_err() {
            debug!("checkpoint worker gone; dropping write");
        }
    }

    fn release_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.release();
        }
    }

    fn abort_tasks(&mut self) {
        for handle in [self.pump.take(), self.clock.take()].into_iter().flatten() {
            handle.abort();
        }
    }

    fn reset(&mut self) {
        self.release_stream();
        self.abort_tasks();
        self.generation += 1;
        self.segments.clear();
        self.elapsed_secs = 0;
        self.codec = Codec::Unspecified;
        self.id = None;
        self.checkpointer = None;
        self.state.reset();
    }
}

/// Capture state machine over an input device, an encoder and a checkpoint store
pub struct RecordingSession<I, E, S>
where
    I: AudioInput,
    E: MediaEncoder,
    S: CheckpointStore + 'static,
{
    input: I,
    encoder: E,
    store: Arc<S>,
    config: RecordingConfig,
    shared: Arc<Mutex<Shared>>,
    // Serializes start/stop/clear
    ops: Mutex<()>,
}

impl<I, E, S> RecordingSession<I, E, S>
where
    I: AudioInput,
    E: MediaEncoder,
    S: CheckpointStore + 'static,
{
    /// Create a new session in the `Idle` state
    pub fn new(input: I, encoder: E, store: S, config: RecordingConfig) -> Self {
        Self {
            input,
            encoder,
            store: Arc::new(store),
            config,
            shared: Arc::new(Mutex::new(Shared::default())),
            ops: Mutex::new(()),
        }
    }

    pub async fn status(&self) -> SessionStatus {
        self.shared.lock().await.state.status()
    }

    pub async fn elapsed_secs(&self) -> u64 {
        self.shared.lock().await.elapsed_secs
    }

    /// Codec tagged on this session's segments
    pub async fn codec(&self) -> Codec {
        self.shared.lock().await.codec.clone()
    }

    /// Durable id, once the first checkpoint has succeeded
    pub async fn id(&self) -> Option<SessionId> {
        self.shared.lock().await.id.clone()
    }

    pub async fn segments(&self) -> Vec<EncodedSegment> {
        self.shared.lock().await.segments.clone()
    }

    /// Acquire the device, negotiate a codec and begin capturing.
    ///
    /// Valid from `Idle`. Starting from `Stopped` discards the finished
    /// session and begins a new one. On failure nothing is held and the
    /// status stays `Idle`.
    pub async fn start(&self) -> Result<(), RecordingError> {
        let _op = self.ops.lock().await;

        {
            let mut shared = self.shared.lock().await;
            match shared.state.status() {
                SessionStatus::Idle => {}
                SessionStatus::Stopped => shared.reset(),
                current => {
                    return Err(InvalidStateTransition {
                        current_state: current,
                        action: "start recording".to_string(),
                    }
                    .into())
                }
            }
        }

        let mut stream = self.input.acquire().await.map_err(|e| {
            warn!(error = %e, "capture device acquisition failed");
            RecordingError::DeviceUnavailable(e)
        })?;

        let requested = negotiate_codec(&self.config.codecs, &self.encoder);
        let Some(source) = stream.take_source() else {
            stream.release();
            return Err(RecordingError::DeviceUnavailable(CaptureError::SourceTaken));
        };
        let encoder = match self.encoder.start(&requested, stream.format(), source) {
            Ok(session) => session,
            Err(e) => {
                stream.release();
                return Err(e.into());
            }
        };

        let mut shared = self.shared.lock().await;
        if let Err(e) = shared.state.start() {
            stream.release();
            return Err(e.into());
        }
        info!(codec = %encoder.codec, format = %stream.format(), "recording started");

        let generation = shared.generation;
        let weak = Arc::downgrade(&self.shared);
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_checkpointer(Arc::clone(&self.store), weak.clone(), rx));

        shared.codec = encoder.codec;
        shared.stream = Some(stream);
        shared.checkpointer = Some(tx);
        shared.pump = Some(tokio::spawn(run_pump(weak.clone(), generation, encoder.events)));
        shared.clock = Some(tokio::spawn(run_clock(weak, generation)));
        Ok(())
    }

    /// Gate capture without releasing the device. No-op unless `Recording`.
    pub async fn pause(&self) -> bool {
        let mut shared = self.shared.lock().await;
        if !shared.state.pause() {
            return false;
        }
        if let Some(stream) = &shared.stream {
            stream.set_paused(true);
        }
        shared.dispatch_checkpoint();
        debug!(elapsed_secs = shared.elapsed_secs, "recording paused");
        true
    }

    /// Resume capture. No-op unless `Paused`.
    pub async fn resume(&self) -> bool {
        let mut shared = self.shared.lock().await;
        if !shared.state.resume() {
            return false;
        }
        if let Some(stream) = &shared.stream {
            stream.set_paused(false);
        }
        shared.dispatch_checkpoint();
        debug!(elapsed_secs = shared.elapsed_secs, "recording resumed");
        true
    }

    /// Finish the session and return its segments in emission order.
    ///
    /// Releases the device, waits for the encoder's final segment, halts the
    /// clock and flushes a `Stopped` checkpoint. From `Idle` or `Stopped`
    /// this only returns the current segments.
    pub async fn stop(&self) -> Vec<EncodedSegment> {
        let _op = self.ops.lock().await;

        let pump = {
            let mut shared = self.shared.lock().await;
            if !shared.state.is_active() {
                return shared.segments.clone();
            }
            shared.release_stream();
            if let Some(clock) = shared.clock.take() {
                clock.abort();
            }
            shared.pump.take()
        };

        if let Some(mut pump) = pump {
            if time::timeout(self.config.drain_timeout, &mut pump).await.is_err() {
                warn!("encoder did not drain in time; dropping its final segment");
                pump.abort();
            }
        }

        let (segments, flushed) = {
            let mut shared = self.shared.lock().await;
            shared.state.stop();
            shared.dispatch_checkpoint();
            let flushed = shared.checkpointer.take().map(|tx| {
                let (ack, done) = oneshot::channel();
                let _ = tx.send(CheckpointRequest::Flush(ack));
                done
            });
            info!(
                segments = shared.segments.len(),
                elapsed_secs = shared.elapsed_secs,
                "recording stopped"
            );
            (shared.segments.clone(), flushed)
        };

        if let Some(done) = flushed {
            let _ = done.await;
        }
        segments
    }

    /// Hard reset to `Idle`.
    ///
    /// An active capture is stopped without a checkpoint. Pending checkpoint
    /// results for the discarded session are ignored.
    pub async fn clear(&self) {
        let _op = self.ops.lock().await;
        let mut shared = self.shared.lock().await;
        if shared.state.is_active() {
            debug!("clearing an active recording");
        }
        shared.reset();
    }
}

impl<I, E, S> Drop for RecordingSession<I, E, S>
where
    I: AudioInput,
    E: MediaEncoder,
    S: CheckpointStore + 'static,
{
    fn drop(&mut self) {
        if let Ok(mut shared) = self.shared.try_lock() {
            shared.release_stream();
            shared.abort_tasks();
        }
    }
}

/// Append encoder output to the session and checkpoint after each append.
async fn run_pump(
    shared: Weak<Mutex<Shared>>,
    generation: u64,
    mut events: mpsc::UnboundedReceiver<CaptureEvent>,
) {
    while let Some(event) = events.recv().await {
        let Some(session) = shared.upgrade() else {
            return;
        };
        let mut guard = session.lock().await;
        if guard.generation != generation {
            return;
        }
        match event {
            CaptureEvent::Segment(segment) => {
                if segment.is_empty() || !guard.state.is_active() {
                    continue;
                }
                if segment.codec() != &guard.codec {
                    warn!(
                        expected = %guard.codec,
                        actual = %segment.codec(),
                        "dropping segment with mismatched codec"
                    );
                    continue;
                }
                guard.segments.push(segment);
                guard.dispatch_checkpoint();
            }
            CaptureEvent::Error(message) => {
                warn!(status = %guard.state.status(), error = %message, "encoder error");
            }
        }
    }
}

/// Advance the elapsed counter once per second while `Recording`.
async fn run_clock(shared: Weak<Mutex<Shared>>, generation: u64) {
    let period = StdDuration::from_secs(1);
    let mut ticker = time::interval_at(Instant::now() + period, period);
    loop {
        ticker.tick().await;
        let Some(session) = shared.upgrade() else {
            return;
        };
        let mut guard = session.lock().await;
        if guard.generation != generation {
            return;
        }
        if guard.state.is_recording() {
            guard.elapsed_secs += 1;
        }
    }
}

/// Current id for `generation`, or `None` if that session is gone
async fn current_id(
    shared: &Weak<Mutex<Shared>>,
    generation: u64,
) -> Option<Option<SessionId>> {
    let session = shared.upgrade()?;
    let guard = session.lock().await;
    (guard.generation == generation).then(|| guard.id.clone())
}

/// Write checkpoints one at a time, in dispatch order.
async fn run_checkpointer<S>(
    store: Arc<S>,
    shared: Weak<Mutex<Shared>>,
    mut requests: mpsc::UnboundedReceiver<CheckpointRequest>,
) where
    S: CheckpointStore + 'static,
{
    while let Some(request) = requests.recv().await {
        let snapshot = match request {
            CheckpointRequest::Flush(ack) => {
                let _ = ack.send(());
                continue;
            }
            CheckpointRequest::Write(snapshot) => snapshot,
        };

        let Some(id) = current_id(&shared, snapshot.generation).await else {
            continue;
        };

        let result = store
            .checkpoint(
                id.as_ref(),
                &snapshot.segments,
                snapshot.status,
                snapshot.elapsed_secs,
            )
            .await;

        match result {
            Ok(written) => {
                let Some(session) = shared.upgrade() else {
                    continue;
                };
                let mut guard = session.lock().await;
                if guard.generation == snapshot.generation && guard.id.is_none() {
                    info!(session = %written, "session checkpointed");
                    guard.id = Some(written);
                }
            }
            Err(e) => {
                warn!(error = %e, status = %snapshot.status, "checkpoint failed; capture continues");
            }
        }
    }
}
