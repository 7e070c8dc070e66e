//! Command runners

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration as StdDuration;

use tokio::fs;
use tracing::debug;

use crate::application::ports::{ArtifactRef, ConfigStore, PlaybackProbe, ProbeOutcome};
use crate::application::{
    AudioComposer, ComposerConfig, DurationEstimator, DurationSource, ForwardCallbacks,
    ForwardInput, ForwardMessageUseCase, RecordingConfig, RecordingSession,
};
use crate::domain::config::AppConfig;
use crate::domain::recording::{Codec, Duration, EncodedArtifact, EncodedSegment};
use crate::infrastructure::{
    ArtifactLoader, CpalInput, JsonCheckpointStore, OutboxUploader, RodioProbe, SymphoniaDecoder,
    SymphoniaMetadataReader, TimesliceEncoder, XdgConfigStore,
};

use super::presenter::Presenter;
use super::signals::ShutdownSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

const PROGRESS_TICK: StdDuration = StdDuration::from_millis(250);

/// Options for `record`
#[derive(Debug, Clone)]
pub struct RecordOptions {
    pub duration: Duration,
    pub output: Option<PathBuf>,
}

/// Record from the default microphone until the duration elapses or the
/// user interrupts, then write the assembled artifact.
pub async fn run_record(options: RecordOptions, config: &AppConfig) -> ExitCode {
    let mut presenter = Presenter::new();

    let shutdown = ShutdownSignal::new();
    if let Err(e) = shutdown.setup().await {
        presenter.error(&format!("Failed to setup signal handler: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }

    let session = RecordingSession::new(
        CpalInput::new(),
        TimesliceEncoder::new(config.timeslice_or_default()),
        JsonCheckpointStore::new(config.state_dir_or_default()),
        RecordingConfig {
            codecs: config.codecs_or_default(),
            ..Default::default()
        },
    );

    if let Err(e) = session.start().await {
        debug!(error = %e, "recording failed to start");
        presenter.error(&e.user_message());
        return ExitCode::from(EXIT_ERROR);
    }

    let limit = options.duration.as_secs();
    presenter.start_spinner("Recording... (Ctrl+C to stop)");

    let mut ticker = tokio::time::interval(PROGRESS_TICK);
    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            _ = ticker.tick() => {
                let elapsed = session.elapsed_secs().await;
                presenter.update_recording_progress(elapsed, limit);
                if elapsed >= limit {
                    presenter.warn("Duration reached, stopping");
                    break;
                }
            }
        }
    }

    let elapsed = session.elapsed_secs().await;
    let codec = session.codec().await;
    let segments = session.stop().await;
    let id = session.id().await;

    if segments.is_empty() {
        presenter.spinner_fail("No audio was captured");
        return ExitCode::from(EXIT_ERROR);
    }

    let artifact = EncodedArtifact::assemble(codec, &segments);
    presenter.spinner_success(&format!(
        "Recorded {}s ({})",
        elapsed,
        artifact.human_readable_size()
    ));

    let output = options.output.unwrap_or_else(|| {
        let stem = id
            .as_ref()
            .map(|id| id.as_str().to_string())
            .unwrap_or_else(|| "recording".to_string());
        PathBuf::from(format!("voxrelay-{}.{}", stem, artifact.codec().extension()))
    });

    if let Err(e) = fs::write(&output, artifact.bytes()).await {
        presenter.error(&format!("Failed to write {}: {}", output.display(), e));
        return ExitCode::from(EXIT_ERROR);
    }
    if let Some(id) = id {
        presenter.info(&format!("Session {} checkpointed", id));
    }
    presenter.output(&output.to_string_lossy());
    ExitCode::from(EXIT_SUCCESS)
}

/// Join two files into one artifact
pub async fn run_compose(
    preamble: &Path,
    original: &Path,
    output: &Path,
    config: &AppConfig,
) -> ExitCode {
    let mut presenter = Presenter::new();

    let (preamble_bytes, original_bytes) = match (fs::read(preamble).await, fs::read(original).await)
    {
        (Ok(p), Ok(o)) => (p, o),
        (Err(e), _) => return read_failed(&presenter, preamble, e),
        (_, Err(e)) => return read_failed(&presenter, original, e),
    };

    presenter.start_spinner("Composing...");
    let composer = build_composer(config);
    let composed = match composer.compose(&preamble_bytes, &original_bytes).await {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "composition failed");
            presenter.spinner_fail(&e.user_message());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if let Err(e) = fs::write(output, composed.artifact.bytes()).await {
        presenter.spinner_fail(&format!("Failed to write {}: {}", output.display(), e));
        return ExitCode::from(EXIT_ERROR);
    }
    presenter.spinner_success(&format!(
        "Composed {:.1}s at {} Hz ({})",
        composed.duration_secs,
        composed.sample_rate,
        composed.artifact.human_readable_size()
    ));
    presenter.output(&output.to_string_lossy());
    ExitCode::from(EXIT_SUCCESS)
}

/// Compose, validate and hand off to the outbox
pub async fn run_forward(
    preamble: &Path,
    original: &str,
    outbox: PathBuf,
    config: &AppConfig,
) -> ExitCode {
    let mut presenter = Presenter::new();

    let bytes = match fs::read(preamble).await {
        Ok(b) => b,
        Err(e) => return read_failed(&presenter, preamble, e),
    };
    let segments = if bytes.is_empty() {
        Vec::new()
    } else {
        vec![EncodedSegment::new(bytes, codec_for(preamble))]
    };

    let use_case = ForwardMessageUseCase::new(
        ArtifactLoader::new(),
        build_composer(config),
        build_estimator(config),
        RodioProbe::new(),
        OutboxUploader::new(outbox),
    );

    presenter.start_spinner("Forwarding...");
    let spinner = presenter.spinner_handle();
    let callbacks = ForwardCallbacks {
        on_stage: Some(Box::new(move |stage| {
            if let Some(ref s) = spinner {
                s.set_message(Presenter::stage_message(stage));
            }
        })),
    };

    let input = ForwardInput {
        preamble: segments,
        original: ArtifactRef::parse(original),
    };

    match use_case.execute(input, &callbacks).await {
        Ok(output) => {
            presenter.spinner_success(&format!(
                "Forwarded {}s message ({})",
                output.duration_secs, output.artifact_size
            ));
            presenter.output(&output.receipt.location);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            debug!(error = %e, "forward failed");
            presenter.spinner_fail(&e.user_message());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Report playability and estimated duration
pub async fn run_probe(file: &Path, config: &AppConfig) -> ExitCode {
    let presenter = Presenter::new();
    let bytes = match fs::read(file).await {
        Ok(b) => b,
        Err(e) => return read_failed(&presenter, file, e),
    };
    let artifact = EncodedArtifact::new(bytes, codec_for(file));

    let estimate = build_estimator(config)
        .estimate_detailed(artifact.bytes())
        .await;
    let source = match estimate.source {
        DurationSource::Metadata => "metadata",
        DurationSource::Heuristic => "size estimate",
    };

    match RodioProbe::new().probe(&artifact).await {
        ProbeOutcome::Ready(decoded) => {
            presenter.success(&format!(
                "Playable, {:.1}s decoded ({})",
                decoded.as_secs_f64(),
                artifact.human_readable_size()
            ));
            presenter.output(&format!("{}s ({})", estimate.seconds, source));
            ExitCode::from(EXIT_SUCCESS)
        }
        ProbeOutcome::Failed(reason) => {
            presenter.error(&format!("Not playable: {}", reason));
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Play a file through the default output device
pub async fn run_play(file: &Path) -> ExitCode {
    let presenter = Presenter::new();
    let bytes = match fs::read(file).await {
        Ok(b) => b,
        Err(e) => return read_failed(&presenter, file, e),
    };
    let artifact = EncodedArtifact::new(bytes, codec_for(file));

    match RodioProbe::new().play(&artifact).await {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Configured output codec first, then the offline encoder's own formats
fn composer_codecs(config: &AppConfig) -> Vec<Codec> {
    let mut codecs = vec![config.compose_codec_or_default()];
    for fallback in [Codec::flac(), Codec::wav()] {
        if !codecs.contains(&fallback) {
            codecs.push(fallback);
        }
    }
    codecs
}

fn build_composer(config: &AppConfig) -> AudioComposer<SymphoniaDecoder, TimesliceEncoder> {
    AudioComposer::new(
        SymphoniaDecoder::new(config.render_sample_rate_or_default()),
        TimesliceEncoder::offline(),
        ComposerConfig {
            codecs: composer_codecs(config),
            ..Default::default()
        },
    )
}

fn build_estimator(config: &AppConfig) -> DurationEstimator<SymphoniaMetadataReader> {
    DurationEstimator::with_timeout(
        SymphoniaMetadataReader::new(),
        config.metadata_timeout_or_default(),
    )
}

fn codec_for(path: &Path) -> Codec {
    path.extension()
        .and_then(|e| e.to_str())
        .map(Codec::from_extension)
        .unwrap_or_default()
}

fn read_failed(presenter: &Presenter, path: &Path, e: std::io::Error) -> ExitCode {
    presenter.error(&format!("Failed to read {}: {}", path.display(), e));
    ExitCode::from(EXIT_ERROR)
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|e| {
        debug!(error = %e, "ignoring unreadable config file");
        AppConfig::empty()
    });

    let env_config = AppConfig {
        state_dir: env_var("VOXRELAY_STATE_DIR"),
        outbox_dir: env_var("VOXRELAY_OUTBOX_DIR"),
        ..Default::default()
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}

fn env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}
