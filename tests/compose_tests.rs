//! Composition integration tests over real decoders and encoders

mod common;

use voxrelay::application::ports::{PlaybackProbe, ProbeOutcome};
use voxrelay::application::{
    AudioComposer, ComposeError, ComposerConfig, DurationEstimator, DurationSource, TrackRole,
};
use voxrelay::domain::recording::Codec;
use voxrelay::infrastructure::{
    RodioProbe, SymphoniaDecoder, SymphoniaMetadataReader, TimesliceEncoder,
};

fn composer(codecs: Vec<Codec>) -> AudioComposer<SymphoniaDecoder, TimesliceEncoder> {
    AudioComposer::new(
        SymphoniaDecoder::new(48000),
        TimesliceEncoder::offline(),
        ComposerConfig {
            codecs,
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn preamble_and_original_join_into_flac() {
    let preamble = common::wav_bytes(16000, 1, 2.0);
    let original = common::wav_bytes(44100, 2, 10.0);

    let composed = composer(vec![Codec::flac(), Codec::wav()])
        .compose(&preamble, &original)
        .await
        .unwrap();

    assert_eq!(composed.artifact.codec(), &Codec::flac());
    assert_eq!(&composed.artifact.bytes()[..4], b"fLaC");
    assert_eq!(composed.sample_rate, 48000);
    assert_eq!(composed.channels, 2);
    assert!((composed.duration_secs - 12.0).abs() < 0.01);

    match RodioProbe::new().probe(&composed.artifact).await {
        ProbeOutcome::Ready(d) => assert!((d.as_secs_f64() - 12.0).abs() < 0.1, "{:?}", d),
        ProbeOutcome::Failed(reason) => panic!("composed flac not playable: {}", reason),
    }
}

#[tokio::test]
async fn mixed_input_rates_render_at_decoder_rate() {
    let preamble = common::wav_bytes(8000, 1, 1.0);
    let original = common::wav_bytes(16000, 1, 1.0);

    let composed = composer(vec![Codec::wav()])
        .compose(&preamble, &original)
        .await
        .unwrap();

    assert_eq!(composed.sample_rate, 48000);
    assert_eq!(composed.frame_count, 2 * 48000);
    assert_eq!(common::wav_sample_count(composed.artifact.bytes()), 2 * 48000);
    let rendered_secs = composed.frame_count as f64 / composed.sample_rate as f64;
    assert!((composed.duration_secs - rendered_secs).abs() < 1e-9);
}

#[tokio::test]
async fn wav_output_reports_duration_from_metadata() {
    let preamble = common::wav_bytes(8000, 1, 2.0);
    let original = common::wav_bytes(8000, 1, 10.0);

    let composed = composer(vec![Codec::wav()])
        .compose(&preamble, &original)
        .await
        .unwrap();
    assert_eq!(composed.artifact.codec(), &Codec::wav());
    assert_eq!(composed.frame_count, 12 * 48000);
    assert_eq!(common::wav_sample_count(composed.artifact.bytes()), 12 * 48000);

    let estimate = DurationEstimator::new(SymphoniaMetadataReader::new())
        .estimate_detailed(composed.artifact.bytes())
        .await;
    assert_eq!(estimate.source, DurationSource::Metadata);
    assert_eq!(estimate.seconds, 12);
}

#[tokio::test]
async fn unsupported_preferences_fall_back_to_platform_default() {
    let preamble = common::wav_bytes(8000, 1, 1.0);
    let original = common::wav_bytes(8000, 1, 1.0);

    let composed = composer(vec!["audio/webm;codecs=opus".parse().unwrap()])
        .compose(&preamble, &original)
        .await
        .unwrap();
    assert_eq!(composed.artifact.codec(), &Codec::wav());
}

#[tokio::test]
async fn undecodable_original_names_the_track() {
    let preamble = common::wav_bytes(8000, 1, 1.0);

    let err = composer(vec![Codec::flac()])
        .compose(&preamble, b"definitely not audio")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ComposeError::DecodeFailed {
            which: TrackRole::Original,
            ..
        }
    ));
}

#[tokio::test]
async fn estimator_falls_back_to_size_for_opaque_blobs() {
    let estimate = DurationEstimator::new(SymphoniaMetadataReader::new())
        .estimate_detailed(&vec![0u8; 10 * 1024])
        .await;
    assert_eq!(estimate.source, DurationSource::Heuristic);
    assert_eq!(estimate.seconds, 10);
}
