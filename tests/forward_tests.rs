//! Forward flow integration tests with an HTTP-hosted original

mod common;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use voxrelay::application::ports::{ArtifactFetcher, ArtifactRef, FetchError};
use voxrelay::application::{
    AudioComposer, ComposerConfig, DurationEstimator, ForwardCallbacks, ForwardError,
    ForwardInput, ForwardMessageUseCase,
};
use voxrelay::domain::recording::{Codec, EncodedSegment};
use voxrelay::infrastructure::artifacts::OutboxEntry;
use voxrelay::infrastructure::{
    ArtifactLoader, OutboxUploader, RodioProbe, SymphoniaDecoder, SymphoniaMetadataReader,
    TimesliceEncoder,
};

type Forwarder = ForwardMessageUseCase<
    ArtifactLoader,
    SymphoniaDecoder,
    TimesliceEncoder,
    SymphoniaMetadataReader,
    RodioProbe,
    OutboxUploader,
>;

fn forwarder(outbox: &TempDir) -> Forwarder {
    ForwardMessageUseCase::new(
        ArtifactLoader::new(),
        AudioComposer::new(
            SymphoniaDecoder::new(48000),
            TimesliceEncoder::offline(),
            ComposerConfig::default(),
        ),
        DurationEstimator::new(SymphoniaMetadataReader::new()),
        RodioProbe::new(),
        OutboxUploader::new(outbox.path()),
    )
}

fn preamble() -> Vec<EncodedSegment> {
    vec![EncodedSegment::new(common::wav_bytes(16000, 1, 2.0), Codec::wav())]
}

#[tokio::test]
async fn forwards_remote_original_into_outbox() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/messages/42"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(common::wav_bytes(22050, 1, 10.0)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outbox = TempDir::new().unwrap();
    let input = ForwardInput {
        preamble: preamble(),
        original: ArtifactRef::parse(&format!("{}/messages/42", server.uri())),
    };
    let output = forwarder(&outbox)
        .execute(input, &ForwardCallbacks::default())
        .await
        .unwrap();

    assert_eq!(output.duration_secs, 12);
    assert!(output.receipt.location.ends_with(".flac"));

    let sidecar = outbox.path().join(format!("{}.json", output.receipt.id));
    let entry: OutboxEntry = serde_json::from_slice(&std::fs::read(sidecar).unwrap()).unwrap();
    assert_eq!(entry.duration_secs, 12);
    assert_eq!(entry.codec, Codec::flac());
}

#[tokio::test]
async fn missing_remote_original_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let outbox = TempDir::new().unwrap();
    let input = ForwardInput {
        preamble: preamble(),
        original: ArtifactRef::parse(&format!("{}/messages/gone", server.uri())),
    };
    let err = forwarder(&outbox)
        .execute(input, &ForwardCallbacks::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ForwardError::FetchFailed(FetchError::NotFound(_))));
    assert_eq!(std::fs::read_dir(outbox.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn loader_reports_server_errors_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let url = format!("{}/messages/1", server.uri());
    let err = ArtifactLoader::new()
        .fetch(&ArtifactRef::parse(&url))
        .await
        .unwrap_err();
    match err {
        FetchError::Status { status, url: failed } => {
            assert_eq!(status, 503);
            assert_eq!(failed, url);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn empty_preamble_is_rejected_before_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outbox = TempDir::new().unwrap();
    let input = ForwardInput {
        preamble: Vec::new(),
        original: ArtifactRef::parse(&format!("{}/messages/1", server.uri())),
    };
    let err = forwarder(&outbox)
        .execute(input, &ForwardCallbacks::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ForwardError::EmptyPreamble));
}
