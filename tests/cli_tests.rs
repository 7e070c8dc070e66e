//! CLI integration tests

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary with config and data directories isolated under `home`
fn voxrelay(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("voxrelay").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env_remove("VOXRELAY_STATE_DIR")
        .env_remove("VOXRELAY_OUTBOX_DIR")
        .env_remove("VOXRELAY_LOG");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    voxrelay(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("record"))
        .stdout(predicate::str::contains("compose"))
        .stdout(predicate::str::contains("forward"))
        .stdout(predicate::str::contains("probe"))
        .stdout(predicate::str::contains("sessions"));
}

#[test]
fn version_output() {
    let home = TempDir::new().unwrap();
    voxrelay(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("voxrelay"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    let home = TempDir::new().unwrap();
    voxrelay(&home).assert().code(2);
}

#[test]
fn invalid_record_duration_is_a_usage_error() {
    let home = TempDir::new().unwrap();
    voxrelay(&home)
        .args(["record", "--duration", "soon"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid duration"));
}

#[test]
fn config_path_is_under_xdg_home() {
    let home = TempDir::new().unwrap();
    voxrelay(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("voxrelay"))
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn config_set_then_get() {
    let home = TempDir::new().unwrap();
    voxrelay(&home)
        .args(["config", "set", "compose.sample_rate", "44100"])
        .assert()
        .success();
    voxrelay(&home)
        .args(["config", "get", "compose.sample_rate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("44100"));
}

#[test]
fn config_rejects_unknown_key_and_bad_values() {
    let home = TempDir::new().unwrap();
    voxrelay(&home)
        .args(["config", "get", "api_key"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown key"));
    voxrelay(&home)
        .args(["config", "set", "max_duration", "10m"])
        .assert()
        .code(1);
}

#[test]
fn hand_edited_bad_compose_codec_is_ignored() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("config/voxrelay");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        "[compose]\ncodec = \"audio/webm;codecs=opus\"\nsample_rate = 44100\n",
    )
    .unwrap();

    voxrelay(&home)
        .args(["config", "get", "compose.codec"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(not set)"))
        .stderr(predicate::str::contains("compose.codec"));
    voxrelay(&home)
        .args(["config", "get", "compose.sample_rate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("44100"));
}

#[test]
fn config_init_twice_fails() {
    let home = TempDir::new().unwrap();
    voxrelay(&home).args(["config", "init"]).assert().success();
    voxrelay(&home).args(["config", "init"]).assert().code(1);
}

#[test]
fn compose_writes_joined_artifact() {
    let home = TempDir::new().unwrap();
    let preamble = common::write_wav(home.path(), "intro.wav", 16000, 1, 2.0);
    let original = common::write_wav(home.path(), "message.wav", 16000, 1, 3.0);
    let output = home.path().join("joined.flac");

    voxrelay(&home)
        .arg("compose")
        .arg(&preamble)
        .arg(&original)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("joined.flac"));

    let bytes = std::fs::read(&output).unwrap();
    assert_eq!(&bytes[..4], b"fLaC");
}

#[test]
fn compose_with_missing_input_fails() {
    let home = TempDir::new().unwrap();
    voxrelay(&home)
        .args(["compose", "nope.wav", "nada.wav", "-o", "out.flac"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn probe_reports_duration() {
    let home = TempDir::new().unwrap();
    let file = common::write_wav(home.path(), "msg.wav", 8000, 1, 4.0);
    voxrelay(&home)
        .arg("probe")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("4s (metadata)"));
}

#[test]
fn probe_rejects_garbage() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("junk.wav");
    std::fs::write(&file, b"not audio at all").unwrap();
    voxrelay(&home)
        .arg("probe")
        .arg(&file)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Not playable"));
}

#[test]
fn forward_local_original_into_outbox() {
    let home = TempDir::new().unwrap();
    let preamble = common::write_wav(home.path(), "intro.wav", 16000, 1, 1.0);
    let original = common::write_wav(home.path(), "message.wav", 16000, 1, 2.0);
    let outbox = home.path().join("outbox");

    voxrelay(&home)
        .arg("forward")
        .arg("--preamble")
        .arg(&preamble)
        .arg("--original")
        .arg(&original)
        .arg("--outbox")
        .arg(&outbox)
        .assert()
        .success()
        .stdout(predicate::str::contains(".flac"));

    let json_files = std::fs::read_dir(&outbox)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|x| x == "json"))
        .count();
    assert_eq!(json_files, 1);
}

#[test]
fn sessions_list_on_empty_state_dir() {
    let home = TempDir::new().unwrap();
    voxrelay(&home)
        .args(["sessions", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No sessions"));
}

#[test]
fn sessions_export_unknown_id_fails() {
    let home = TempDir::new().unwrap();
    voxrelay(&home)
        .args(["sessions", "export", "missing", "-o"])
        .arg(home.path().join("out.wav"))
        .assert()
        .code(1);
}
