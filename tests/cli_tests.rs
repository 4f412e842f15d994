use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn mkv2ac3() -> Command {
    let mut cmd = Command::cargo_bin("mkv2ac3").unwrap();
    cmd.env_remove("MKV2AC3_CONFIG")
        .env_remove("MKV2AC3_FFMPEG_PATH")
        .env_remove("MKV2AC3_MKVTOOLNIX_PATH")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_options() {
    mkv2ac3()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--position"))
        .stdout(predicate::str::contains("--mkvtoolnix-path"))
        .stdout(predicate::str::contains("--all-tracks"));
}

#[test]
fn test_inputs_are_required() {
    mkv2ac3().assert().failure();
}

#[test]
fn test_missing_tools_exit_non_zero() {
    let empty = tempfile::tempdir().unwrap();
    let movie = empty.path().join("Movie.mkv");
    fs::write(&movie, b"matroska").unwrap();

    mkv2ac3()
        .arg("--mkvtoolnix-path")
        .arg(empty.path())
        .arg("--ffmpeg-path")
        .arg(empty.path())
        .arg(&movie)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Required tools are missing"))
        .stderr(predicate::str::contains("mkvmerge"));

    assert_eq!(fs::read(&movie).unwrap(), b"matroska");
}

#[test]
fn test_external_override_warning_is_logged() {
    let empty = tempfile::tempdir().unwrap();
    let movie = empty.path().join("Movie.mkv");
    fs::write(&movie, b"matroska").unwrap();

    mkv2ac3()
        .args(["--external", "--dont-retain", "--mkvtoolnix-path"])
        .arg(empty.path())
        .arg("--ffmpeg-path")
        .arg(empty.path())
        .arg(&movie)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--external ignores --dont-retain and --default"));
}

#[test]
fn test_invalid_config_file_exit_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("mkv2ac3.toml");
    fs::write(&config, "[mkv2ac3]\nbitrate = 640\n").unwrap();

    mkv2ac3()
        .arg("--config")
        .arg(&config)
        .arg("Movie.mkv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_invalid_position_exit_non_zero() {
    mkv2ac3()
        .args(["--position", "middle", "Movie.mkv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid position"));
}
