use super::*;

fn executed(status: i32) -> ToolOutput {
    ToolOutput {
        status: Some(status),
        stderr: vec!["Error: broken stream".to_string()],
        executed: true,
        ..Default::default()
    }
}

fn transcode_error(message: String) -> Mkv2Ac3Error {
    Mkv2Ac3Error::TranscodeFailure { track_id: 1, message }
}

#[test]
fn test_check_step_skips_unexecuted_commands() {
    let missing = Path::new("/nonexistent/out.ac3");
    assert!(check_step(&ToolOutput::not_executed(), missing, transcode_error).is_ok());
}

#[test]
fn test_check_step_reports_exit_status() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("out.ac3");
    fs::write(&artifact, b"data").unwrap();

    let err = check_step(&executed(1), &artifact, transcode_error).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("exit status 1"));
    assert!(message.contains("Error: broken stream"));
}

#[test]
fn test_check_step_rejects_missing_and_empty_output() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("out.ac3");

    let err = check_step(&executed(0), &artifact, transcode_error).unwrap_err();
    assert!(err.to_string().contains("was not created"));

    fs::write(&artifact, b"").unwrap();
    let err = check_step(&executed(0), &artifact, transcode_error).unwrap_err();
    assert!(err.to_string().contains("is empty"));

    fs::write(&artifact, b"ac3").unwrap();
    assert!(check_step(&executed(0), &artifact, transcode_error).is_ok());
}

#[test]
fn test_initial_delay_read_from_timecode_file() {
    let dir = tempfile::tempdir().unwrap();
    let timecodes = dir.path().join("Movie_track1.tc");
    fs::write(&timecodes, "# timestamp format v2\n-42\n-10\n").unwrap();

    assert_eq!(initial_delay(&executed(0), &timecodes), Some(-42));
    assert_eq!(initial_delay(&ToolOutput::not_executed(), &timecodes), None);
    assert_eq!(initial_delay(&executed(0), &dir.path().join("missing.tc")), None);
}

#[test]
fn test_beside_keeps_file_name() {
    assert_eq!(
        beside(Path::new("/out"), Path::new("/tmp/w/Movie_track1.ac3")),
        PathBuf::from("/out/Movie_track1.ac3")
    );
}

#[test]
fn test_report_serialization() {
    let report = FileReport {
        source: PathBuf::from("/media/Movie.mkv"),
        outcome: FileOutcome::Failed {
            stage: Stage::Remux,
            error: "Remux failed: exit status 2".to_string(),
        },
        elapsed_ms: 1500,
    };

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"], "failed");
    assert_eq!(json["stage"], "remux");
    assert_eq!(json["elapsed_ms"], 1500);
    assert!(report.is_failed());
}
