//! Command implementations

use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{info, warn};

use crate::app::{AppContainer, FileReport};
use crate::error::Mkv2Ac3Result;
use crate::utils::discovery::discover_inputs;
use crate::utils::time::format_elapsed;

/// Outcome of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub elapsed_ms: u64,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub files: Vec<FileReport>,
}

impl RunReport {
    pub fn new(started_at: DateTime<Local>, finished_at: DateTime<Local>, files: Vec<FileReport>) -> Self {
        let elapsed_ms = u64::try_from((finished_at - started_at).num_milliseconds()).unwrap_or(0);
        Self {
            started_at,
            finished_at,
            elapsed_ms,
            converted: files.iter().filter(|file| file.is_done()).count(),
            skipped: files.iter().filter(|file| file.is_skipped()).count(),
            failed: files.iter().filter(|file| file.is_failed()).count(),
            files,
        }
    }

    /// Write the report as pretty-printed JSON
    pub fn write(&self, path: &Path) -> Mkv2Ac3Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::from)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Log the per-run summary
    pub fn log_summary(&self) {
        let elapsed = std::time::Duration::from_millis(self.elapsed_ms);
        info!(
            "{} converted, {} skipped, {} failed in {}",
            self.converted,
            self.skipped,
            self.failed,
            format_elapsed(elapsed)
        );
    }
}

/// Execute the convert command over every discovered input
pub async fn convert(container: &dyn AppContainer) -> Mkv2Ac3Result<RunReport> {
    let interactor = container.convert_interactor();
    let config = interactor.config();

    let started_at = Local::now();
    let inputs = discover_inputs(&config.inputs, config.recursive);
    if inputs.is_empty() {
        warn!("No Matroska files to process");
    } else {
        info!("Processing {} file(s)", inputs.len());
    }

    let files = interactor.convert_all(&inputs).await;
    let report = RunReport::new(started_at, Local::now(), files);
    report.log_summary();

    if let Some(path) = &config.report {
        report.write(path)?;
        info!("Wrote run report to {}", path.display());
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::FileOutcome;
    use std::path::PathBuf;

    fn file(outcome: FileOutcome) -> FileReport {
        FileReport {
            source: PathBuf::from("movie.mkv"),
            outcome,
            elapsed_ms: 10,
        }
    }

    #[test]
    fn test_report_counts_outcomes() {
        let started = Local::now();
        let finished = started + chrono::Duration::milliseconds(1200);
        let report = RunReport::new(
            started,
            finished,
            vec![
                file(FileOutcome::Done {
                    tracks: vec![1],
                    outputs: vec![PathBuf::from("movie.mkv")],
                }),
                file(FileOutcome::Skipped {
                    reason: "already converted".to_string(),
                }),
            ],
        );

        assert_eq!(report.converted, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(report.elapsed_ms, 1200);
    }

    #[test]
    fn test_report_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let now = Local::now();

        RunReport::new(now, now, Vec::new()).write(&path).unwrap();

        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["converted"], 0);
        assert!(written["files"].as_array().unwrap().is_empty());
    }
}
