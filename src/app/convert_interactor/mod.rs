// Convert interactor - Orchestrates the conversion of one container at a time

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tempfile::TempDir;
use tracing::{debug, error, info, warn};

use crate::adapters::exec_process::ExecutionMode;
use crate::config_initialization::RunConfig;
use crate::domain::errors::DomainError;
use crate::domain::model::{ContainerSnapshot, ProbeResult, TrackRecord};
use crate::domain::rules::TrackSelector;
use crate::engine::progress::LogProgress;
use crate::engine::Toolchain;
use crate::error::{Mkv2Ac3Error, Mkv2Ac3Result};
use crate::output::{work_output, OutputFormat, Relocator};
use crate::planner::{ConversionPlan, ConversionPlanner, RemuxPlanner};
use crate::ports::{ToolOutput, ToolRunner};
use crate::probe::{parse_initial_delay, StreamProber, TrackInspector};
use crate::utils::path::{file_stem, track_artifact};
use crate::utils::time::format_elapsed;

#[cfg(test)]
mod tests;

/// Pipeline stage a file failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Inspect,
    Select,
    Extract,
    Probe,
    Transcode,
    Remux,
    Repackage,
    Relocate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Inspect => "inspect",
            Stage::Select => "select",
            Stage::Extract => "extract",
            Stage::Probe => "probe",
            Stage::Transcode => "transcode",
            Stage::Remux => "remux",
            Stage::Repackage => "repackage",
            Stage::Relocate => "relocate",
        };
        write!(f, "{}", name)
    }
}

/// How a file ended
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileOutcome {
    Done {
        tracks: Vec<u32>,
        outputs: Vec<PathBuf>,
    },
    Skipped {
        reason: String,
    },
    Failed {
        stage: Stage,
        error: String,
    },
}

/// Result of processing one input file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub source: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
    pub elapsed_ms: u64,
}

impl FileReport {
    pub fn is_done(&self) -> bool {
        matches!(self.outcome, FileOutcome::Done { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, FileOutcome::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, FileOutcome::Failed { .. })
    }
}

/// Error tagged with the stage it happened in
#[derive(Debug)]
struct Failure {
    stage: Stage,
    error: Mkv2Ac3Error,
}

fn at(stage: Stage) -> impl FnOnce(Mkv2Ac3Error) -> Failure {
    move |error| Failure { stage, error }
}

/// Interactor for the conversion use case
pub struct ConvertInteractor {
    runner: Arc<dyn ToolRunner>,
    toolchain: Toolchain,
    config: Arc<RunConfig>,
    relocator: Relocator,
}

impl ConvertInteractor {
    /// Create new convert interactor with injected runner
    pub fn new(runner: Arc<dyn ToolRunner>, toolchain: Toolchain, config: Arc<RunConfig>) -> Self {
        let relocator = Relocator::new(config.overwrite);
        Self {
            runner,
            toolchain,
            config,
            relocator,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Convert files one after another; a failed file never stops the batch
    pub async fn convert_all(&self, inputs: &[PathBuf]) -> Vec<FileReport> {
        let mut reports = Vec::with_capacity(inputs.len());
        for (index, source) in inputs.iter().enumerate() {
            info!("[{}/{}] {}", index + 1, inputs.len(), source.display());
            reports.push(self.convert_file(source).await);
        }
        reports
    }

    /// Run the whole pipeline for one container
    pub async fn convert_file(&self, source: &Path) -> FileReport {
        let started = Instant::now();

        let outcome = match self.run_pipeline(source).await {
            Ok((tracks, outputs)) => FileOutcome::Done { tracks, outputs },
            Err(Failure { error, .. }) if error.is_skip() => {
                info!("Skipping {}: {}", source.display(), error);
                FileOutcome::Skipped {
                    reason: error.to_string(),
                }
            }
            Err(Failure { stage, error }) => {
                error!("{} failed during {}: {}", source.display(), stage, error);
                FileOutcome::Failed {
                    stage,
                    error: error.to_string(),
                }
            }
        };

        let elapsed = started.elapsed();
        if matches!(outcome, FileOutcome::Done { .. }) {
            info!("Finished {} in {}", source.display(), format_elapsed(elapsed));
        }

        FileReport {
            source: source.to_path_buf(),
            outcome,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }

    async fn run_pipeline(&self, source: &Path) -> Result<(Vec<u32>, Vec<PathBuf>), Failure> {
        let snapshot = self.inspect(source).await.map_err(at(Stage::Inspect))?;

        if snapshot.has_ac3() && !self.config.force {
            return Err(at(Stage::Select)(Mkv2Ac3Error::AlreadyConverted {
                path: source.to_path_buf(),
            }));
        }

        let selected = TrackSelector::select(&snapshot, self.config.track, self.config.all_tracks);
        if selected.is_empty() {
            return Err(at(Stage::Select)(Mkv2Ac3Error::NoSupportedTrack {
                path: source.to_path_buf(),
            }));
        }
        debug!("Selected tracks {:?}", selected);

        let work = self.create_work_dir().map_err(at(Stage::Extract))?;
        let result = self.convert_tracks(source, &snapshot, &selected, work.path()).await;
        self.release_work_dir(work, result.is_ok());

        result.map(|outputs| (selected, outputs))
    }

    /// Track listing plus info dump merged into a snapshot
    async fn inspect(&self, source: &Path) -> Mkv2Ac3Result<ContainerSnapshot> {
        if !source.is_file() {
            return Err(Mkv2Ac3Error::InputFileNotFound {
                path: source.to_path_buf(),
            });
        }

        let listing = self.runner.run(&self.toolchain.identify(source)).await?;
        if !listing.success() {
            return Err(Mkv2Ac3Error::InspectionFailure {
                path: source.to_path_buf(),
                message: listing.last_message(),
            });
        }

        let dump = self.runner.run(&self.toolchain.info_dump(source)).await?;
        let dump_lines = if dump.success() {
            dump.stdout
        } else {
            warn!(
                "mkvinfo failed for {}, track details unavailable: {}",
                source.display(),
                dump.last_message()
            );
            Vec::new()
        };

        match TrackInspector::build_snapshot(source, &listing.stdout, &dump_lines) {
            Ok(snapshot) => {
                for track in snapshot.tracks() {
                    debug!(
                        "Track {}: {} {} [{}]",
                        track.track_id, track.kind, track.codec, track.language
                    );
                }
                Ok(snapshot)
            }
            Err(DomainError::ParseAmbiguity(message)) => {
                warn!("{}: {}", source.display(), message);
                Ok(ContainerSnapshot::new(source, Vec::new()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn convert_tracks(
        &self,
        source: &Path,
        snapshot: &ContainerSnapshot,
        selected: &[u32],
        work: &Path,
    ) -> Result<Vec<PathBuf>, Failure> {
        let mut plans = Vec::with_capacity(selected.len());
        for track in selected.iter().filter_map(|id| snapshot.get(*id)) {
            plans.push(self.convert_track(source, track, work).await?);
        }

        let artifact_dir = self.config.placement.artifact_dir(source);
        let mut outputs = Vec::new();

        if self.config.external {
            for plan in &plans {
                for target in &plan.targets {
                    outputs.push(self.place(&target.path, &beside(&artifact_dir, &target.path), false)?);
                }
            }
        } else {
            let container = self
                .remux(source, snapshot, &plans, work)
                .await
                .map_err(at(Stage::Remux))?;

            let container = match self.config.format {
                OutputFormat::Mp4 => self
                    .repackage(source, &container, work)
                    .await
                    .map_err(at(Stage::Repackage))?,
                OutputFormat::Matroska => container,
            };

            let destination = self.config.placement.destination(source, self.config.format);
            let replaces_source = destination == source;
            outputs.push(self.place(&container, &destination, replaces_source)?);
        }

        if self.config.keep_original {
            for plan in &plans {
                outputs.push(self.place(&plan.extracted, &beside(&artifact_dir, &plan.extracted), false)?);
            }
        }

        Ok(outputs)
    }

    /// Extract, probe and transcode one source track
    async fn convert_track(
        &self,
        source: &Path,
        track: &TrackRecord,
        work: &Path,
    ) -> Result<ConversionPlan, Failure> {
        let track_id = track.track_id;
        let extraction_error = |message| Mkv2Ac3Error::ExtractionFailure { track_id, message };

        let extracted = track_artifact(work, source, track_id, track.codec.extension());
        let timecodes = track_artifact(work, source, track_id, "tc");

        info!("Extracting track {} ({})", track_id, track.codec);
        let progress = LogProgress::new(format!("Extracting track {}", track_id));
        let extraction = self
            .runner
            .run_observed(&self.toolchain.extract_track(source, track_id, &extracted), &progress)
            .await
            .map_err(at(Stage::Extract))?;
        check_step(&extraction, &extracted, extraction_error).map_err(at(Stage::Extract))?;

        let timecode_output = self
            .runner
            .run(&self.toolchain.extract_timecodes(source, track_id, &timecodes))
            .await
            .map_err(at(Stage::Extract))?;
        check_step(&timecode_output, &timecodes, extraction_error).map_err(at(Stage::Extract))?;

        let mut track = track.clone();
        track.delay = initial_delay(&timecode_output, &timecodes);
        if let Some(delay) = track.delay {
            debug!("Track {} starts at {} ms", track_id, delay);
        }

        let probe = if extraction.executed {
            self.probe(&extracted).await.map_err(at(Stage::Probe))?
        } else {
            ProbeResult::default()
        };

        let plan = ConversionPlanner::plan(
            &track,
            &probe,
            track.delay,
            &extracted,
            work,
            source,
            &self.config.conversion,
        );
        info!(
            "Converting track {} ({}) to {} channels at {} kb/s",
            track_id, track.codec, plan.channels, plan.bitrate_kbps
        );

        for target in &plan.targets {
            let progress = LogProgress::new(format!("Transcoding track {} to {}", track_id, target.codec));
            let output = self
                .runner
                .run_observed(&self.toolchain.transcode(&plan, target), &progress)
                .await
                .map_err(at(Stage::Transcode))?;
            check_step(&output, &target.path, |message| Mkv2Ac3Error::TranscodeFailure {
                track_id,
                message,
            })
            .map_err(at(Stage::Transcode))?;
        }

        Ok(plan)
    }

    async fn probe(&self, stream: &Path) -> Mkv2Ac3Result<ProbeResult> {
        // ffmpeg exits non-zero without an output file; only the banner matters
        let output = self.runner.run(&self.toolchain.probe(stream)).await?;

        Ok(StreamProber::parse(&output.stderr).unwrap_or_else(|e| {
            warn!("Could not read stream parameters of {}: {}", stream.display(), e);
            ProbeResult::default()
        }))
    }

    async fn remux(
        &self,
        source: &Path,
        snapshot: &ContainerSnapshot,
        plans: &[ConversionPlan],
        work: &Path,
    ) -> Mkv2Ac3Result<PathBuf> {
        let output_path = work_output(work, source);
        let plan = RemuxPlanner::build(snapshot, plans, &self.config.conversion, &output_path);

        info!("Remuxing into {}", output_path.display());
        let progress = LogProgress::new("Remuxing");
        let output = self
            .runner
            .run_observed(&self.toolchain.remux(&plan), &progress)
            .await?;

        if !output.executed {
            return Ok(output_path);
        }

        // mkvmerge: 1 means warnings, 2 and above errors
        match output.status {
            Some(0) => {}
            Some(1) => warn!("mkvmerge reported warnings: {}", output.last_message()),
            status => {
                return Err(Mkv2Ac3Error::RemuxFailure {
                    message: format!("{}: {}", describe_status(status), output.last_message()),
                })
            }
        }

        if !output_path.is_file() {
            return Err(Mkv2Ac3Error::RemuxFailure {
                message: format!("{} was not created", output_path.display()),
            });
        }

        Ok(output_path)
    }

    async fn repackage(&self, source: &Path, container: &Path, work: &Path) -> Mkv2Ac3Result<PathBuf> {
        let dest = work.join(format!("{}.mp4", file_stem(source)));

        info!("Repackaging as MP4");
        let progress = LogProgress::new("Repackaging");
        let output = self
            .runner
            .run_observed(&self.toolchain.repackage_mp4(container, &dest), &progress)
            .await?;
        check_step(&output, &dest, |message| Mkv2Ac3Error::RepackageFailure { message })?;

        Ok(dest)
    }

    fn place(&self, from: &Path, to: &Path, force_overwrite: bool) -> Result<PathBuf, Failure> {
        if self.config.mode == ExecutionMode::DryRun {
            info!("[test] move {} to {}", from.display(), to.display());
            return Ok(to.to_path_buf());
        }

        self.relocator
            .relocate(from, to, force_overwrite)
            .map_err(at(Stage::Relocate))
    }

    fn create_work_dir(&self) -> Mkv2Ac3Result<TempDir> {
        let builder = {
            let mut builder = tempfile::Builder::new();
            builder.prefix("mkv2ac3-");
            builder
        };

        let work = match &self.config.work_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                builder.tempdir_in(dir)?
            }
            None => builder.tempdir()?,
        };

        debug!("Working in {}", work.path().display());
        Ok(work)
    }

    fn release_work_dir(&self, work: TempDir, succeeded: bool) {
        if succeeded && self.config.keep_temp {
            let kept = work.into_path();
            info!("Kept temporary files in {}", kept.display());
            return;
        }

        let path = work.path().to_path_buf();
        if let Err(e) = work.close() {
            warn!("Could not remove {}: {}", path.display(), e);
        }
    }
}

/// Verify a mutating step: success status and a non-empty artifact.
///
/// Steps that did not run (dry run) pass unchecked.
fn check_step(
    output: &ToolOutput,
    artifact: &Path,
    make_error: impl Fn(String) -> Mkv2Ac3Error,
) -> Mkv2Ac3Result<()> {
    if !output.executed {
        return Ok(());
    }

    if !output.success() {
        return Err(make_error(format!(
            "{}: {}",
            describe_status(output.status),
            output.last_message()
        )));
    }

    match fs::metadata(artifact) {
        Ok(metadata) if metadata.len() > 0 => Ok(()),
        Ok(_) => Err(make_error(format!("{} is empty", artifact.display()))),
        Err(_) => Err(make_error(format!("{} was not created", artifact.display()))),
    }
}

/// Initial delay of an extracted track, read from its timecode file
fn initial_delay(output: &ToolOutput, timecodes: &Path) -> Option<i64> {
    if !output.executed {
        return None;
    }
    fs::read_to_string(timecodes)
        .ok()
        .and_then(|content| parse_initial_delay(&content))
}

fn describe_status(status: Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}

fn beside(dir: &Path, file: &Path) -> PathBuf {
    match file.file_name() {
        Some(name) => dir.join(name),
        None => dir.to_path_buf(),
    }
}

