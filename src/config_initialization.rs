//! Configuration initialization and hierarchy management
//!
//! Precedence: command line > environment (handled by clap) > config file >
//! defaults. The result is an immutable [`RunConfig`] shared by the whole run.

use std::path::PathBuf;

use crate::adapters::exec_process::ExecutionMode;
use crate::adapters::toml_config::{FileSettings, TomlConfigAdapter};
use crate::adapters::tracing_log::LogSettings;
use crate::cli::Cli;
use crate::domain::model::PositionPolicy;
use crate::error::{Mkv2Ac3Error, Mkv2Ac3Result};
use crate::output::{OutputFormat, OutputPlacement};
use crate::planner::ConversionOptions;

/// Settings of one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub inputs: Vec<PathBuf>,
    pub recursive: bool,
    /// Explicitly requested track
    pub track: Option<u32>,
    pub all_tracks: bool,
    pub force: bool,
    /// Keep new tracks as loose files instead of remuxing
    pub external: bool,
    pub keep_original: bool,
    pub keep_temp: bool,
    pub conversion: ConversionOptions,
    pub placement: OutputPlacement,
    pub format: OutputFormat,
    pub overwrite: bool,
    pub work_dir: Option<PathBuf>,
    pub mkvtoolnix_path: Option<PathBuf>,
    pub ffmpeg_path: Option<PathBuf>,
    pub mode: ExecutionMode,
    pub log: LogSettings,
    pub report: Option<PathBuf>,
    /// Warnings raised while merging, logged once logging is up
    pub notices: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            recursive: false,
            track: None,
            all_tracks: false,
            force: false,
            external: false,
            keep_original: false,
            keep_temp: false,
            conversion: ConversionOptions::default(),
            placement: OutputPlacement::ReplaceOriginal,
            format: OutputFormat::Matroska,
            overwrite: false,
            work_dir: None,
            mkvtoolnix_path: None,
            ffmpeg_path: None,
            mode: ExecutionMode::Execute,
            log: LogSettings::default(),
            report: None,
            notices: Vec::new(),
        }
    }
}

/// Load the config file named by the command line (or found by lookup) and
/// merge it with the command line
pub fn initialize_configuration(cli: &Cli) -> Mkv2Ac3Result<RunConfig> {
    let file = TomlConfigAdapter::load_settings(cli.config.as_deref())?;
    merge(cli, file)
}

/// Merge command line and file settings
pub fn merge(cli: &Cli, file: FileSettings) -> Mkv2Ac3Result<RunConfig> {
    let args = &cli.args;
    let flag = |cli_value: bool, file_value: Option<bool>| cli_value || file_value.unwrap_or(false);

    let position = match args.position.as_deref().or(file.position.as_deref()) {
        Some(policy) => PositionPolicy::parse(policy).map_err(|e| Mkv2Ac3Error::Config {
            message: e.to_string(),
        })?,
        None => PositionPolicy::default(),
    };

    let compression = args
        .compress
        .clone()
        .or(file.compress)
        .unwrap_or_else(|| "none".to_string());
    if compression.trim().is_empty() {
        return Err(Mkv2Ac3Error::Config {
            message: "compression mode must not be empty".to_string(),
        });
    }

    let mut notices = Vec::new();
    let external = flag(args.external, file.external);
    let mut dont_retain = flag(args.dont_retain, file.dont_retain);
    let mut make_default = flag(args.default, file.default);
    if external && (dont_retain || make_default) {
        notices.push("--external ignores --dont-retain and --default".to_string());
        dont_retain = false;
        make_default = false;
    }

    let aac_title = args.aac_custom.clone().or(file.aac_custom);
    let conversion = ConversionOptions {
        stereo: flag(args.stereo, file.stereo),
        aac: flag(args.aac, file.aac) || aac_title.is_some(),
        custom_title: args.custom.clone().or(file.custom),
        aac_title,
        make_default,
        retain_source: !dont_retain,
        no_subtitles: flag(args.no_subtitles, file.no_subtitles),
        compression,
        position,
    };

    let placement = match args.destdir.clone().or(file.destdir) {
        Some(dir) => OutputPlacement::DestDir(dir),
        None if flag(args.new, file.new) => OutputPlacement::Adjacent,
        None => OutputPlacement::ReplaceOriginal,
    };

    let format = if flag(args.mp4, file.mp4) {
        OutputFormat::Mp4
    } else {
        OutputFormat::Matroska
    };

    let mode = if args.test {
        ExecutionMode::DryRun
    } else if args.debug {
        ExecutionMode::Pause
    } else {
        ExecutionMode::Execute
    };

    let log = LogSettings {
        verbosity: cli.verbose.max(file.verbose.unwrap_or(0)),
        format: cli.log_format.or(file.log_format).unwrap_or_default(),
        force_debug: mode != ExecutionMode::Execute,
    };

    Ok(RunConfig {
        inputs: args.inputs.clone(),
        recursive: flag(args.recursive, file.recursive),
        track: args.track,
        all_tracks: flag(args.all_tracks, file.all_tracks),
        force: flag(args.force, file.force),
        external,
        keep_original: flag(args.keep_original, file.keep_original),
        keep_temp: flag(args.keep_temp, file.keep_temp),
        conversion,
        placement,
        format,
        overwrite: flag(args.overwrite, file.overwrite),
        work_dir: args.work_dir.clone().or(file.wd),
        mkvtoolnix_path: args.mkvtoolnix_path.clone().or(file.mkvtoolnix_path),
        ffmpeg_path: args.ffmpeg_path.clone().or(file.ffmpeg_path),
        mode,
        log,
        report: cli.report.clone(),
        notices,
    })
}
