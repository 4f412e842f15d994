//! Conversion planning: target channels, bitrate and per-track metadata

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::domain::model::{Codec, PositionPolicy, ProbeResult, TargetCodec, TrackRecord};
use crate::utils::path::{file_stem, track_artifact};

pub mod remux;

pub use remux::{AudioSelection, RemuxDirective, RemuxInput, RemuxPlan, RemuxPlanner};

/// Highest AC3 bitrate in kb/s
pub const MAX_BITRATE_KBPS: u32 = 640;

pub const STEREO_CHANNELS: u32 = 2;
pub const SURROUND_CHANNELS: u32 = 6;

/// User choices that shape every plan of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionOptions {
    /// Downmix to stereo
    pub stereo: bool,
    /// Also produce an AAC track
    pub aac: bool,
    pub custom_title: Option<String>,
    pub aac_title: Option<String>,
    /// Mark the new AC3 track default
    pub make_default: bool,
    /// Keep the source track in the output
    pub retain_source: bool,
    pub no_subtitles: bool,
    /// mkvmerge `--compression` mode for every included track
    pub compression: String,
    pub position: PositionPolicy,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            stereo: false,
            aac: false,
            custom_title: None,
            aac_title: None,
            make_default: false,
            retain_source: true,
            no_subtitles: false,
            compression: "none".to_string(),
            position: PositionPolicy::default(),
        }
    }
}

/// One track produced by the transcoder
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetTrack {
    pub codec: TargetCodec,
    pub path: PathBuf,
    pub title: Option<String>,
    pub language: String,
    /// Initial delay in milliseconds
    pub delay: Option<i64>,
    pub default_track: bool,
}

/// Plan for converting one source track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionPlan {
    pub source_track: u32,
    pub source_codec: Codec,
    /// Extracted elementary stream
    pub extracted: PathBuf,
    pub channels: u32,
    pub bitrate_kbps: u32,
    /// AC3 first, then AAC when requested
    pub targets: Vec<TargetTrack>,
}

impl ConversionPlan {
    pub fn has_default_target(&self) -> bool {
        self.targets.iter().any(|target| target.default_track)
    }
}

/// Planner for per-track transcoding parameters
pub struct ConversionPlanner;

impl ConversionPlanner {
    /// Output channel count.
    ///
    /// Stereo is used when requested, when the source has five channels or
    /// fewer, and when the count is unknown. Otherwise 5.1.
    pub fn target_channels(stereo: bool, probed: Option<u32>, declared: Option<u32>) -> u32 {
        if stereo {
            return STEREO_CHANNELS;
        }

        match probed.or(declared) {
            Some(channels) if channels > 5 => SURROUND_CHANNELS,
            _ => STEREO_CHANNELS,
        }
    }

    /// Output bitrate: the source bitrate capped at 640 kb/s
    pub fn target_bitrate(probed_kbps: Option<u32>) -> u32 {
        probed_kbps
            .filter(|kbps| *kbps > 0)
            .map_or(MAX_BITRATE_KBPS, |kbps| kbps.min(MAX_BITRATE_KBPS))
    }

    /// Plan the conversion of `source`, already extracted to `extracted`
    pub fn plan(
        source: &TrackRecord,
        probe: &ProbeResult,
        delay: Option<i64>,
        extracted: &Path,
        work_dir: &Path,
        container: &Path,
        options: &ConversionOptions,
    ) -> ConversionPlan {
        let channels = Self::target_channels(options.stereo, probe.channels, source.channels);
        let bitrate_kbps = Self::target_bitrate(probe.bitrate_kbps);

        let mut targets = vec![TargetTrack {
            codec: TargetCodec::Ac3,
            path: Self::target_path(work_dir, container, source.track_id, TargetCodec::Ac3, extracted),
            title: options.custom_title.clone().or_else(|| source.name.clone()),
            language: source.language.clone(),
            delay,
            default_track: options.make_default || source.default_track == Some(true),
        }];

        if options.aac {
            targets.push(TargetTrack {
                codec: TargetCodec::Aac,
                path: Self::target_path(work_dir, container, source.track_id, TargetCodec::Aac, extracted),
                title: options.aac_title.clone().or_else(|| source.name.clone()),
                language: source.language.clone(),
                delay,
                default_track: false,
            });
        }

        debug!(
            "track {}: {} -> {} channels at {} kb/s",
            source.track_id, source.codec, channels, bitrate_kbps
        );

        ConversionPlan {
            source_track: source.track_id,
            source_codec: source.codec.clone(),
            extracted: extracted.to_path_buf(),
            channels,
            bitrate_kbps,
            targets,
        }
    }

    /// Target artifact path, kept apart from the extracted source when the
    /// extensions coincide (AAC to AAC)
    fn target_path(
        work_dir: &Path,
        container: &Path,
        track_id: u32,
        codec: TargetCodec,
        extracted: &Path,
    ) -> PathBuf {
        let path = track_artifact(work_dir, container, track_id, codec.extension());
        if path != extracted {
            return path;
        }
        work_dir.join(format!(
            "{}_track{}_{}.{}",
            file_stem(container),
            track_id,
            codec.encoder(),
            codec.extension()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TrackKind;

    fn dts_track() -> TrackRecord {
        let mut record = TrackRecord::new(1, TrackKind::Audio, "A_DTS", Codec::Dts, "A_DTS");
        record.name = Some("DTS 5.1".to_string());
        record.language = "ger".to_string();
        record.channels = Some(6);
        record
    }

    fn probe(channels: u32, bitrate: u32) -> ProbeResult {
        ProbeResult {
            codec: Some("dts".to_string()),
            sample_rate_hz: Some(48000),
            channels: Some(channels),
            bitrate_kbps: Some(bitrate),
        }
    }

    #[test]
    fn test_target_channels() {
        assert_eq!(ConversionPlanner::target_channels(false, Some(6), None), 6);
        assert_eq!(ConversionPlanner::target_channels(false, Some(2), None), 2);
        assert_eq!(ConversionPlanner::target_channels(true, Some(6), None), 2);
        assert_eq!(ConversionPlanner::target_channels(false, Some(5), None), 2);
        assert_eq!(ConversionPlanner::target_channels(false, Some(8), None), 6);
    }

    #[test]
    fn test_target_channels_falls_back_to_declared() {
        assert_eq!(ConversionPlanner::target_channels(false, None, Some(6)), 6);
        assert_eq!(ConversionPlanner::target_channels(false, Some(2), Some(6)), 2);
        assert_eq!(ConversionPlanner::target_channels(false, None, None), 2);
    }

    #[test]
    fn test_target_bitrate() {
        assert_eq!(ConversionPlanner::target_bitrate(Some(768)), 640);
        assert_eq!(ConversionPlanner::target_bitrate(Some(384)), 384);
        assert_eq!(ConversionPlanner::target_bitrate(None), 640);
        assert_eq!(ConversionPlanner::target_bitrate(Some(0)), 640);
    }

    #[test]
    fn test_plan_propagates_metadata() {
        let plan = ConversionPlanner::plan(
            &dts_track(),
            &probe(6, 768),
            Some(120),
            Path::new("/work/movie_track1.dts"),
            Path::new("/work"),
            Path::new("/media/movie.mkv"),
            &ConversionOptions::default(),
        );

        assert_eq!(plan.source_track, 1);
        assert_eq!(plan.channels, 6);
        assert_eq!(plan.bitrate_kbps, 640);
        assert_eq!(plan.targets.len(), 1);

        let ac3 = &plan.targets[0];
        assert_eq!(ac3.codec, TargetCodec::Ac3);
        assert_eq!(ac3.path, PathBuf::from("/work/movie_track1.ac3"));
        assert_eq!(ac3.title.as_deref(), Some("DTS 5.1"));
        assert_eq!(ac3.language, "ger");
        assert_eq!(ac3.delay, Some(120));
        assert!(!ac3.default_track);
    }

    #[test]
    fn test_plan_custom_titles_and_aac() {
        let options = ConversionOptions {
            aac: true,
            custom_title: Some("AC3 5.1".to_string()),
            make_default: true,
            ..Default::default()
        };
        let plan = ConversionPlanner::plan(
            &dts_track(),
            &probe(6, 1536),
            None,
            Path::new("/work/movie_track1.dts"),
            Path::new("/work"),
            Path::new("/media/movie.mkv"),
            &options,
        );

        assert_eq!(plan.targets.len(), 2);
        assert_eq!(plan.targets[0].title.as_deref(), Some("AC3 5.1"));
        assert!(plan.targets[0].default_track);
        assert_eq!(plan.targets[1].codec, TargetCodec::Aac);
        assert_eq!(plan.targets[1].title.as_deref(), Some("DTS 5.1"));
        assert!(!plan.targets[1].default_track);
        assert!(plan.has_default_target());
    }

    #[test]
    fn test_default_flag_follows_source() {
        let mut source = dts_track();
        source.default_track = Some(true);
        let plan = ConversionPlanner::plan(
            &source,
            &ProbeResult::default(),
            None,
            Path::new("/work/movie_track1.dts"),
            Path::new("/work"),
            Path::new("/media/movie.mkv"),
            &ConversionOptions::default(),
        );
        assert!(plan.targets[0].default_track);
        assert_eq!(plan.channels, 6);
        assert_eq!(plan.bitrate_kbps, 640);
    }

    #[test]
    fn test_aac_target_does_not_overwrite_aac_source() {
        let source = TrackRecord::new(2, TrackKind::Audio, "AAC", Codec::Aac, "AAC");
        let options = ConversionOptions {
            aac: true,
            ..Default::default()
        };
        let plan = ConversionPlanner::plan(
            &source,
            &ProbeResult::default(),
            None,
            Path::new("/work/movie_track2.aac"),
            Path::new("/work"),
            Path::new("/media/movie.mkv"),
            &options,
        );
        assert_eq!(plan.targets[1].path, PathBuf::from("/work/movie_track2_aac.aac"));
    }
}
