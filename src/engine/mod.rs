//! Toolchain: resolved tool paths and the command lines built from them

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Mkv2Ac3Result;
use crate::planner::{ConversionPlan, RemuxPlan, TargetTrack};
use crate::ports::{Effect, Invocation, Tool};
use crate::utils::path::locate_tool;

pub mod progress;

/// Immutable paths of every external tool used by a run
#[derive(Debug, Clone, PartialEq)]
pub struct Toolchain {
    pub mkvmerge: PathBuf,
    pub mkvinfo: PathBuf,
    pub mkvextract: PathBuf,
    pub ffmpeg: PathBuf,
}

impl Toolchain {
    /// Resolve all tools; the first missing one is reported
    pub fn locate(mkvtoolnix_dir: Option<&Path>, ffmpeg_dir: Option<&Path>) -> Mkv2Ac3Result<Self> {
        let toolchain = Self {
            mkvmerge: locate_tool(Tool::MkvMerge, mkvtoolnix_dir)?,
            mkvinfo: locate_tool(Tool::MkvInfo, mkvtoolnix_dir)?,
            mkvextract: locate_tool(Tool::MkvExtract, mkvtoolnix_dir)?,
            ffmpeg: locate_tool(Tool::Ffmpeg, ffmpeg_dir)?,
        };
        debug!("Using toolchain {:?}", toolchain);
        Ok(toolchain)
    }

    pub fn program(&self, tool: Tool) -> &Path {
        match tool {
            Tool::MkvMerge => &self.mkvmerge,
            Tool::MkvInfo => &self.mkvinfo,
            Tool::MkvExtract => &self.mkvextract,
            Tool::Ffmpeg => &self.ffmpeg,
        }
    }

    fn invocation(&self, tool: Tool, effect: Effect) -> Invocation {
        Invocation::new(tool, self.program(tool), effect)
    }

    /// `mkvmerge -i <file>`: terse track listing
    pub fn identify(&self, container: &Path) -> Invocation {
        self.invocation(Tool::MkvMerge, Effect::ReadOnly)
            .arg("-i")
            .arg(display(container))
    }

    /// `mkvinfo --ui-language en_US <file>`: verbose info dump
    pub fn info_dump(&self, container: &Path) -> Invocation {
        self.invocation(Tool::MkvInfo, Effect::ReadOnly)
            .args(["--ui-language", "en_US"])
            .arg(display(container))
    }

    /// `mkvextract tracks <file> <id>:<dest>`
    pub fn extract_track(&self, container: &Path, track_id: u32, dest: &Path) -> Invocation {
        self.invocation(Tool::MkvExtract, Effect::Writes)
            .arg("tracks")
            .arg(display(container))
            .arg(format!("{}:{}", track_id, display(dest)))
    }

    /// `mkvextract timecodes_v2 <file> <id>:<dest>`
    pub fn extract_timecodes(&self, container: &Path, track_id: u32, dest: &Path) -> Invocation {
        self.invocation(Tool::MkvExtract, Effect::Writes)
            .arg("timecodes_v2")
            .arg(display(container))
            .arg(format!("{}:{}", track_id, display(dest)))
    }

    /// `ffmpeg -hide_banner -i <file>`: stream banner on stderr, exit status
    /// is non-zero because no output is given
    pub fn probe(&self, stream: &Path) -> Invocation {
        self.invocation(Tool::Ffmpeg, Effect::ReadOnly)
            .args(["-hide_banner", "-i"])
            .arg(display(stream))
    }

    /// Transcode the extracted stream into one target track
    pub fn transcode(&self, plan: &ConversionPlan, target: &TargetTrack) -> Invocation {
        self.invocation(Tool::Ffmpeg, Effect::Writes)
            .args(["-hide_banner", "-nostdin", "-y", "-i"])
            .arg(display(&plan.extracted))
            .args(["-acodec", target.codec.encoder()])
            .arg("-ac")
            .arg(plan.channels.to_string())
            .arg("-ab")
            .arg(format!("{}k", plan.bitrate_kbps))
            .arg(display(&target.path))
    }

    pub fn remux(&self, plan: &RemuxPlan) -> Invocation {
        self.invocation(Tool::MkvMerge, Effect::Writes)
            .args(plan.to_args())
    }

    /// Copy video and audio streams of a Matroska file into MP4
    pub fn repackage_mp4(&self, container: &Path, dest: &Path) -> Invocation {
        self.invocation(Tool::Ffmpeg, Effect::Writes)
            .args(["-hide_banner", "-nostdin", "-y", "-i"])
            .arg(display(container))
            .args(["-map", "0:v?", "-map", "0:a?", "-c", "copy"])
            .arg(display(dest))
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Codec, TargetCodec};

    fn toolchain() -> Toolchain {
        Toolchain {
            mkvmerge: PathBuf::from("/bin/mkvmerge"),
            mkvinfo: PathBuf::from("/bin/mkvinfo"),
            mkvextract: PathBuf::from("/bin/mkvextract"),
            ffmpeg: PathBuf::from("/bin/ffmpeg"),
        }
    }

    #[test]
    fn test_read_only_commands() {
        let tools = toolchain();
        let identify = tools.identify(Path::new("movie.mkv"));
        assert_eq!(identify.args, vec!["-i", "movie.mkv"]);
        assert!(!identify.is_mutating());

        let dump = tools.info_dump(Path::new("movie.mkv"));
        assert_eq!(dump.program, PathBuf::from("/bin/mkvinfo"));
        assert_eq!(dump.args, vec!["--ui-language", "en_US", "movie.mkv"]);

        assert!(!tools.probe(Path::new("a.dts")).is_mutating());
    }

    #[test]
    fn test_extract_commands() {
        let tools = toolchain();
        let extract = tools.extract_track(Path::new("movie.mkv"), 1, Path::new("/w/movie_track1.dts"));
        assert_eq!(extract.args, vec!["tracks", "movie.mkv", "1:/w/movie_track1.dts"]);
        assert!(extract.is_mutating());

        let timecodes = tools.extract_timecodes(Path::new("movie.mkv"), 1, Path::new("/w/movie_track1.tc"));
        assert_eq!(timecodes.args, vec!["timecodes_v2", "movie.mkv", "1:/w/movie_track1.tc"]);
    }

    #[test]
    fn test_transcode_command() {
        let target = TargetTrack {
            codec: TargetCodec::Ac3,
            path: PathBuf::from("/w/movie_track1.ac3"),
            title: None,
            language: "eng".to_string(),
            delay: None,
            default_track: false,
        };
        let plan = ConversionPlan {
            source_track: 1,
            source_codec: Codec::Dts,
            extracted: PathBuf::from("/w/movie_track1.dts"),
            channels: 6,
            bitrate_kbps: 640,
            targets: vec![target.clone()],
        };

        let transcode = toolchain().transcode(&plan, &target);
        assert_eq!(
            transcode.args,
            vec![
                "-hide_banner",
                "-nostdin",
                "-y",
                "-i",
                "/w/movie_track1.dts",
                "-acodec",
                "ac3",
                "-ac",
                "6",
                "-ab",
                "640k",
                "/w/movie_track1.ac3"
            ]
        );
    }

    #[test]
    fn test_repackage_command() {
        let repackage = toolchain().repackage_mp4(Path::new("/w/movie.mkv"), Path::new("/w/movie.mp4"));
        assert_eq!(
            repackage.args,
            vec![
                "-hide_banner",
                "-nostdin",
                "-y",
                "-i",
                "/w/movie.mkv",
                "-map",
                "0:v?",
                "-map",
                "0:a?",
                "-c",
                "copy",
                "/w/movie.mp4"
            ]
        );
    }

    #[test]
    fn test_locate_reports_missing_tool() {
        let dir = tempfile::tempdir().unwrap();
        let result = Toolchain::locate(Some(dir.path()), Some(dir.path()));
        assert!(matches!(
            result,
            Err(crate::error::Mkv2Ac3Error::ToolNotFound { .. })
        ));
    }
}
