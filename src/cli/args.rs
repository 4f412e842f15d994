//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Conversion options
#[derive(Args, Debug, Clone, Default)]
pub struct ConvertArgs {
    /// Matroska files or directories to process
    #[arg(value_name = "FILE_OR_DIR", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Custom AC3 track title
    #[arg(short = 'c', long, value_name = "TITLE")]
    pub custom: Option<String>,

    /// Also create an AAC track
    #[arg(long)]
    pub aac: bool,

    /// Custom AAC track title (implies --aac)
    #[arg(long, value_name = "TITLE")]
    pub aac_custom: Option<String>,

    /// Mark the new AC3 track as default
    #[arg(short = 'd', long)]
    pub default: bool,

    /// Destination directory for converted files
    #[arg(long, value_name = "DIR")]
    pub destdir: Option<PathBuf>,

    /// Leave the new tracks out of the container and keep them as files.
    /// Overrides --dont-retain and --default
    #[arg(short = 'e', long)]
    pub external: bool,

    /// Process files that already contain an AC3 track
    #[arg(short = 'f', long)]
    pub force: bool,

    /// Directory containing ffmpeg
    #[arg(long, value_name = "DIR", env = "MKV2AC3_FFMPEG_PATH")]
    pub ffmpeg_path: Option<PathBuf>,

    /// Directory containing mkvmerge, mkvinfo and mkvextract
    #[arg(long, value_name = "DIR", env = "MKV2AC3_MKVTOOLNIX_PATH")]
    pub mkvtoolnix_path: Option<PathBuf>,

    /// Keep the extracted source track as a file
    #[arg(short = 'k', long)]
    pub keep_original: bool,

    /// Write the output as MP4
    #[arg(long)]
    pub mp4: bool,

    /// Drop the source track from the output
    #[arg(short = 'n', long)]
    pub dont_retain: bool,

    /// Create a new adjacent file instead of replacing the original
    #[arg(long)]
    pub new: bool,

    /// Remove subtitle tracks
    #[arg(long)]
    pub no_subtitles: bool,

    /// Overwrite existing files in the destination
    #[arg(short = 'o', long)]
    pub overwrite: bool,

    /// Position of the new track: initial, last or afterdts [default: last]
    #[arg(short = 'p', long, value_name = "POSITION")]
    pub position: Option<String>,

    /// Descend into subdirectories
    #[arg(short = 'r', long)]
    pub recursive: bool,

    /// Header compression for every track (see mkvmerge --compression) [default: none]
    #[arg(short = 's', long, value_name = "MODE")]
    pub compress: Option<String>,

    /// Downmix the new track to stereo
    #[arg(long)]
    pub stereo: bool,

    /// Track to convert; falls back to the first supported track
    #[arg(short = 't', long, value_name = "ID")]
    pub track: Option<u32>,

    /// Convert every supported audio track
    #[arg(long)]
    pub all_tracks: bool,

    /// Working directory for temporary files
    #[arg(short = 'w', long = "wd", value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Keep temporary files after a successful run
    #[arg(long)]
    pub keep_temp: bool,

    /// Log commands without running anything that writes files
    #[arg(long)]
    pub test: bool,

    /// Pause before each command that writes files
    #[arg(long)]
    pub debug: bool,
}
