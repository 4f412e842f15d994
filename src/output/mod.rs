//! Output placement and relocation

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::utils::path::{file_stem, parent_dir, with_file_name};

pub mod relocator;

pub use relocator::Relocator;

/// Suffix of adjacent output files
pub const NEW_FILE_SUFFIX: &str = "-AC3";

/// Where the finished container goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OutputPlacement {
    /// Replace the source file in place
    ReplaceOriginal,
    /// New file next to the source
    Adjacent,
    /// Destination directory
    DestDir(PathBuf),
}

/// Container format of the final output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum OutputFormat {
    #[default]
    Matroska,
    Mp4,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Matroska => "mkv",
            OutputFormat::Mp4 => "mp4",
        }
    }
}

impl OutputPlacement {
    /// Final path of the converted container for `source`.
    ///
    /// MP4 output is always `<stem>.mp4`, beside the source or in the
    /// destination directory; it never replaces the source.
    pub fn destination(&self, source: &Path, format: OutputFormat) -> PathBuf {
        let source_dir = parent_dir(source);
        match (self, format) {
            (OutputPlacement::DestDir(dir), format) => with_file_name(dir, source, "", format.extension()),
            (_, OutputFormat::Mp4) => with_file_name(&source_dir, source, "", "mp4"),
            (OutputPlacement::ReplaceOriginal, OutputFormat::Matroska) => source.to_path_buf(),
            (OutputPlacement::Adjacent, OutputFormat::Matroska) => {
                with_file_name(&source_dir, source, NEW_FILE_SUFFIX, "mkv")
            }
        }
    }

    /// Directory receiving loose artifacts in external mode
    pub fn artifact_dir(&self, source: &Path) -> PathBuf {
        match self {
            OutputPlacement::DestDir(dir) => dir.clone(),
            _ => parent_dir(source),
        }
    }
}

/// Name of the remuxed container inside the work directory
pub fn work_output(work_dir: &Path, source: &Path) -> PathBuf {
    work_dir.join(format!("{}{}.mkv", file_stem(source), NEW_FILE_SUFFIX))
}
