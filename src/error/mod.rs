//! Error handling module for mkv2ac3

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type for mkv2ac3 operations
#[derive(Error, Debug)]
pub enum Mkv2Ac3Error {
    /// A required external executable could not be located
    #[error("Could not find {tool} executable (searched {searched})")]
    ToolNotFound { tool: String, searched: String },

    /// Configuration file or value is invalid
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Input file not found or inaccessible
    #[error("Input file not found: {path}")]
    InputFileNotFound { path: PathBuf },

    /// Container has no audio track in a supported format
    #[error("No supported audio track found in {path}")]
    NoSupportedTrack { path: PathBuf },

    /// Container already carries an AC3 track
    #[error("{path} already contains an AC3 track (use --force to convert anyway)")]
    AlreadyConverted { path: PathBuf },

    /// Track listing or info dump could not be produced
    #[error("Failed to inspect {path}: {message}")]
    InspectionFailure { path: PathBuf, message: String },

    /// Track or timecode extraction failed
    #[error("Failed to extract track {track_id}: {message}")]
    ExtractionFailure { track_id: u32, message: String },

    /// Transcoder failed or produced no output
    #[error("Failed to transcode track {track_id}: {message}")]
    TranscodeFailure { track_id: u32, message: String },

    /// Remux step failed
    #[error("Remux failed: {message}")]
    RemuxFailure { message: String },

    /// MP4 repackaging failed
    #[error("MP4 repackaging failed: {message}")]
    RepackageFailure { message: String },

    /// Moving output into its final location failed
    #[error("Failed to place output {path}: {message}")]
    RelocationFailure { path: PathBuf, message: String },

    /// Parsing or argument error from the domain layer
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Mkv2Ac3Error {
    /// Whether this error means "nothing to do" rather than a failure
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            Mkv2Ac3Error::NoSupportedTrack { .. } | Mkv2Ac3Error::AlreadyConverted { .. }
        )
    }
}

/// Result type alias for mkv2ac3 operations
pub type Mkv2Ac3Result<T> = std::result::Result<T, Mkv2Ac3Error>;
