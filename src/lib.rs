//! mkv2ac3 Library
//!
//! Adds AC3 (and optionally AAC) audio tracks to Matroska files by converting
//! an existing DTS, AAC or E-AC-3 track with mkvtoolnix and ffmpeg.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod planner;
pub mod ports;
pub mod probe;
pub mod utils;

// Re-export commonly used types
pub use config_initialization::RunConfig;
pub use domain::errors::DomainError;
pub use domain::model::{Codec, ContainerSnapshot, PositionPolicy, TrackRecord};
pub use error::{Mkv2Ac3Error, Mkv2Ac3Result};
