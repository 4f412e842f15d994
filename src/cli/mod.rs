//! CLI module for mkv2ac3
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::adapters::tracing_log::LogFormat;

pub mod args;
pub mod commands;

pub use args::ConvertArgs;

/// mkv2ac3
///
/// Convert DTS, AAC and E-AC-3 audio tracks of Matroska files to AC3.
#[derive(Parser, Debug)]
#[command(name = "mkv2ac3")]
#[command(about = "Convert DTS/AAC/E-AC-3 audio tracks in Matroska files to AC3")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub args: ConvertArgs,

    /// More output; repeat for tool output (-vv)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log format
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Configuration file
    #[arg(long, value_name = "FILE", env = "MKV2AC3_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write a JSON run report
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}
