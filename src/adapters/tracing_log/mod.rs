// Tracing log adapter - Structured logging using tracing crate

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::error::{Mkv2Ac3Error, Mkv2Ac3Result};

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line output
    #[default]
    Pretty,
    /// Abbreviated single-line output
    Compact,
    /// Newline-delimited JSON
    Json,
}

/// Logging settings resolved from the command line and config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogSettings {
    /// Number of `-v` flags
    pub verbosity: u8,
    pub format: LogFormat,
    /// Raise the floor to debug (test and debug modes show commands)
    pub force_debug: bool,
}

impl LogSettings {
    /// Filter directive used when `RUST_LOG` is not set
    pub fn default_directive(&self) -> &'static str {
        match (self.verbosity, self.force_debug) {
            (0, false) => "info",
            (0, true) | (1, _) => "debug",
            _ => "trace",
        }
    }
}

/// Tracing subscriber installer
pub struct TracingLogAdapter;

impl TracingLogAdapter {
    /// Install the global subscriber; logs go to stderr.
    ///
    /// `RUST_LOG` overrides the verbosity derived from the settings.
    pub fn init(settings: &LogSettings) -> Mkv2Ac3Result<()> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(settings.default_directive()));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false);

        let installed = match settings.format {
            LogFormat::Pretty => builder.try_init(),
            LogFormat::Compact => builder.compact().try_init(),
            LogFormat::Json => builder.json().try_init(),
        };

        installed.map_err(|e| Mkv2Ac3Error::Config {
            message: format!("failed to initialize logging: {}", e),
        })
    }
}
