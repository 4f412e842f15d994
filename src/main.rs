//! mkv2ac3
//!
//! Converts DTS, AAC and E-AC-3 audio tracks in Matroska files to AC3 and
//! remuxes the result, keeping every other track.
//!
//! # Usage
//!
//! ```bash
//! mkv2ac3 movie.mkv
//! mkv2ac3 --new --position afterdts -r /media/movies
//! mkv2ac3 --mp4 --destdir /media/out movie.mkv
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use mkv2ac3::adapters::tracing_log::TracingLogAdapter;
use mkv2ac3::app::DefaultAppContainer;
use mkv2ac3::cli::{commands, Cli};
use mkv2ac3::config_initialization::initialize_configuration;

/// Main entry point for the mkv2ac3 application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = initialize_configuration(&cli).context("Failed to load configuration")?;
    TracingLogAdapter::init(&config.log).context("Failed to initialize logging")?;

    info!("mkv2ac3 {}", env!("CARGO_PKG_VERSION"));
    for notice in &config.notices {
        warn!("{}", notice);
    }

    let container = DefaultAppContainer::new(Arc::new(config)).context("Required tools are missing")?;
    commands::convert(&container)
        .await
        .context("Failed to write run report")?;

    Ok(())
}
