// TOML config adapter - Configuration file loading

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::adapters::tracing_log::LogFormat;
use crate::error::{Mkv2Ac3Error, Mkv2Ac3Result};

/// Config file name looked up next to the executable and in the working directory
pub const CONFIG_FILE_NAME: &str = "mkv2ac3.toml";

/// Settings from the `[mkv2ac3]` table; keys mirror the long option names
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    pub custom: Option<String>,
    pub aac: Option<bool>,
    pub aac_custom: Option<String>,
    pub default: Option<bool>,
    pub destdir: Option<PathBuf>,
    pub external: Option<bool>,
    pub force: Option<bool>,
    pub ffmpeg_path: Option<PathBuf>,
    pub mkvtoolnix_path: Option<PathBuf>,
    pub keep_original: Option<bool>,
    pub mp4: Option<bool>,
    pub dont_retain: Option<bool>,
    pub new: Option<bool>,
    pub no_subtitles: Option<bool>,
    pub overwrite: Option<bool>,
    pub position: Option<String>,
    pub recursive: Option<bool>,
    pub compress: Option<String>,
    pub stereo: Option<bool>,
    pub all_tracks: Option<bool>,
    pub wd: Option<PathBuf>,
    pub keep_temp: Option<bool>,
    pub log_format: Option<LogFormat>,
    pub verbose: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigDocument {
    #[serde(default)]
    mkv2ac3: FileSettings,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse config file content
    pub fn parse(content: &str) -> Mkv2Ac3Result<FileSettings> {
        let document: ConfigDocument = toml::from_str(content).map_err(|e| Mkv2Ac3Error::Config {
            message: e.to_string(),
        })?;
        Ok(document.mkv2ac3)
    }

    pub fn load(path: &Path) -> Mkv2Ac3Result<FileSettings> {
        let content = std::fs::read_to_string(path).map_err(|e| Mkv2Ac3Error::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;

        Self::parse(&content).map_err(|e| match e {
            Mkv2Ac3Error::Config { message } => Mkv2Ac3Error::Config {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })
    }

    /// Config file to use: the explicit path, else `mkv2ac3.toml` next to
    /// the executable, else in the current directory
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        let beside_exe = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE_NAME)));

        beside_exe
            .into_iter()
            .chain(std::iter::once(PathBuf::from(CONFIG_FILE_NAME)))
            .find(|candidate| candidate.is_file())
    }

    /// Locate and load settings; no file at all means empty settings.
    ///
    /// An explicitly named file that cannot be read is an error.
    pub fn load_settings(explicit: Option<&Path>) -> Mkv2Ac3Result<FileSettings> {
        match Self::locate(explicit) {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            None => {
                debug!("No configuration file found");
                Ok(FileSettings::default())
            }
        }
    }
}
