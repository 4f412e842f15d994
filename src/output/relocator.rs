//! Moves finished artifacts into place

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Mkv2Ac3Error, Mkv2Ac3Result};

/// Artifact mover with overwrite policy and verified cross-device copies
#[derive(Debug, Clone, Copy, Default)]
pub struct Relocator {
    overwrite: bool,
}

impl Relocator {
    pub fn new(overwrite: bool) -> Self {
        Self { overwrite }
    }

    /// Move `from` to `to`.
    ///
    /// An existing destination is replaced only with overwrite enabled or
    /// `force_overwrite` set. When a rename is impossible the file is copied
    /// next to the destination, compared by MD5, renamed over the
    /// destination and the source is removed.
    pub fn relocate(&self, from: &Path, to: &Path, force_overwrite: bool) -> Mkv2Ac3Result<PathBuf> {
        if from == to {
            return Ok(to.to_path_buf());
        }

        if to.exists() && !(self.overwrite || force_overwrite) {
            return Err(Mkv2Ac3Error::RelocationFailure {
                path: to.to_path_buf(),
                message: "destination exists (use --overwrite to replace it)".to_string(),
            });
        }

        if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| failure(to, "cannot create directory", e))?;
        }

        match fs::rename(from, to) {
            Ok(()) => {
                debug!("Moved {} to {}", from.display(), to.display());
            }
            Err(e) => {
                debug!("Rename failed ({}), copying {} instead", e, from.display());
                self.copy_verified(from, to)?;
                fs::remove_file(from).map_err(|e| failure(from, "cannot remove after copy", e))?;
            }
        }

        info!("Wrote {}", to.display());
        Ok(to.to_path_buf())
    }

    /// Copy into a `.tmp_` sibling of `to`, verify it by MD5 and rename it
    /// into place. `to` is untouched unless the verified copy replaces it.
    fn copy_verified(&self, from: &Path, to: &Path) -> Mkv2Ac3Result<()> {
        let temp = temp_sibling(to);

        let result = Self::copy_into(from, &temp).and_then(|digest| {
            fs::rename(&temp, to).map_err(|e| failure(to, "cannot replace destination", e))?;
            Ok(digest)
        });

        match result {
            Ok(digest) => {
                debug!("Verified copy of {} (md5 {})", from.display(), digest);
                Ok(())
            }
            Err(e) => {
                if temp.exists() {
                    if let Err(remove) = fs::remove_file(&temp) {
                        warn!("Could not remove {}: {}", temp.display(), remove);
                    }
                }
                Err(e)
            }
        }
    }

    fn copy_into(from: &Path, temp: &Path) -> Mkv2Ac3Result<String> {
        fs::copy(from, temp).map_err(|e| failure(temp, "copy failed", e))?;

        let expected = md5_file(from).map_err(|e| failure(from, "cannot read", e))?;
        let actual = md5_file(temp).map_err(|e| failure(temp, "cannot read", e))?;

        if expected != actual {
            warn!("Checksum mismatch after copying to {}", temp.display());
            return Err(Mkv2Ac3Error::RelocationFailure {
                path: temp.to_path_buf(),
                message: format!("checksum mismatch ({} != {})", actual, expected),
            });
        }

        Ok(expected)
    }
}

/// `.tmp_<name>` next to `path`
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".tmp_{}", name))
}

/// Hex MD5 digest of a file
pub fn md5_file(path: &Path) -> std::io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut context = md5::Context::new();
    let mut buffer = [0u8; 64 * 1024];

    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        context.consume(&buffer[..read]);
    }

    Ok(format!("{:x}", context.compute()))
}

fn failure(path: &Path, what: &str, error: std::io::Error) -> Mkv2Ac3Error {
    Mkv2Ac3Error::RelocationFailure {
        path: path.to_path_buf(),
        message: format!("{}: {}", what, error),
    }
}
