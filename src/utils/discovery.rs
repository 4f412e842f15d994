//! Input discovery: expand file and directory arguments into `.mkv` files

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

/// Whether a path has an `.mkv` extension, ignoring case
pub fn is_matroska(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("mkv"))
        .unwrap_or(false)
}

/// Expand the inputs into the Matroska files to process.
///
/// Files are taken as given when they are `.mkv`. Directories contribute
/// their direct `.mkv` children, or every `.mkv` below them when recursive.
/// Results are deduplicated and keep argument order; directory contents are
/// sorted by name. Missing inputs are logged and skipped.
pub fn discover_inputs(inputs: &[PathBuf], recursive: bool) -> Vec<PathBuf> {
    let mut seen = BTreeSet::new();
    let mut files = Vec::new();

    for input in inputs {
        if input.is_file() {
            if is_matroska(input) {
                if seen.insert(input.clone()) {
                    files.push(input.clone());
                }
            } else {
                warn!("Skipping {}: not a Matroska file", input.display());
            }
        } else if input.is_dir() {
            let max_depth = if recursive { usize::MAX } else { 1 };
            let found = WalkDir::new(input)
                .max_depth(max_depth)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file() && is_matroska(entry.path()))
                .map(|entry| entry.into_path());

            for path in found {
                if seen.insert(path.clone()) {
                    files.push(path);
                }
            }
        } else {
            warn!("Skipping {}: no such file or directory", input.display());
        }
    }

    debug!("Discovered {} Matroska files", files.len());
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_directory_scan_is_flat_by_default() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.mkv"));
        touch(&dir.path().join("a.MKV"));
        touch(&dir.path().join("notes.txt"));
        fs::create_dir(dir.path().join("season1")).unwrap();
        touch(&dir.path().join("season1").join("e01.mkv"));

        let files = discover_inputs(&[dir.path().to_path_buf()], false);
        assert_eq!(
            files,
            vec![dir.path().join("a.MKV"), dir.path().join("b.mkv")]
        );
    }

    #[test]
    fn test_recursive_scan() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.mkv"));
        fs::create_dir(dir.path().join("season1")).unwrap();
        touch(&dir.path().join("season1").join("e01.mkv"));

        let files = discover_inputs(&[dir.path().to_path_buf()], true);
        assert_eq!(files.len(), 2);
        assert!(files.contains(&dir.path().join("season1").join("e01.mkv")));
    }

    #[test]
    fn test_files_are_deduplicated_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let movie = dir.path().join("movie.mkv");
        let other = dir.path().join("movie.mp4");
        touch(&movie);
        touch(&other);

        let files = discover_inputs(
            &[
                movie.clone(),
                other,
                dir.path().join("missing.mkv"),
                dir.path().to_path_buf(),
            ],
            false,
        );
        assert_eq!(files, vec![movie]);
    }
}
