//! Path utilities: tool lookup and artifact naming

use std::path::{Path, PathBuf};

use crate::error::{Mkv2Ac3Error, Mkv2Ac3Result};
use crate::ports::Tool;

/// Platform executable file name of a tool
pub fn executable_name(tool: Tool) -> String {
    format!("{}{}", tool.name(), std::env::consts::EXE_SUFFIX)
}

/// Find a tool in `search_dir`, or on `PATH` when no directory is given.
///
/// An explicit directory is authoritative; there is no `PATH` fallback.
pub fn locate_tool(tool: Tool, search_dir: Option<&Path>) -> Mkv2Ac3Result<PathBuf> {
    let file_name = executable_name(tool);

    if let Some(dir) = search_dir {
        let candidate = dir.join(&file_name);
        return if candidate.is_file() {
            Ok(candidate)
        } else {
            Err(Mkv2Ac3Error::ToolNotFound {
                tool: tool.name().to_string(),
                searched: dir.display().to_string(),
            })
        };
    }

    std::env::var_os("PATH")
        .iter()
        .flat_map(std::env::split_paths)
        .map(|dir| dir.join(&file_name))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| Mkv2Ac3Error::ToolNotFound {
            tool: tool.name().to_string(),
            searched: "PATH".to_string(),
        })
}

/// File stem as a string, lossy for non-UTF-8 names
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Per-file temporary artifact `<stem>_track<id>.<ext>` inside the work directory
pub fn track_artifact(work_dir: &Path, source: &Path, track_id: u32, extension: &str) -> PathBuf {
    work_dir.join(format!(
        "{}_track{}.{}",
        file_stem(source),
        track_id,
        extension
    ))
}

/// Sibling of `path` with a new file name built from its stem
pub fn with_file_name(dir: &Path, source: &Path, suffix: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}{}.{}", file_stem(source), suffix, extension))
}

/// Directory containing `path`, `.` for bare file names
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_artifact_naming() {
        let path = track_artifact(Path::new("/tmp/work"), Path::new("/media/Movie.mkv"), 3, "dts");
        assert_eq!(path, PathBuf::from("/tmp/work/Movie_track3.dts"));
    }

    #[test]
    fn test_with_file_name() {
        let path = with_file_name(Path::new("/out"), Path::new("/media/Movie.mkv"), "-AC3", "mkv");
        assert_eq!(path, PathBuf::from("/out/Movie-AC3.mkv"));
    }

    #[test]
    fn test_parent_dir_of_bare_name() {
        assert_eq!(parent_dir(Path::new("Movie.mkv")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("/media/Movie.mkv")), PathBuf::from("/media"));
    }

    #[test]
    fn test_locate_tool_in_search_dir() {
        let dir = tempfile::tempdir().unwrap();
        let tool_path = dir.path().join(executable_name(Tool::MkvMerge));
        std::fs::write(&tool_path, b"").unwrap();

        let found = locate_tool(Tool::MkvMerge, Some(dir.path())).unwrap();
        assert_eq!(found, tool_path);
    }

    #[test]
    fn test_locate_tool_missing_from_search_dir() {
        let dir = tempfile::tempdir().unwrap();
        let result = locate_tool(Tool::MkvExtract, Some(dir.path()));
        match result {
            Err(Mkv2Ac3Error::ToolNotFound { tool, searched }) => {
                assert_eq!(tool, "mkvextract");
                assert_eq!(searched, dir.path().display().to_string());
            }
            other => panic!("expected ToolNotFound, got {:?}", other),
        }
    }
}
