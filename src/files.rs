//! Input file lists and small file-system helpers

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::Result;

/// Paths from a newline separated list; blank lines and surrounding whitespace are ignored.
pub fn parse_file_list(contents: &str) -> Vec<PathBuf> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}

pub fn read_file_list(path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let contents = fs::read_to_string(path)?;
    Ok(parse_file_list(&contents))
}

/// Drop repeated paths, keeping the first occurrence.
///
/// Results are keyed by file, so a file listed twice would be read by two workers
/// under one label.
pub fn dedup_files(files: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    files
        .into_iter()
        .filter(|path| {
            let fresh = seen.insert(path.clone());
            if !fresh {
                warn!("Skipping duplicate input {}", path.display());
            }
            fresh
        })
        .collect()
}

/// Result label of a file
pub fn file_label(path: &Path) -> String {
    path.display().to_string()
}

pub fn file_size(path: impl AsRef<Path>) -> Result<u64> {
    Ok(fs::metadata(path)?.len())
}

/// Remove a benchmark artifact; failures are only logged.
pub fn delete_file(path: impl AsRef<Path>) {
    let path = path.as_ref();
    match fs::remove_file(path) {
        Ok(()) => info!("=== file: {} deleted successfully.", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("=== file: {} not found or already deleted.", path.display())
        }
        Err(e) => warn!("Error deleting file {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_file_list_skips_blanks_and_trims() {
        let files = parse_file_list("  a.exr\n\n\tb.exr  \r\n   \nc d.exr\n");
        assert_eq!(
            files,
            vec![PathBuf::from("a.exr"), PathBuf::from("b.exr"), PathBuf::from("c d.exr")]
        );
    }

    #[test]
    fn test_parse_empty_list() {
        assert!(parse_file_list("\n  \n").is_empty());
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let files = dedup_files(
            ["b.exr", "a.exr", "b.exr", "c.exr", "a.exr"]
                .iter()
                .map(PathBuf::from)
                .collect(),
        );
        assert_eq!(
            files,
            vec![PathBuf::from("b.exr"), PathBuf::from("a.exr"), PathBuf::from("c.exr")]
        );
    }

    #[test]
    fn test_read_file_list_and_sizes() {
        let dir = TempDir::new().unwrap();
        let frame = dir.path().join("frame.exr");
        fs::write(&frame, vec![0u8; 1234]).unwrap();

        let list = dir.path().join("files.txt");
        fs::write(&list, format!("{}\n\n", frame.display())).unwrap();

        let files = read_file_list(&list).unwrap();
        assert_eq!(files, vec![frame.clone()]);
        assert_eq!(file_size(&frame).unwrap(), 1234);
    }

    #[test]
    fn test_missing_file_size_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(file_size(dir.path().join("gone.exr")).is_err());
    }

    #[test]
    fn test_delete_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test_zip.exr");
        fs::write(&path, b"exr").unwrap();

        delete_file(&path);
        assert!(!path.exists());

        // Second delete only logs
        delete_file(&path);
    }
}
