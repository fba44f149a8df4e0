use crate::error::{IndexerError, Result};
use crate::options::IndexingOptions;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub struct ScannedEntry {
    pub path: PathBuf,
    pub is_dir: bool,
    pub mtime: DateTime<Utc>,
}

/// Depth-first directory walker used by pipeline phase P2. Prunes
/// directories matching `directory_skip_pattern` and omits files over
/// `max_filesize_mb`, byte for byte (a fractional megabyte count is
/// rounded down, so e.g. `100.0 / (1024.0 * 1024.0)` is an exact 100-byte
/// cutoff rather than snapping to whole megabytes).
pub struct FileScanner {
    skip_pattern: Regex,
    max_filesize_bytes: u64,
}

impl FileScanner {
    pub fn new(options: &IndexingOptions) -> Result<Self> {
        let skip_pattern = Regex::new(&options.directory_skip_pattern)
            .map_err(|e| IndexerError::InvalidPath(format!("invalid directory_skip_pattern: {e}")))?;
        Ok(Self {
            skip_pattern,
            max_filesize_bytes: (options.max_filesize_mb * 1024.0 * 1024.0).max(0.0) as u64,
        })
    }

    /// Walks `root`, depth first, skipping the root itself.
    pub fn walk(&self, root: &Path) -> Vec<ScannedEntry> {
        let walker = WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| {
                if entry.file_type().is_dir() {
                    let name = entry.file_name().to_string_lossy();
                    !self.skip_pattern.is_match(&name)
                } else {
                    true
                }
            });

        let mut out = Vec::new();
        for entry in walker.filter_map(|e| e.ok()) {
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            let is_dir = metadata.is_dir();
            if !is_dir && metadata.len() > self.max_filesize_bytes {
                continue;
            }
            let mtime = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            out.push(ScannedEntry {
                path: entry.into_path(),
                is_dir,
                mtime,
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn skips_dot_and_dunder_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/config"), "x").unwrap();
        fs::create_dir(dir.path().join("__pycache__")).unwrap();
        fs::write(dir.path().join("__pycache__/a.pyc"), "x").unwrap();
        fs::write(dir.path().join("main.py"), "print(1)").unwrap();

        let scanner = FileScanner::new(&IndexingOptions::default()).unwrap();
        let entries = scanner.walk(dir.path());

        assert!(entries.iter().any(|e| e.path.ends_with("main.py")));
        assert!(!entries.iter().any(|e| e.path.to_string_lossy().contains(".git")));
        assert!(!entries
            .iter()
            .any(|e| e.path.to_string_lossy().contains("__pycache__")));
    }

    #[test]
    fn skips_files_over_the_size_limit() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("small.py"), "x").unwrap();
        fs::write(dir.path().join("big.py"), vec![0u8; 1024]).unwrap();

        let mut options = IndexingOptions::default();
        options.max_filesize_mb = 0.0; // everything but zero-byte files is "too big"
        let scanner = FileScanner::new(&options).unwrap();
        let entries = scanner.walk(dir.path());

        assert!(!entries.iter().any(|e| e.path.ends_with("big.py")));
    }

    #[test]
    fn size_cutoff_is_exact_to_the_byte() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("tiny.py"), vec![b'x'; 22]).unwrap();
        fs::write(dir.path().join("large.py"), vec![b'x'; 600]).unwrap();

        let mut options = IndexingOptions::default();
        options.max_filesize_mb = 100.0 / (1024.0 * 1024.0);
        let scanner = FileScanner::new(&options).unwrap();
        let entries = scanner.walk(dir.path());

        assert!(entries.iter().any(|e| e.path.ends_with("tiny.py")));
        assert!(!entries.iter().any(|e| e.path.ends_with("large.py")));
    }

    #[test]
    fn size_cutoff_includes_a_file_exactly_at_the_limit() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("at_limit.py"), vec![b'x'; 100]).unwrap();
        fs::write(dir.path().join("over_limit.py"), vec![b'x'; 101]).unwrap();

        let mut options = IndexingOptions::default();
        options.max_filesize_mb = 100.0 / (1024.0 * 1024.0);
        let scanner = FileScanner::new(&options).unwrap();
        let entries = scanner.walk(dir.path());

        assert!(entries.iter().any(|e| e.path.ends_with("at_limit.py")));
        assert!(!entries.iter().any(|e| e.path.ends_with("over_limit.py")));
    }
}
