//! Scratch directories and output paths for tests.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Creates a temporary directory with a specific prefix.
///
/// The directory is deleted when the returned `TempDir` is dropped.
pub fn temp_test_dir_with_prefix(prefix: &str) -> TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("Failed to create temp directory")
}

/// A scratch directory holding an input raster and the conversion outputs
/// derived from it.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    pub fn new() -> Self {
        Self {
            dir: temp_test_dir_with_prefix("raster-h3-"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a file inside the scratch directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Path of the conversion log inside the scratch directory.
    pub fn log_path(&self) -> PathBuf {
        self.file("h3_conversion.log")
    }

    /// Files directly inside `sub` (relative to the scratch root), sorted.
    pub fn list(&self, sub: &str) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(self.dir.path().join(sub))
            .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()).collect())
            .unwrap_or_default();
        files.sort();
        files
    }
}

impl Default for ScratchDir {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_dir() {
        let scratch = ScratchDir::new();
        assert!(scratch.path().exists());
        assert_eq!(scratch.file("a.tif").parent(), Some(scratch.path()));
        assert!(scratch.list("missing").is_empty());

        std::fs::write(scratch.file("b.csv"), "x").unwrap();
        std::fs::write(scratch.file("a.csv"), "x").unwrap();
        let files = scratch.list("");
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.csv"));
    }

    #[test]
    fn test_temp_dir_with_prefix() {
        let dir = temp_test_dir_with_prefix("h3-");
        let name = dir.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("h3-"));
    }
}
