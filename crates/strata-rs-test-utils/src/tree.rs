//! Temporary config file trees.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory that config files are written into.
///
/// The directory is removed when the tree is dropped.
pub struct ConfigTree {
    root: TempDir,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("tmp"),
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Path of `relative` under the tree root, without creating it.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    /// Write a file, creating parent directories if needed.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("dir");
        }
        fs::write(&path, contents).expect("write");
        path
    }

    /// Create an empty directory.
    pub fn dir(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(&path).expect("dir");
        path
    }
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self::new()
    }
}
