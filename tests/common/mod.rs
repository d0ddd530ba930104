//! Common test utilities for rollout integration tests

use std::path::PathBuf;
use tempfile::TempDir;

/// A temporary working directory for integration tests
#[allow(dead_code)]
pub struct TestSpace {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to the directory root
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestSpace {
    /// Create a new test directory
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a file below the directory root, creating parents as needed
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let file_path = self.path.join(relative);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }
}
