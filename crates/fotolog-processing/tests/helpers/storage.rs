use fotolog_core::Config;
use std::path::PathBuf;
use tempfile::TempDir;

/// Scratch upload directory, removed on drop.
pub struct TestStorage {
    pub temp_dir: TempDir,
    pub upload_dir: PathBuf,
}

impl TestStorage {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let upload_dir = temp_dir.path().join("static").join("uploads");
        Self {
            temp_dir,
            upload_dir,
        }
    }

    /// Default configuration writing into this directory.
    pub fn config(&self) -> Config {
        Config {
            upload_dir: self.upload_dir.clone(),
            ..Config::default()
        }
    }

    pub fn stored_files(&self) -> Vec<String> {
        match std::fs::read_dir(&self.upload_dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().to_string())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Default for TestStorage {
    fn default() -> Self {
        Self::new()
    }
}
