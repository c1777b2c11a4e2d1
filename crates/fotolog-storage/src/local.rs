use crate::keys::{is_valid_filename, storage_filename};
use crate::traits::{Storage, StorageError, StorageResult};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// The directory is created lazily on the first write.
    ///
    /// # Arguments
    /// * `base_path` - Upload directory (e.g., "static/uploads")
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        LocalStorage {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert a stored filename to its path, rejecting anything that could
    /// escape the upload directory.
    pub fn path_of(&self, filename: &str) -> StorageResult<PathBuf> {
        if !is_valid_filename(filename) {
            return Err(StorageError::InvalidKey(format!(
                "Filename {:?} contains invalid characters",
                filename
            )));
        }
        Ok(self.base_path.join(filename))
    }

    fn ensure_dir(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.base_path).map_err(|e| StorageError::CreateDirFailed {
            path: self.base_path.display().to_string(),
            source: e,
        })
    }

    /// Write into a temp file beside the target, fsync, then rename into place.
    /// Generated names never replace an existing file; explicit names do.
    fn write_atomic(&self, path: &Path, data: &[u8], replace: bool) -> StorageResult<()> {
        let mut tmp = NamedTempFile::new_in(&self.base_path).map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to create temp file in {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        tmp.write_all(data).map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        tmp.as_file().sync_all().map_err(|e| {
            StorageError::WriteFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let persisted = if replace {
            tmp.persist(path)
        } else {
            tmp.persist_noclobber(path)
        };
        persisted.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to move file into {}: {}",
                path.display(),
                e.error
            ))
        })?;

        Ok(())
    }
}

impl Storage for LocalStorage {
    fn store(
        &self,
        data: &[u8],
        extension: &str,
        filename: Option<&str>,
    ) -> StorageResult<String> {
        let name = storage_filename(extension, filename);
        let path = self.path_of(&name)?;
        let size = data.len();

        self.ensure_dir()?;

        let start = Instant::now();
        self.write_atomic(&path, data, filename.is_some())?;

        tracing::info!(
            path = %path.display(),
            filename = %name,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(name)
    }

    fn read(&self, filename: &str) -> StorageResult<Vec<u8>> {
        let path = self.path_of(filename)?;

        match fs::read(&path) {
            Ok(data) => {
                tracing::debug!(
                    path = %path.display(),
                    size_bytes = data.len(),
                    "Local storage read successful"
                );
                Ok(data)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(filename.to_string()))
            }
            Err(e) => Err(StorageError::ReadFailed(format!(
                "Failed to read file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn exists(&self, filename: &str) -> StorageResult<bool> {
        let path = self.path_of(filename)?;
        Ok(path.try_exists()?)
    }

    fn delete(&self, filename: &str) -> StorageResult<()> {
        let path = self.path_of(filename)?;

        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Local storage delete successful");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Delete of missing file ignored");
                Ok(())
            }
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
