// Destinations for exported widget artifacts
use crate::application::key_value_store::{ExportSink, StorageError};
use parking_lot::Mutex;
use std::fs;
use std::path::PathBuf;

/// Writes each offered artifact as a file in a directory.
#[derive(Debug, Clone)]
pub struct DirectoryExportSink {
    dir: PathBuf,
}

impl DirectoryExportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ExportSink for DirectoryExportSink {
    fn offer(&self, file_name: &str, contents: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Write {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.dir.join(file_name);
        fs::write(&path, contents).map_err(|source| StorageError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "widget exported");
        Ok(())
    }
}

/// Keeps offered artifacts in memory.
#[derive(Debug, Default)]
pub struct MemoryExportSink {
    offers: Mutex<Vec<(String, String)>>,
}

impl MemoryExportSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offers(&self) -> Vec<(String, String)> {
        self.offers.lock().clone()
    }
}

impl ExportSink for MemoryExportSink {
    fn offer(&self, file_name: &str, contents: &str) -> Result<(), StorageError> {
        self.offers
            .lock()
            .push((file_name.to_string(), contents.to_string()));
        Ok(())
    }
}
