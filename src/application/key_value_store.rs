// Durable key-value persistence seam
use std::path::PathBuf;

pub const DASHBOARD_KEY: &str = "sensecanvas-dashboard";
pub const THEME_KEY: &str = "sensecanvas-theme";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to read '{key}'")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write '{}'", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
}

/// String-valued storage that outlives the process.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Receives artifacts offered to the user as downloadable files.
pub trait ExportSink: Send + Sync {
    fn offer(&self, file_name: &str, contents: &str) -> Result<(), StorageError>;
}
