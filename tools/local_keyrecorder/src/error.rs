//! Error types for the log store.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// I/O failure while preparing or writing the log file.
#[derive(Debug, Error)]
pub enum LogStoreError {
    #[error("failed to create log file {path}: {source}")]
    Create { path: PathBuf, source: io::Error },

    #[error("failed to read log file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to rewrite log file {path}: {source}")]
    Rewrite { path: PathBuf, source: io::Error },

    #[error("failed to append to log file {path}: {source}")]
    Append { path: PathBuf, source: io::Error },
}

impl LogStoreError {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Create { path, .. }
            | Self::Read { path, .. }
            | Self::Rewrite { path, .. }
            | Self::Append { path, .. } => path,
        }
    }
}
