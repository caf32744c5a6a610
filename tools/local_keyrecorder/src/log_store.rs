//! Append-only, tagged log file.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::LogStoreError;

/// What `ensure_initialized` found on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagStatus {
    /// No file existed; it now holds only the tag line.
    Created,
    /// The file already contained the tag and was left untouched.
    Present,
    /// The tag was missing and has been prepended.
    Backfilled,
}

/// Owns one log file. Single writer; every write opens and closes the file.
#[derive(Debug, Clone)]
pub struct LogStore {
    path: PathBuf,
    tag: String,
}

impl LogStore {
    pub fn new(path: impl Into<PathBuf>, tag: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            tag: tag.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the file with the tag, or prepends the tag if an existing file
    /// lacks it. Existing bytes are preserved verbatim after the tag line.
    pub fn ensure_initialized(&self) -> Result<TagStatus, LogStoreError> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                fs::write(&self.path, self.tag_line()).map_err(|source| LogStoreError::Create {
                    path: self.path.clone(),
                    source,
                })?;
                return Ok(TagStatus::Created);
            }
            Err(source) => {
                return Err(LogStoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if contains(&content, self.tag.as_bytes()) {
            return Ok(TagStatus::Present);
        }

        let mut rewritten = self.tag_line().into_bytes();
        rewritten.extend_from_slice(&content);
        fs::write(&self.path, rewritten).map_err(|source| LogStoreError::Rewrite {
            path: self.path.clone(),
            source,
        })?;
        Ok(TagStatus::Backfilled)
    }

    /// Appends `text` verbatim, no separator added.
    pub fn append(&self, text: &str) -> Result<(), LogStoreError> {
        let map_err = |source| LogStoreError::Append {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(map_err)?;
        file.write_all(text.as_bytes()).map_err(map_err)?;
        Ok(())
    }

    fn tag_line(&self) -> String {
        format!("{}\n", self.tag)
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}
