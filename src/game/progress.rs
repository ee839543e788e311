//! Persistence of which levels are passed.
//!
//! The session only talks to the [`ProgressStore`] trait. [`FileProgress`]
//! keeps one line per level, `1` for passed and `0` otherwise.

use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("progress file {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    /// Another process is writing the same file.
    #[error("progress file {} is locked by another process", .path.display())]
    Locked { path: PathBuf },
}

/// Read/write access to the pass flags, one per level in catalogue order.
pub trait ProgressStore {
    /// Returns the stored flags. Nothing stored yet is an empty list.
    fn load(&self) -> Result<Vec<bool>, ProgressError>;
    /// Replaces the stored flags.
    fn save(&mut self, passed: &[bool]) -> Result<(), ProgressError>;
}

/// Progress kept in a plain text file.
#[derive(Clone, Debug)]
pub struct FileProgress {
    path: PathBuf,
}

impl FileProgress {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> ProgressError {
        ProgressError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// A line counts as passed when it holds a positive integer.
fn parse_flags(text: &str) -> Vec<bool> {
    text.lines()
        .map(|line| line.trim().parse::<i64>().map(|n| n > 0).unwrap_or(false))
        .collect()
}

impl ProgressStore for FileProgress {
    fn load(&self) -> Result<Vec<bool>, ProgressError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(parse_flags(&text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&mut self, passed: &[bool]) -> Result<(), ProgressError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        // held until `file` is dropped
        file.try_lock_exclusive()
            .map_err(|_| ProgressError::Locked {
                path: self.path.clone(),
            })?;

        let body: String = passed
            .iter()
            .map(|&flag| if flag { "1\n" } else { "0\n" })
            .collect();
        file.set_len(0).map_err(|e| self.io_error(e))?;
        file.write_all(body.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| self.io_error(e))
    }
}
