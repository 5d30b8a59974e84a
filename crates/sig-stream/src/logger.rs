//! Rotating log of raw decoder lines
//!
//! When a decoder runs unattended every line it prints is appended to a
//! log file. After a fixed number of lines the file is closed, old files
//! are pruned and the next line opens a fresh file. Logging is best
//! effort: failures are reported through `tracing` and never reach the
//! decode path.

use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::storage::Storage;

/// Lines written to one file before it is rotated
pub const DEFAULT_MAX_LINES: usize = 10_000;

/// Paths tried when the storage hands out names that are already taken
const OPEN_ATTEMPTS: usize = 3;

struct OpenLog {
    path: PathBuf,
    file: File,
}

/// Line logger that rotates files through a [`Storage`]
pub struct RotatingLogger {
    storage: Arc<dyn Storage>,
    prefix: String,
    frequency_hz: u64,
    max_lines: usize,
    current: Option<OpenLog>,
    lines: usize,
}

impl RotatingLogger {
    /// Create a logger naming its files with `prefix`
    ///
    /// No file is opened until the first write.
    pub fn new(storage: Arc<dyn Storage>, prefix: impl Into<String>, max_lines: usize) -> Self {
        Self {
            storage,
            prefix: prefix.into(),
            frequency_hz: 0,
            max_lines: max_lines.max(1),
            current: None,
            lines: 0,
        }
    }

    /// Frequency used to name the next file
    pub fn set_frequency(&mut self, frequency_hz: u64) {
        self.frequency_hz = frequency_hz;
    }

    /// Path of the currently open file, if any
    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|log| log.path.as_path())
    }

    /// Lines written to the current file
    pub fn lines_in_file(&self) -> usize {
        self.lines
    }

    /// Append one raw line, terminator included
    pub fn write(&mut self, raw: &[u8]) {
        if self.current.is_none() {
            self.open();
        }

        let Some(log) = self.current.as_mut() else {
            return;
        };

        if let Err(e) = log.file.write_all(raw) {
            debug!("Failed writing to log file '{}': {}", log.path.display(), e);
            // Start over with a fresh file on the next line
            self.current = None;
            self.lines = 0;
            return;
        }

        self.lines += 1;
        if self.lines >= self.max_lines {
            self.close();
        }
    }

    /// Close the current file and prune old files
    pub fn close(&mut self) {
        let Some(mut log) = self.current.take() else {
            return;
        };

        debug!("Closing log file '{}'", log.path.display());
        if let Err(e) = log.file.flush() {
            debug!("Failed flushing log file '{}': {}", log.path.display(), e);
        }
        drop(log);
        self.lines = 0;

        debug!("Performing storage cleanup");
        self.storage.prune_old_files();
    }

    fn open(&mut self) {
        for _ in 0..OPEN_ATTEMPTS {
            let path = match self.storage.path_for(&self.prefix, self.frequency_hz) {
                Ok(path) => path,
                Err(e) => {
                    debug!("No path for {} log file: {}", self.prefix, e);
                    return;
                }
            };

            debug!("Opening log file '{}'", path.display());
            match self.storage.open_log(&path) {
                Ok(file) => {
                    self.current = Some(OpenLog { path, file });
                    self.lines = 0;
                    return;
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("Log file '{}' already exists", path.display());
                }
                Err(e) => {
                    debug!("Failed opening log file '{}': {}", path.display(), e);
                    return;
                }
            }
        }
    }
}

impl Drop for RotatingLogger {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for RotatingLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingLogger")
            .field("prefix", &self.prefix)
            .field("frequency_hz", &self.frequency_hz)
            .field("max_lines", &self.max_lines)
            .field("current", &self.current_path())
            .field("lines", &self.lines)
            .finish()
    }
}
