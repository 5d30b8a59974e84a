//! Storage of decoder log files
//!
//! The rotating logger does not decide where files live or how many are
//! kept. It asks a [`Storage`] for a fresh path on every rotation and asks
//! it to prune after closing a file. One storage may serve many decoders.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Supplies log file paths and prunes old files
pub trait Storage: Send + Sync {
    /// Path for a new log file named after `prefix` and the tuned frequency
    fn path_for(&self, prefix: &str, frequency_hz: u64) -> io::Result<PathBuf>;

    /// Open a log file for exclusive writing
    ///
    /// Fails with [`io::ErrorKind::AlreadyExists`] rather than touching an
    /// existing file.
    fn open_log(&self, path: &Path) -> io::Result<File> {
        OpenOptions::new().write(true).create_new(true).open(path)
    }

    /// Remove stored files beyond the retention limit
    fn prune_old_files(&self);
}

/// Extension of log files
pub const LOG_EXTENSION: &str = "txt";

/// Default number of log files kept by [`DirStorage`]
pub const DEFAULT_MAX_FILES: usize = 100;

/// Keeps log files in one directory
///
/// Files are named `<PREFIX>-<frequencyHz>-<yyMMdd-HHmmss>-<seq>.txt`
/// using UTC time and a sequence number that makes every path handed out
/// unique; the oldest files are removed once more than `max_files` exist.
#[derive(Debug)]
pub struct DirStorage {
    dir: PathBuf,
    max_files: usize,
    sequence: AtomicU64,
}

impl DirStorage {
    pub fn new(dir: impl Into<PathBuf>, max_files: usize) -> Self {
        Self {
            dir: dir.into(),
            max_files,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Log files in the directory, oldest first
    pub fn stored_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut files: Vec<_> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().is_some_and(|ext| ext == LOG_EXTENSION)
            })
            .filter_map(|path| {
                let modified = path.metadata().and_then(|m| m.modified()).ok()?;
                Some((modified, path))
            })
            .collect();

        files.sort();
        Ok(files.into_iter().map(|(_, path)| path).collect())
    }
}

impl Storage for DirStorage {
    fn path_for(&self, prefix: &str, frequency_hz: u64) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let stamp = chrono::Utc::now().format("%y%m%d-%H%M%S").to_string();

        // Skip names left behind by another storage on the same directory
        loop {
            let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
            let path = self.dir.join(format!(
                "{}-{}-{}-{}.{}",
                prefix, frequency_hz, stamp, seq, LOG_EXTENSION
            ));
            if !path.exists() {
                return Ok(path);
            }
        }
    }

    fn prune_old_files(&self) {
        let files = match self.stored_files() {
            Ok(files) => files,
            Err(e) => {
                tracing::debug!("Cannot list {}: {}", self.dir.display(), e);
                return;
            }
        };

        let excess = files.len().saturating_sub(self.max_files);
        for path in files.into_iter().take(excess) {
            tracing::debug!("Removing old log file '{}'", path.display());
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::debug!("Failed to remove '{}': {}", path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "sig-stream-storage-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_path_for_names_file() {
        let dir = temp_dir("names");
        let storage = DirStorage::new(&dir, 10);

        let path = storage.path_for("PAGE", 152_000_000).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();

        assert!(dir.is_dir());
        assert!(name.starts_with("PAGE-152000000-"));
        assert!(name.ends_with(".txt"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_paths_unique_within_one_second() {
        let dir = temp_dir("unique");
        let storage = DirStorage::new(&dir, 10);

        let first = storage.path_for("PAGE", 0).unwrap();
        let second = storage.path_for("PAGE", 0).unwrap();
        assert_ne!(first, second);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_existing_names_skipped() {
        let dir = temp_dir("skip");
        let first = DirStorage::new(&dir, 10);
        let path = first.path_for("HFDL", 0).unwrap();
        std::fs::write(&path, b"kept\n").unwrap();

        // A second storage on the same directory starts its sequence over
        let second = DirStorage::new(&dir, 10);
        let other = second.path_for("HFDL", 0).unwrap();
        assert_ne!(other, path);
        assert_eq!(std::fs::read(&path).unwrap(), b"kept\n");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_open_log_is_exclusive() {
        let dir = temp_dir("exclusive");
        let storage = DirStorage::new(&dir, 10);
        let path = storage.path_for("EAS", 0).unwrap();

        assert!(storage.open_log(&path).is_ok());
        let err = storage.open_log(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_prune_keeps_newest() {
        let dir = temp_dir("prune");
        std::fs::create_dir_all(&dir).unwrap();
        let base = SystemTime::now() - Duration::from_secs(3600);

        for i in 0..5u64 {
            let path = dir.join(format!("PAGE-{}.txt", i));
            let file = std::fs::File::create(&path).unwrap();
            file.set_modified(base + Duration::from_secs(i * 60)).unwrap();
        }
        std::fs::write(dir.join("notes.md"), b"keep").unwrap();

        let storage = DirStorage::new(&dir, 2);
        storage.prune_old_files();

        let left = storage.stored_files().unwrap();
        assert_eq!(left, vec![dir.join("PAGE-3.txt"), dir.join("PAGE-4.txt")]);
        assert!(dir.join("notes.md").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
