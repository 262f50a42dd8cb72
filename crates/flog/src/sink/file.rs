//! Size-bounded file output

use super::Sink;
use crate::LogEvent;
use crate::config::LogManagerConfig;
use crate::error::{Error, Result};
use crate::rotation::RotationController;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// An open active file and the number of bytes it holds.
#[derive(Debug)]
pub struct ActiveFile {
    file: File,
    size: u64,
}

impl ActiveFile {
    /// Open `path` for appending, creating it if absent.
    ///
    /// The size starts at the file's current length so that a file left by
    /// an earlier run keeps counting towards the threshold.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let size = file.metadata()?.len();
        Ok(Self { file, size })
    }

    /// Bytes in the file since it was opened, including what it already held
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    fn write_line(&mut self, bytes: &[u8]) -> io::Result<()> {
        if let Err(e) = self.file.write_all(bytes) {
            // Part of the line may have landed; count what is on disk.
            if let Ok(metadata) = self.file.metadata() {
                self.size = metadata.len();
            }
            return Err(e);
        }
        self.size += bytes.len() as u64;
        Ok(())
    }

    fn sync(&self) -> io::Result<()> {
        self.file.sync_data()
    }

    /// Flush and sync everything, then close the handle.
    pub fn close(self) -> io::Result<()> {
        self.file.sync_all()
    }
}

/// Writes lines to `<root>/<name>.log`, rotating once the file reaches the
/// configured threshold.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    active: Option<ActiveFile>,
    max_file_size: u64,
    rotation: RotationController,
}

impl FileSink {
    /// Open the active file for logger `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OpenFile`] if the file can't be opened; the logger
    /// can't work without it.
    pub fn open(name: &str, config: &LogManagerConfig) -> Result<Self> {
        let path = config.active_path(name);
        let active = ActiveFile::open(&path).map_err(|source| Error::OpenFile {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), size = active.size(), "opened log file");

        Ok(Self {
            rotation: RotationController::new(name, &path, config),
            path,
            active: Some(active),
            max_file_size: config.max_file_size,
        })
    }

    /// Path of the active file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes held by the active file, or 0 while no file is open
    #[must_use]
    pub fn size(&self) -> u64 {
        self.active.as_ref().map_or(0, ActiveFile::size)
    }

    /// Write one line and rotate if the threshold is reached.
    ///
    /// Returns whether the line was written.
    pub fn write_line(&mut self, event: &LogEvent, line: &str) -> bool {
        if self.active.is_none() {
            self.reopen();
        }
        let Some(active) = self.active.as_mut() else {
            error!(path = %self.path.display(), "no open log file, line dropped");
            return false;
        };

        let written = match active.write_line(line.as_bytes()) {
            Ok(()) => {
                if let Err(e) = active.sync() {
                    error!(path = %self.path.display(), "error syncing log file: {e}");
                }
                true
            }
            Err(e) => {
                error!(path = %self.path.display(), "error writing to log file: {e}");
                false
            }
        };

        if active.size() >= self.max_file_size {
            let current = self.active.take();
            self.active = self.rotation.rotate(current, event.timestamp);
        }
        written
    }

    fn reopen(&mut self) {
        match ActiveFile::open(&self.path) {
            Ok(active) => self.active = Some(active),
            Err(e) => error!(path = %self.path.display(), "error reopening log file: {e}"),
        }
    }
}

impl Sink for FileSink {
    fn write(&mut self, event: &LogEvent, line: &str) {
        self.write_line(event, line);
    }

    fn flush(&mut self) {
        if let Some(active) = self.active.as_mut()
            && let Err(e) = active.file.sync_all()
        {
            error!(path = %self.path.display(), "error syncing log file: {e}");
        }
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if let Some(active) = self.active.take()
            && let Err(e) = active.close()
        {
            error!(path = %self.path.display(), "error closing log file: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Level, formatter};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn config(dir: &TempDir, max_file_size: u64) -> LogManagerConfig {
        LogManagerConfig::builder()
            .root(dir.path())
            .max_file_size(max_file_size)
            .build()
    }

    fn event(message: &str) -> (LogEvent, String) {
        let event = LogEvent::new(Arc::from("app"), Level::Info, message);
        let line = formatter::format_event(&event);
        (event, line)
    }

    fn rotated_files(dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("app_"))
            })
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_counts_existing_bytes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.log"), b"left over\n").unwrap();

        let sink = FileSink::open("app", &config(&dir, 1024)).unwrap();
        assert_eq!(sink.size(), 10);
    }

    #[test]
    fn test_write_tracks_size() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::open("app", &config(&dir, 1024)).unwrap();

        let (event, line) = event("hello");
        assert!(sink.write_line(&event, &line));
        assert!(sink.write_line(&event, &line));

        assert_eq!(sink.size(), 2 * line.len() as u64);
        assert_eq!(
            fs::read_to_string(sink.path()).unwrap(),
            format!("{line}{line}")
        );
    }

    #[test]
    fn test_rotates_at_threshold() {
        let dir = TempDir::new().unwrap();
        let (event, line) = event("0123456789");
        let threshold = 2 * line.len() as u64;
        let mut sink = FileSink::open("app", &config(&dir, threshold)).unwrap();

        sink.write_line(&event, &line);
        assert!(rotated_files(dir.path()).is_empty());

        sink.write_line(&event, &line);
        let rotated = rotated_files(dir.path());
        assert_eq!(rotated.len(), 1);
        assert_eq!(fs::metadata(&rotated[0]).unwrap().len(), threshold);
        assert_eq!(sink.size(), 0);
        assert_eq!(fs::metadata(sink.path()).unwrap().len(), 0);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_sync_failure_still_counts_and_rotates() {
        let dir = TempDir::new().unwrap();
        // fsync on /dev/null fails with EINVAL while writes succeed.
        std::os::unix::fs::symlink("/dev/null", dir.path().join("app.log")).unwrap();

        let (event, line) = event("0123456789");
        let mut sink = FileSink::open("app", &config(&dir, line.len() as u64)).unwrap();

        assert!(sink.write_line(&event, &line));

        let rotated = rotated_files(dir.path());
        assert_eq!(rotated.len(), 1);
        assert!(fs::symlink_metadata(&rotated[0]).unwrap().is_symlink());
        assert!(fs::symlink_metadata(sink.path()).unwrap().is_file());
        assert_eq!(sink.size(), 0);
    }

    #[test]
    fn test_failed_write_resyncs_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, b"1234567").unwrap();

        // Read-only handle: every write fails.
        let mut active = ActiveFile {
            file: File::open(&path).unwrap(),
            size: 0,
        };

        assert!(active.write_line(b"more\n").is_err());
        assert_eq!(active.size(), 7);
    }

    #[test]
    fn test_retries_open_on_next_write() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::open("app", &config(&dir, 1024)).unwrap();
        let (event, line) = event("retry");

        // As left by a rotation whose reopen failed.
        sink.active = None;
        fs::remove_file(sink.path()).unwrap();
        fs::create_dir(sink.path()).unwrap();

        assert!(!sink.write_line(&event, &line));
        assert_eq!(sink.size(), 0);

        fs::remove_dir(sink.path()).unwrap();

        assert!(sink.write_line(&event, &line));
        assert_eq!(sink.size(), line.len() as u64);
        assert_eq!(fs::read_to_string(sink.path()).unwrap(), line);
    }

    #[test]
    fn test_missing_root_fails_open() {
        let dir = TempDir::new().unwrap();
        let config = LogManagerConfig::builder()
            .root(dir.path().join("absent"))
            .build();

        assert!(matches!(
            FileSink::open("app", &config),
            Err(Error::OpenFile { .. })
        ));
    }
}
