//! Background archival of rotated files

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use tracing::{debug, error};

/// Archive step that failed, with its cause.
#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
pub struct ArchiveError(&'static str, #[source] io::Error);

/// Copies one rotated file into the history folder and removes the original.
///
/// The source is deleted only after the copy is synced. On any failure the
/// source stays where it is.
#[derive(Debug, Clone)]
pub struct ArchiveWorker {
    source: PathBuf,
    destination: PathBuf,
}

impl ArchiveWorker {
    /// Worker moving `source` to `destination`
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Run on a detached thread; failures are reported through `tracing`.
    ///
    /// Nothing waits for the returned handle outside of tests.
    pub fn spawn(self) -> Option<JoinHandle<()>> {
        let source = self.source.clone();
        let spawned = thread::Builder::new()
            .name("flog-archive".to_string())
            .spawn(move || self.run_reported());

        match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!(source = %source.display(), "failed to spawn archive thread: {e}");
                None
            }
        }
    }

    fn run_reported(self) {
        match self.run() {
            Ok(bytes) => debug!(
                source = %self.source.display(),
                destination = %self.destination.display(),
                bytes,
                "archived log file"
            ),
            Err(e) => error!(
                source = %self.source.display(),
                destination = %self.destination.display(),
                "error archiving log file: {e}"
            ),
        }
    }

    /// Copy, sync, then remove the source. Returns the bytes copied.
    ///
    /// # Errors
    ///
    /// Returns the failing step. After a failed copy the partial destination
    /// is removed; the source is kept in every failure case.
    pub fn run(&self) -> Result<u64, ArchiveError> {
        let mut from = File::open(&self.source).map_err(|e| ArchiveError("error opening file", e))?;
        let mut to =
            File::create(&self.destination).map_err(|e| ArchiveError("error creating file", e))?;

        let copied = io::copy(&mut from, &mut to).and_then(|bytes| to.sync_all().map(|()| bytes));
        drop(to);
        drop(from);

        let bytes = match copied {
            Ok(bytes) => bytes,
            Err(e) => {
                discard_partial(&self.destination);
                return Err(ArchiveError("error copying file", e));
            }
        };

        fs::remove_file(&self.source).map_err(|e| ArchiveError("error removing file", e))?;
        Ok(bytes)
    }
}

fn discard_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        error!(path = %path.display(), "error removing partial archive: {e}");
    }
}
