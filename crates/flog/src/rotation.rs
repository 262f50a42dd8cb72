//! Size-triggered rotation of a logger's active file

use crate::archive::ArchiveWorker;
use crate::config::LogManagerConfig;
use crate::sink::ActiveFile;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Timestamp layout of rotated file names; `:` is replaced afterwards.
const STAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Moves a full active file aside and opens a fresh one.
///
/// Runs on the consumer thread of the owning logger. Archival of the rotated
/// file is handed to a detached [`ArchiveWorker`].
#[derive(Debug)]
pub struct RotationController {
    name: String,
    active_path: PathBuf,
    root: PathBuf,
    history: Option<PathBuf>,
    last_stamp: String,
    sequence: u32,
}

impl RotationController {
    /// Controller for logger `name` whose active file is `active_path`.
    pub fn new(name: &str, active_path: &Path, config: &LogManagerConfig) -> Self {
        Self {
            name: name.to_string(),
            active_path: active_path.to_path_buf(),
            root: config.root.clone(),
            history: config.history.clone(),
            last_stamp: String::new(),
            sequence: 0,
        }
    }

    /// Rotate the active file, returning the handle writes continue on.
    ///
    /// When the rename fails the old file is reopened and keeps growing.
    /// `None` means no file could be opened; the sink retries on its next write.
    pub fn rotate(
        &mut self,
        current: Option<ActiveFile>,
        at: DateTime<Local>,
    ) -> Option<ActiveFile> {
        let file_name = self.next_file_name(at);
        self.rotate_to(current, &file_name)
    }

    fn rotate_to(&self, current: Option<ActiveFile>, file_name: &str) -> Option<ActiveFile> {
        if let Some(current) = current
            && let Err(e) = current.close()
        {
            error!(
                path = %self.active_path.display(),
                "error syncing log file before rotation: {e}"
            );
        }

        let rotated_path = self.root.join(file_name);

        let renamed = match fs::rename(&self.active_path, &rotated_path) {
            Ok(()) => true,
            Err(e) => {
                error!(
                    from = %self.active_path.display(),
                    to = %rotated_path.display(),
                    "error renaming log file: {e}"
                );
                false
            }
        };

        let active = match ActiveFile::open(&self.active_path) {
            Ok(active) => Some(active),
            Err(e) => {
                error!(
                    path = %self.active_path.display(),
                    "error opening log file after rotation: {e}"
                );
                None
            }
        };

        if renamed {
            info!(logger = %self.name, file = %file_name, "rotated log file");
            if let Some(history) = &self.history {
                ArchiveWorker::new(rotated_path, history.join(file_name)).spawn();
            }
        }

        active
    }

    /// Next unused `<name>_<timestamp>[_<n>].log`.
    ///
    /// Rotations within the same millisecond get an increasing suffix, and a
    /// name already present in the root or history folder is skipped.
    pub fn next_file_name(&mut self, at: DateTime<Local>) -> String {
        let stamp = at.format(STAMP_FORMAT).to_string().replace(':', "_");

        if stamp == self.last_stamp {
            self.sequence += 1;
        } else {
            self.last_stamp = stamp;
            self.sequence = 0;
        }

        loop {
            let file_name = if self.sequence == 0 {
                format!("{}_{}.log", self.name, self.last_stamp)
            } else {
                format!("{}_{}_{}.log", self.name, self.last_stamp, self.sequence)
            };

            if !self.is_taken(&file_name) {
                return file_name;
            }
            self.sequence += 1;
        }
    }

    fn is_taken(&self, file_name: &str) -> bool {
        self.root.join(file_name).exists()
            || self
                .history
                .as_ref()
                .is_some_and(|history| history.join(file_name).exists())
    }
}
