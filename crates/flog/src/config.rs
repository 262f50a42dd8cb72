//! Log manager configuration

use crate::Level;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default rotation threshold (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default per-logger queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// Where loggers send formatted lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Standard out, or standard error for `ERROR`
    #[default]
    Console,
    /// One rotating file per logger under the root folder
    File,
}

/// Shared configuration of a [`LogManager`](crate::LogManager)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogManagerConfig {
    /// Console or file output
    pub mode: OutputMode,
    /// Folder holding active and freshly rotated files
    pub root: PathBuf,
    /// Folder receiving archived files; rotated files stay in `root` when unset
    pub history: Option<PathBuf>,
    /// Rotation threshold in bytes
    pub max_file_size: u64,
    /// Threshold given to loggers created without an explicit level
    pub default_level: Level,
    /// Bound of each logger's event queue
    pub queue_capacity: usize,
    /// Resolve the emitting call site; `?:0` is written when disabled
    pub capture_caller: bool,
}

impl Default for LogManagerConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::Console,
            root: PathBuf::new(),
            history: None,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            default_level: Level::Debug,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            capture_caller: true,
        }
    }
}

impl LogManagerConfig {
    /// Console output, no filesystem activity.
    #[must_use]
    pub fn console() -> Self {
        Self::default()
    }

    /// File output under `<app_folder>/log`, archiving into `<app_folder>/log/history`.
    pub fn file(app_folder: impl AsRef<Path>, max_file_size: u64) -> Self {
        let root = app_folder.as_ref().join("log");
        let history = root.join("history");
        Self {
            mode: OutputMode::File,
            root,
            history: Some(history),
            max_file_size,
            ..Self::default()
        }
    }

    /// Start a builder from the defaults.
    #[must_use]
    pub fn builder() -> LogManagerConfigBuilder {
        LogManagerConfigBuilder::default()
    }

    /// Path of the active file for `name`.
    pub fn active_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.log"))
    }
}

/// Builder for [`LogManagerConfig`]
#[derive(Debug, Clone, Default)]
pub struct LogManagerConfigBuilder {
    config: LogManagerConfig,
}

impl LogManagerConfigBuilder {
    /// Set the output mode
    #[must_use]
    pub const fn mode(mut self, mode: OutputMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Switch to file output rooted at `root`
    #[must_use]
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.mode = OutputMode::File;
        self.config.root = root.into();
        self
    }

    /// Set the archive folder
    #[must_use]
    pub fn history(mut self, history: impl Into<PathBuf>) -> Self {
        self.config.history = Some(history.into());
        self
    }

    /// Keep rotated files in the root folder
    #[must_use]
    pub fn no_history(mut self) -> Self {
        self.config.history = None;
        self
    }

    /// Set the rotation threshold in bytes
    #[must_use]
    pub const fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    /// Set the threshold for loggers created without one
    #[must_use]
    pub const fn default_level(mut self, level: Level) -> Self {
        self.config.default_level = level;
        self
    }

    /// Set the per-logger queue capacity
    #[must_use]
    pub const fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Enable or disable call-site capture
    #[must_use]
    pub const fn capture_caller(mut self, enabled: bool) -> Self {
        self.config.capture_caller = enabled;
        self
    }

    /// Finish the configuration
    #[must_use]
    pub fn build(mut self) -> LogManagerConfig {
        self.config.queue_capacity = self.config.queue_capacity.max(1);
        self.config
    }
}
