//! Registry of named loggers sharing one configuration

use crate::Level;
use crate::config::{LogManagerConfig, OutputMode};
use crate::error::{Error, Result};
use crate::logger::{Logger, LoggerOptions};
use crate::sink::{ConsoleSink, FileSink};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Owns every logger of an application and their shared configuration.
///
/// Held and passed around by the application; there is no global instance.
/// Dropping the manager shuts it down.
#[derive(Debug)]
pub struct LogManager {
    config: LogManagerConfig,
    /// `None` once shut down
    loggers: Mutex<Option<HashMap<String, Arc<Logger>>>>,
}

impl LogManager {
    /// Create a manager. File mode creates the root and history folders.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CreateDirectory`] if a folder can't be created.
    pub fn new(config: LogManagerConfig) -> Result<Self> {
        if config.mode == OutputMode::File {
            create_dir(&config.root)?;
            if let Some(history) = &config.history {
                create_dir(history)?;
            }
        }

        Ok(Self {
            config,
            loggers: Mutex::new(Some(HashMap::new())),
        })
    }

    /// Manager writing to the console.
    #[must_use]
    pub fn console() -> Self {
        Self {
            config: LogManagerConfig::console(),
            loggers: Mutex::new(Some(HashMap::new())),
        }
    }

    /// Manager writing to `<app_folder>/log` with rotation at `max_file_size`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CreateDirectory`] if a folder can't be created.
    pub fn file(app_folder: impl AsRef<Path>, max_file_size: u64) -> Result<Self> {
        Self::new(LogManagerConfig::file(app_folder, max_file_size))
    }

    /// Shared configuration
    #[must_use]
    pub const fn config(&self) -> &LogManagerConfig {
        &self.config
    }

    /// Folder holding the active files
    #[must_use]
    pub fn log_folder(&self) -> &Path {
        &self.config.root
    }

    /// Folder receiving archived files, if any
    #[must_use]
    pub fn history_folder(&self) -> Option<&Path> {
        self.config.history.as_deref()
    }

    /// Get or create the logger `name` at the configured default level.
    ///
    /// # Errors
    ///
    /// See [`LogManager::new_logger_with_level`].
    pub fn new_logger(&self, name: &str) -> Result<Arc<Logger>> {
        self.new_logger_with_level(name, self.config.default_level)
    }

    /// Get or create the logger `name`.
    ///
    /// Lookup and creation happen under one lock, so concurrent callers get
    /// the same instance and a file is never opened twice. `level` applies
    /// only when the logger is created.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OpenFile`] if the active file can't be opened,
    /// [`Error::SpawnConsumer`] if the consumer can't start and
    /// [`Error::ShutDown`] after [`LogManager::shutdown`].
    pub fn new_logger_with_level(&self, name: &str, level: Level) -> Result<Arc<Logger>> {
        let mut guard = self.loggers.lock();
        let loggers = guard.as_mut().ok_or(Error::ShutDown)?;

        if let Some(logger) = loggers.get(name) {
            return Ok(logger.clone());
        }

        let options = LoggerOptions::from(&self.config).with_level(level);
        let logger = match self.config.mode {
            OutputMode::Console => Logger::spawn(name, ConsoleSink::new(), options)?,
            OutputMode::File => Logger::spawn(name, FileSink::open(name, &self.config)?, options)?,
        };

        loggers.insert(name.to_string(), logger.clone());
        Ok(logger)
    }

    /// Look up a logger without creating it
    #[must_use]
    pub fn logger(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers
            .lock()
            .as_ref()
            .and_then(|loggers| loggers.get(name).cloned())
    }

    /// Names of all registered loggers, sorted
    #[must_use]
    pub fn logger_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .loggers
            .lock()
            .as_ref()
            .map(|loggers| loggers.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Whether [`LogManager::shutdown`] ran
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.loggers.lock().is_none()
    }

    /// Close every logger: each drains its queue, then closes its file.
    ///
    /// Returns once all consumers exited. Archives still in flight are not
    /// waited for. Calling it again does nothing.
    pub fn shutdown(&self) {
        let Some(loggers) = self.loggers.lock().take() else {
            return;
        };

        for (name, logger) in loggers {
            debug!(logger = %name, "closing logger");
            logger.close();
        }
        info!("log manager shut down");
    }
}

impl Drop for LogManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| Error::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })
}
