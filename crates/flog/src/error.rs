//! Error types for the logging facility

use std::io;
use std::path::PathBuf;

/// Result type for logger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to the code that builds managers and loggers.
///
/// Failures on the write path never reach the emitting caller; they are
/// reported through `tracing` by the component that hit them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to create the log root or history directory
    #[error("failed to create log directory at {path}: {source}")]
    CreateDirectory {
        /// The path that failed to be created
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// The active log file could not be opened
    #[error("can't open log file {path}: {source}")]
    OpenFile {
        /// The file that failed to open
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// The consumer thread for a logger could not be started
    #[error("failed to spawn consumer thread: {0}")]
    SpawnConsumer(#[source] io::Error),

    /// The manager was already shut down
    #[error("log manager is shut down")]
    ShutDown,

    /// Unknown level name
    #[error("invalid log level: {0}")]
    InvalidLevel(String),
}
