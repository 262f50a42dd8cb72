//! Asynchronous per-logger text logging
//!
//! Each named [`Logger`] owns a bounded queue and one consumer thread that
//! formats events and writes them to the console or to a rotating file:
//! - Emit operations capture time and call site, then enqueue; no I/O on the
//!   caller's thread
//! - Events of one logger are written in the order they were captured
//! - A file is rotated once it reaches the configured size, and the rotated
//!   file is archived into a history folder in the background
//!
//! ```no_run
//! use flog::{LogManager, Result};
//!
//! fn main() -> Result<()> {
//!     let manager = LogManager::file("/var/lib/app", 10 * 1024 * 1024)?;
//!     let logger = manager.new_logger("server")?;
//!
//!     logger.info("listening");
//!     logger.error_with_request("req-1", "upstream timed out");
//!
//!     manager.shutdown();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, unreachable_pub)]
#![forbid(unsafe_code)]

mod archive;
mod config;
mod error;
mod event;
pub mod formatter;
mod level;
mod logger;
mod manager;
mod rotation;
pub mod sink;

pub use archive::{ArchiveError, ArchiveWorker};
pub use config::{
    DEFAULT_MAX_FILE_SIZE, DEFAULT_QUEUE_CAPACITY, LogManagerConfig, LogManagerConfigBuilder,
    OutputMode,
};
pub use error::{Error, Result};
pub use event::{Caller, LogEvent};
pub use level::Level;
pub use logger::{Logger, LoggerOptions};
pub use manager::LogManager;
pub use rotation::RotationController;
pub use sink::{ConsoleSink, FileSink, MemorySink, Sink};
