//! Log event record and call-site capture

use crate::Level;
use chrono::{DateTime, Local};
use std::panic::Location;
use std::sync::Arc;

/// Source position of the code that emitted an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    /// File base name, without directories
    pub file: &'static str,
    /// Line number
    pub line: u32,
}

impl Caller {
    /// Placeholder used when the call site is not resolved.
    pub const UNKNOWN: Self = Self { file: "?", line: 0 };

    /// Resolve the position of the nearest caller not marked `#[track_caller]`.
    #[track_caller]
    #[inline]
    #[must_use]
    pub fn capture() -> Self {
        Self::from_location(Location::caller())
    }

    /// Build from a `Location`, stripping the directory part of the path.
    #[must_use]
    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self {
            file: base_name(location.file()),
            line: location.line(),
        }
    }
}

impl Default for Caller {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

fn base_name(path: &'static str) -> &'static str {
    match path.rsplit(|c: char| c == '/' || c == '\\').next() {
        Some(name) if !name.is_empty() => name,
        _ => Caller::UNKNOWN.file,
    }
}

/// A captured log event.
///
/// Built on the emitting thread and moved through the logger's queue to its
/// consumer, which formats and writes it once.
#[derive(Debug, Clone)]
pub struct LogEvent {
    /// Name of the logger that captured the event
    pub logger: Arc<str>,
    /// Severity
    pub level: Level,
    /// Message text
    pub message: String,
    /// Optional request/correlation id
    pub request_id: Option<String>,
    /// Wall-clock capture time
    pub timestamp: DateTime<Local>,
    /// Emitting call site
    pub caller: Caller,
}

impl LogEvent {
    /// Create an event stamped with the current time and an unknown caller.
    pub fn new(logger: Arc<str>, level: Level, message: impl Into<String>) -> Self {
        Self {
            logger,
            level,
            message: message.into(),
            request_id: None,
            timestamp: Local::now(),
            caller: Caller::UNKNOWN,
        }
    }

    /// Builder-style method for setting the call site
    #[must_use]
    pub const fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = caller;
        self
    }

    /// Builder-style method for tagging the event with a request id
    #[must_use]
    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    /// Builder-style method for overriding the capture time
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
