//! In-memory sink, mostly for tests

use super::Sink;
use crate::LogEvent;
use parking_lot::Mutex;
use std::sync::Arc;

/// Collects formatted lines in memory.
///
/// Clones share the same buffer, so a test can keep one clone while the
/// other is moved into a logger.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all captured lines
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Number of captured lines
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    /// Whether nothing was captured yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    /// Check if any line contains `text`
    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.lines.lock().iter().any(|line| line.contains(text))
    }

    /// Drop all captured lines
    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl Sink for MemorySink {
    fn write(&mut self, _event: &LogEvent, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
