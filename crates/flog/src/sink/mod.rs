//! Output sinks driven by a logger's consumer thread

mod console;
mod file;
mod memory;

pub use console::ConsoleSink;
pub use file::{ActiveFile, FileSink};
pub use memory::MemorySink;

use crate::LogEvent;

/// Destination for formatted lines.
///
/// A sink is moved into exactly one consumer thread and only ever touched
/// from there, so implementations need no internal locking for their own
/// state.
pub trait Sink: Send + 'static {
    /// Write one encoded line. `line` ends with `\n`.
    ///
    /// Failures are reported by the sink itself and never returned.
    fn write(&mut self, event: &LogEvent, line: &str);

    /// Push buffered output to its destination.
    fn flush(&mut self) {}
}
