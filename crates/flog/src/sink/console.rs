//! Console output

use super::Sink;
use crate::{Level, LogEvent};
use std::io::{self, Write};

/// Writes `ERROR` lines to standard error and everything else to standard out.
#[derive(Debug)]
pub struct ConsoleSink<O = io::Stdout, E = io::Stderr> {
    out: O,
    err: E,
}

impl ConsoleSink {
    /// Sink bound to the process's standard streams.
    #[must_use]
    pub fn new() -> Self {
        Self {
            out: io::stdout(),
            err: io::stderr(),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl<O, E> ConsoleSink<O, E>
where
    O: Write + Send + 'static,
    E: Write + Send + 'static,
{
    /// Sink writing to arbitrary streams.
    pub const fn with_writers(out: O, err: E) -> Self {
        Self { out, err }
    }

    /// Consume the sink, returning its streams.
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

impl<O, E> Sink for ConsoleSink<O, E>
where
    O: Write + Send + 'static,
    E: Write + Send + 'static,
{
    fn write(&mut self, event: &LogEvent, line: &str) {
        let stream: &mut dyn Write = if event.level == Level::Error {
            &mut self.err
        } else {
            &mut self.out
        };

        // Nowhere left to report a console failure.
        let _ = stream.write_all(line.as_bytes());
        let _ = stream.flush();
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
        let _ = self.err.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_error_goes_to_stderr() {
        let mut sink = ConsoleSink::with_writers(Vec::new(), Vec::new());
        let logger: Arc<str> = Arc::from("console");

        let info = LogEvent::new(logger.clone(), Level::Info, "up");
        let debug = LogEvent::new(logger.clone(), Level::Debug, "detail");
        let error = LogEvent::new(logger, Level::Error, "down");

        sink.write(&info, "info line\n");
        sink.write(&debug, "debug line\n");
        sink.write(&error, "error line\n");

        let (out, err) = sink.into_inner();
        assert_eq!(String::from_utf8(out).unwrap(), "info line\ndebug line\n");
        assert_eq!(String::from_utf8(err).unwrap(), "error line\n");
    }
}
