//! Named logger: level filtering, bounded queue and consumer thread

use crate::config::LogManagerConfig;
use crate::error::{Error, Result};
use crate::sink::Sink;
use crate::{Caller, Level, LogEvent, formatter};
use parking_lot::Mutex;
use std::future::Future;
use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use tracing::{debug, error};

/// Messages carried by a logger's queue
#[derive(Debug)]
enum Message {
    Event(LogEvent),
    /// Answered once everything queued before it is written
    Flush(flume::Sender<()>),
    /// Drain what came before, then exit
    Shutdown,
}

/// Per-logger settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggerOptions {
    /// Minimum captured level; `ERROR` is always captured
    pub level: Level,
    /// Queue bound; emitters block while it is full
    pub queue_capacity: usize,
    /// Resolve call sites, or write `?:0`
    pub capture_caller: bool,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self::from(&LogManagerConfig::default())
    }
}

impl From<&LogManagerConfig> for LoggerOptions {
    fn from(config: &LogManagerConfig) -> Self {
        Self {
            level: config.default_level,
            queue_capacity: config.queue_capacity,
            capture_caller: config.capture_caller,
        }
    }
}

impl LoggerOptions {
    /// Builder-style method for setting the level
    #[must_use]
    pub const fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }
}

/// A named logger.
///
/// Emitting captures the event on the calling thread and enqueues it; a
/// dedicated consumer thread formats and writes events in the order they
/// were enqueued. The sink lives only on that thread.
pub struct Logger {
    name: Arc<str>,
    level: AtomicU8,
    capture_caller: bool,
    sender: flume::Sender<Message>,
    closed: AtomicBool,
    /// Emitters between their closed check and the end of their send
    in_flight: AtomicUsize,
    consumer: Mutex<Option<JoinHandle<()>>>,
}

/// Registration of one emitter in [`Logger::in_flight`]
struct Admission<'a>(&'a AtomicUsize);

impl Drop for Admission<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("queued", &self.sender.len())
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Start a logger writing to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SpawnConsumer`] if the consumer thread can't start.
    pub fn spawn<S: Sink>(
        name: impl Into<Arc<str>>,
        sink: S,
        options: LoggerOptions,
    ) -> Result<Arc<Self>> {
        let name = name.into();
        let (sender, receiver) = flume::bounded(options.queue_capacity.max(1));

        let consumer = thread::Builder::new()
            .name(format!("flog-{name}"))
            .spawn(move || consume(&receiver, sink))
            .map_err(Error::SpawnConsumer)?;

        Ok(Arc::new(Self {
            name,
            level: AtomicU8::new(options.level as u8),
            capture_caller: options.capture_caller,
            sender,
            closed: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            consumer: Mutex::new(Some(consumer)),
        }))
    }

    /// Logger name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current threshold
    #[must_use]
    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// Change the threshold for subsequent emits
    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    /// Whether an event at `level` would be captured
    #[inline]
    #[must_use]
    pub fn is_enabled(&self, level: Level) -> bool {
        level.passes(self.level())
    }

    /// Events waiting in the queue
    #[must_use]
    pub fn queued(&self) -> usize {
        self.sender.len()
    }

    /// Whether the logger was shut down
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Log at `level`. Blocks while the queue is full.
    #[track_caller]
    pub fn log(&self, level: Level, message: impl Into<String>) {
        if let Some(event) = self.capture(level, None, message, Location::caller()) {
            self.enqueue(event);
        }
    }

    /// Log at `level`, tagged with a request id. Blocks while the queue is full.
    #[track_caller]
    pub fn log_with_request(
        &self,
        level: Level,
        request_id: impl Into<String>,
        message: impl Into<String>,
    ) {
        let request_id = Some(request_id.into());
        if let Some(event) = self.capture(level, request_id, message, Location::caller()) {
            self.enqueue(event);
        }
    }

    /// Log a debug message
    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::Debug, message);
    }

    /// Log an info message
    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    /// Log an error message
    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message);
    }

    /// Log a debug message for a request
    #[track_caller]
    pub fn debug_with_request(&self, request_id: impl Into<String>, message: impl Into<String>) {
        self.log_with_request(Level::Debug, request_id, message);
    }

    /// Log an info message for a request
    #[track_caller]
    pub fn info_with_request(&self, request_id: impl Into<String>, message: impl Into<String>) {
        self.log_with_request(Level::Info, request_id, message);
    }

    /// Log an error message for a request
    #[track_caller]
    pub fn error_with_request(&self, request_id: impl Into<String>, message: impl Into<String>) {
        self.log_with_request(Level::Error, request_id, message);
    }

    /// Log at `level` from async code, waiting for queue space instead of
    /// blocking the thread. The call site is captured when this is called,
    /// not when the future is polled.
    #[track_caller]
    pub fn log_async(
        &self,
        level: Level,
        message: impl Into<String>,
    ) -> impl Future<Output = ()> + Send + '_ {
        let event = self.capture(level, None, message, Location::caller());
        async move {
            if let Some(event) = event {
                self.enqueue_async(event).await;
            }
        }
    }

    /// Async [`Logger::debug`]
    #[track_caller]
    pub fn debug_async(&self, message: impl Into<String>) -> impl Future<Output = ()> + Send + '_ {
        self.log_async(Level::Debug, message)
    }

    /// Async [`Logger::info`]
    #[track_caller]
    pub fn info_async(&self, message: impl Into<String>) -> impl Future<Output = ()> + Send + '_ {
        self.log_async(Level::Info, message)
    }

    /// Async [`Logger::error`]
    #[track_caller]
    pub fn error_async(&self, message: impl Into<String>) -> impl Future<Output = ()> + Send + '_ {
        self.log_async(Level::Error, message)
    }

    /// Block until every event emitted before this call is written.
    pub fn flush(&self) {
        if self.is_closed() {
            return;
        }
        let (ack, done) = flume::bounded(1);
        if self.sender.send(Message::Flush(ack)).is_ok() {
            // Err means the consumer exited first, which also drained the queue.
            let _ = done.recv();
        }
    }

    /// Async [`Logger::flush`]
    pub async fn flush_async(&self) {
        if self.is_closed() {
            return;
        }
        let (ack, done) = flume::bounded(1);
        if self.sender.send_async(Message::Flush(ack)).await.is_ok() {
            let _ = done.recv_async().await;
        }
    }

    /// Stop accepting events, let the consumer drain the queue and close
    /// the sink, and wait for it to exit.
    pub(crate) fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        // Every send admitted before the swap must land ahead of the marker.
        // Those sends only wait on a full queue, which the consumer keeps draining.
        while self.in_flight.load(Ordering::SeqCst) != 0 {
            thread::yield_now();
        }

        // Blocks only while the consumer is still draining a full queue.
        let _ = self.sender.send(Message::Shutdown);

        if let Some(consumer) = self.consumer.lock().take()
            && consumer.join().is_err()
        {
            error!(logger = %self.name, "log consumer thread panicked");
        }
        debug!(logger = %self.name, "logger closed");
    }

    fn capture(
        &self,
        level: Level,
        request_id: Option<String>,
        message: impl Into<String>,
        location: &'static Location<'static>,
    ) -> Option<LogEvent> {
        if !self.is_enabled(level) || self.is_closed() {
            return None;
        }

        let caller = if self.capture_caller {
            Caller::from_location(location)
        } else {
            Caller::UNKNOWN
        };

        Some(
            LogEvent::new(self.name.clone(), level, message)
                .with_request_id(request_id)
                .with_caller(caller),
        )
    }

    /// Register an emitter unless the logger is closed.
    fn admit(&self) -> Option<Admission<'_>> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let admission = Admission(&self.in_flight);
        if self.closed.load(Ordering::SeqCst) {
            return None;
        }
        Some(admission)
    }

    /// Returns whether the event was queued ahead of shutdown.
    fn enqueue(&self, event: LogEvent) -> bool {
        let Some(_admission) = self.admit() else {
            return false;
        };
        self.sender.send(Message::Event(event)).is_ok()
    }

    async fn enqueue_async(&self, event: LogEvent) -> bool {
        let Some(_admission) = self.admit() else {
            return false;
        };
        self.sender.send_async(Message::Event(event)).await.is_ok()
    }
}

/// Consumer loop: strictly FIFO, one sink, exits after draining.
fn consume<S: Sink>(receiver: &flume::Receiver<Message>, mut sink: S) {
    let mut line = String::with_capacity(256);

    while let Ok(message) = receiver.recv() {
        match message {
            Message::Event(event) => {
                line.clear();
                formatter::format_into(&event, &mut line);
                sink.write(&event, &line);
            }
            Message::Flush(ack) => {
                sink.flush();
                let _ = ack.send(());
            }
            Message::Shutdown => break,
        }
    }

    sink.flush();
}
