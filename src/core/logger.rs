//! Loggers and propagators

use super::{
    config::LoggerConfig,
    dispatch::{Dispatcher, Ticket},
    error::Result,
    event::{CallSite, LogEvent},
    format::Format,
    level::Level,
    metrics::LoggerMetrics,
    sink::{RenderedLine, Sink},
    timestamp::TimestampFormat,
    token::{FormatToken, LevelFlags},
};
use crate::sinks::ConsoleSink;
use chrono::Local;
use parking_lot::RwLock;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

/// Queue capacity of [`Logger::notification`]
#[cfg(feature = "notification")]
const NOTIFICATION_QUEUE: usize = 64;

/// The capabilities a log pipeline exposes: identify, gate, render, deliver
///
/// [`Logger`] is the built-in implementation. [`LoggerGroup`] drives any
/// number of propagators through this trait.
pub trait Propagator: Send + Sync {
    fn name(&self) -> &str;

    /// Current threshold
    fn level(&self) -> Level;

    fn is_enabled(&self, level: Level) -> bool {
        level.passes(self.level())
    }

    /// Claim the next place in delivery order
    ///
    /// Called as soon as the gate passes, before the message is built, so
    /// lines reach the sink in the order their calls passed the gate.
    fn reserve(&self) -> Ticket {
        Ticket::unordered()
    }

    fn render(&self, event: &LogEvent<'_>) -> String;

    fn deliver(&self, ticket: Ticket, line: RenderedLine);

    /// Wait until delivered lines have reached the sink
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Render an accepted event and hand it to the propagator's sink
fn emit<P: Propagator + ?Sized>(propagator: &P, ticket: Ticket, event: &LogEvent<'_>) -> String {
    let text = propagator.render(event);
    propagator.deliver(ticket, RenderedLine::new(event.level, text.clone()));
    text
}

/// A named pipeline: level threshold, line format, and one sink
///
/// Threshold and format can be changed at any time through `&self`; the
/// change applies to calls that start afterwards.
///
/// # Example
///
/// ```
/// use echo_logger::prelude::*;
///
/// let memory = MemorySink::new();
/// let logger = Logger::builder()
///     .name("app")
///     .level(Level::Info)
///     .format(Format::message_only())
///     .sink(memory.clone())
///     .build();
///
/// assert_eq!(logger.warn(|| "disk low"), Some("disk low".to_string()));
/// assert_eq!(logger.debug(|| "hidden"), None);
/// assert_eq!(memory.lines(), vec!["disk low"]);
/// ```
pub struct Logger {
    name: String,
    threshold: RwLock<Level>,
    format: RwLock<Arc<Format>>,
    dispatcher: Dispatcher,
}

impl Logger {
    /// Synchronous logger with the standard format and a `Trace` threshold
    pub fn new(name: impl Into<String>, sink: impl Sink + 'static) -> Self {
        Self::builder().name(name).sink(sink).build()
    }

    /// Logger writing to the terminal
    pub fn console(name: impl Into<String>) -> Self {
        Self::new(name, ConsoleSink::new())
    }

    /// Logger raising desktop notifications titled with its name
    ///
    /// Delivery runs on a worker thread so a slow notification daemon never
    /// holds up the caller.
    #[cfg(feature = "notification")]
    pub fn notification(name: impl Into<String>) -> Self {
        let name = name.into();
        let sink = crate::sinks::NotificationSink::new(name.clone());
        Self::builder()
            .name(name)
            .format(Format::new(vec![
                FormatToken::SeverityFlag(LevelFlags::emoji()),
                FormatToken::literal(" "),
                FormatToken::Message,
            ]))
            .sink(sink)
            .async_mode(NOTIFICATION_QUEUE)
            .build()
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn set_level(&self, level: Level) {
        *self.threshold.write() = level;
    }

    /// Replace the line format for subsequent calls
    pub fn set_format(&self, format: impl Into<Format>) {
        *self.format.write() = Arc::new(format.into());
    }

    /// Replace the flag table of every severity flag in the current format
    pub fn set_flags(&self, flags: LevelFlags) {
        let mut guard = self.format.write();
        let mut format = Format::clone(&guard);
        format.set_flags(&flags);
        *guard = Arc::new(format);
    }

    /// Replace the clock format of every timestamp in the current format
    pub fn set_timestamp_format(&self, timestamp: TimestampFormat) {
        let mut guard = self.format.write();
        let mut format = Format::clone(&guard);
        format.set_timestamp_format(&timestamp);
        *guard = Arc::new(format);
    }

    /// The format in effect right now
    pub fn format(&self) -> Arc<Format> {
        Arc::clone(&self.format.read())
    }

    /// Log `message` at `level` from `call_site`
    ///
    /// Returns `None` without calling `message` when the level is gated out.
    /// Otherwise the call takes its place in delivery order, `message` runs
    /// exactly once, the line is rendered on this thread, handed to the
    /// delivery queue, and returned.
    pub fn log_at<F, M>(&self, level: Level, call_site: CallSite, message: F) -> Option<String>
    where
        F: FnOnce() -> M,
        M: Display,
    {
        if !self.is_enabled(level) {
            return None;
        }

        let ticket = self.reserve();
        let event = LogEvent::capture(level, call_site, &self.name, message().to_string());
        Some(emit(self, ticket, &event))
    }

    /// Log with the caller's file and line
    #[track_caller]
    #[inline]
    pub fn log<F, M>(&self, level: Level, message: F) -> Option<String>
    where
        F: FnOnce() -> M,
        M: Display,
    {
        self.log_at(level, CallSite::caller(), message)
    }

    #[track_caller]
    #[inline]
    pub fn trace<F: FnOnce() -> M, M: Display>(&self, message: F) -> Option<String> {
        self.log_at(Level::Trace, CallSite::caller(), message)
    }

    #[track_caller]
    #[inline]
    pub fn debug<F: FnOnce() -> M, M: Display>(&self, message: F) -> Option<String> {
        self.log_at(Level::Debug, CallSite::caller(), message)
    }

    #[track_caller]
    #[inline]
    pub fn info<F: FnOnce() -> M, M: Display>(&self, message: F) -> Option<String> {
        self.log_at(Level::Info, CallSite::caller(), message)
    }

    #[track_caller]
    #[inline]
    pub fn warn<F: FnOnce() -> M, M: Display>(&self, message: F) -> Option<String> {
        self.log_at(Level::Warn, CallSite::caller(), message)
    }

    #[track_caller]
    #[inline]
    pub fn error<F: FnOnce() -> M, M: Display>(&self, message: F) -> Option<String> {
        self.log_at(Level::Error, CallSite::caller(), message)
    }

    #[track_caller]
    #[inline]
    pub fn fatal<F: FnOnce() -> M, M: Display>(&self, message: F) -> Option<String> {
        self.log_at(Level::Fatal, CallSite::caller(), message)
    }

    /// Block until every line that passed the gate so far has reached the
    /// sink, then flush it
    ///
    /// Calling this from inside one of this logger's message closures
    /// deadlocks.
    pub fn flush(&self) -> Result<()> {
        self.dispatcher.flush()
    }

    /// Drain pending lines and stop the delivery worker
    ///
    /// Returns `true` if shutdown completed within `timeout`. The logger stays
    /// usable and delivers synchronously afterwards. Dropping the logger does
    /// the same with [`DEFAULT_SHUTDOWN_TIMEOUT`](super::dispatch::DEFAULT_SHUTDOWN_TIMEOUT).
    pub fn shutdown(&self, timeout: Duration) -> bool {
        self.dispatcher.shutdown(timeout)
    }

    pub fn is_async(&self) -> bool {
        self.dispatcher.is_async()
    }

    pub fn sink_name(&self) -> String {
        self.dispatcher.sink_name()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        self.dispatcher.metrics()
    }
}

impl Propagator for Logger {
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn level(&self) -> Level {
        *self.threshold.read()
    }

    fn render(&self, event: &LogEvent<'_>) -> String {
        // clone the Arc so a concurrent set_format never waits on rendering
        let format = self.format();
        format.render(event)
    }

    fn reserve(&self) -> Ticket {
        self.dispatcher.reserve()
    }

    fn deliver(&self, ticket: Ticket, line: RenderedLine) {
        self.dispatcher.submit(ticket, line);
    }

    fn flush(&self) -> Result<()> {
        self.dispatcher.flush()
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("sink", &self.sink_name())
            .field("async", &self.is_async())
            .finish()
    }
}

/// Builder for constructing a [`Logger`] with a fluent API
///
/// # Example
/// ```
/// use echo_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .name("worker")
///     .level(Level::Debug)
///     .format(Format::detailed())
///     .sink(ConsoleSink::new())
///     .async_mode(1000)
///     .build();
/// assert!(logger.is_async());
/// ```
pub struct LoggerBuilder {
    name: String,
    level: Level,
    format: Format,
    sink: Option<Box<dyn Sink>>,
    async_buffer: Option<usize>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            name: "echo".to_string(),
            level: Level::Trace,
            format: Format::default(),
            sink: None,
            async_buffer: None,
        }
    }

    /// Start from a loaded configuration; the sink still has to be chosen
    pub fn from_config(config: &LoggerConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Self::new()
            .name(config.name.clone())
            .level(config.level)
            .format(config.format.to_format());
        if let Some(capacity) = config.async_buffer {
            builder = builder.async_mode(capacity);
        }
        Ok(builder)
    }

    #[must_use = "builder methods return a new value"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn format(mut self, format: impl Into<Format>) -> Self {
        self.format = format.into();
        self
    }

    /// Set the sink; defaults to [`ConsoleSink`]
    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn boxed_sink(mut self, sink: Box<dyn Sink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Deliver from a worker thread through a queue of `capacity` lines
    ///
    /// If not called, delivery happens on the logging thread.
    #[must_use = "builder methods return a new value"]
    pub fn async_mode(mut self, capacity: usize) -> Self {
        self.async_buffer = Some(capacity);
        self
    }

    pub fn build(self) -> Logger {
        let sink = self
            .sink
            .unwrap_or_else(|| Box::new(ConsoleSink::new()) as Box<dyn Sink>);

        let dispatcher = match self.async_buffer {
            Some(capacity) => {
                Dispatcher::asynchronous(sink, capacity, &format!("echo-{}", self.name))
            }
            None => Dispatcher::synchronous(sink),
        };

        Logger {
            name: self.name,
            threshold: RwLock::new(self.level),
            format: RwLock::new(Arc::new(self.format)),
            dispatcher,
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Several propagators driven by one call
///
/// The message closure runs at most once per call, and only if at least one
/// member accepts the level. Every accepting member sees the same message and
/// the same clock reading.
///
/// # Example
///
/// ```
/// use echo_logger::prelude::*;
/// use std::sync::Arc;
///
/// let verbose = MemorySink::new();
/// let alerts = MemorySink::new();
///
/// let group = LoggerGroup::new()
///     .with(Arc::new(
///         Logger::builder().name("all").format(Format::message_only()).sink(verbose.clone()).build(),
///     ))
///     .with(Arc::new(
///         Logger::builder()
///             .name("alerts")
///             .level(Level::Error)
///             .format(Format::message_only())
///             .sink(alerts.clone())
///             .build(),
///     ));
///
/// group.info(|| "started");
/// group.error(|| "failed");
///
/// assert_eq!(verbose.lines(), vec!["started", "failed"]);
/// assert_eq!(alerts.lines(), vec!["failed"]);
/// ```
#[derive(Default, Clone)]
pub struct LoggerGroup {
    members: Vec<Arc<dyn Propagator>>,
}

impl LoggerGroup {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, member: Arc<dyn Propagator>) -> Self {
        self.members.push(member);
        self
    }

    pub fn push(&mut self, member: Arc<dyn Propagator>) {
        self.members.push(member);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether any member would accept `level`
    pub fn is_enabled(&self, level: Level) -> bool {
        self.members.iter().any(|m| m.is_enabled(level))
    }

    /// Log to every member whose gate accepts `level`
    ///
    /// Returns the rendered line of each accepting member, in member order.
    pub fn log_at<F, M>(&self, level: Level, call_site: CallSite, message: F) -> Vec<String>
    where
        F: FnOnce() -> M,
        M: Display,
    {
        // every accepting member takes its place before the closure runs
        let admitted: Vec<(&Arc<dyn Propagator>, Ticket)> = self
            .members
            .iter()
            .filter(|m| m.is_enabled(level))
            .map(|m| (m, m.reserve()))
            .collect();
        if admitted.is_empty() {
            return Vec::new();
        }

        let text = message().to_string();
        let timestamp = Local::now().fixed_offset();

        admitted
            .into_iter()
            .map(|(member, ticket)| {
                let event = LogEvent::at(
                    timestamp,
                    level,
                    call_site.clone(),
                    member.name(),
                    text.clone(),
                );
                emit(member.as_ref(), ticket, &event)
            })
            .collect()
    }

    #[track_caller]
    pub fn trace<F: FnOnce() -> M, M: Display>(&self, message: F) -> Vec<String> {
        self.log_at(Level::Trace, CallSite::caller(), message)
    }

    #[track_caller]
    pub fn debug<F: FnOnce() -> M, M: Display>(&self, message: F) -> Vec<String> {
        self.log_at(Level::Debug, CallSite::caller(), message)
    }

    #[track_caller]
    pub fn info<F: FnOnce() -> M, M: Display>(&self, message: F) -> Vec<String> {
        self.log_at(Level::Info, CallSite::caller(), message)
    }

    #[track_caller]
    pub fn warn<F: FnOnce() -> M, M: Display>(&self, message: F) -> Vec<String> {
        self.log_at(Level::Warn, CallSite::caller(), message)
    }

    #[track_caller]
    pub fn error<F: FnOnce() -> M, M: Display>(&self, message: F) -> Vec<String> {
        self.log_at(Level::Error, CallSite::caller(), message)
    }

    #[track_caller]
    pub fn fatal<F: FnOnce() -> M, M: Display>(&self, message: F) -> Vec<String> {
        self.log_at(Level::Fatal, CallSite::caller(), message)
    }

    /// Flush every member, reporting the first failure
    pub fn flush(&self) -> Result<()> {
        let mut first_error = None;
        for member in &self.members {
            if let Err(e) = member.flush() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
