//! # Echo Logger
//!
//! A leveled logging library where every line layout is data.
//!
//! ## Features
//!
//! - **Token formats**: a line is an ordered list of [`FormatToken`]s (literal
//!   text, timestamp, severity flag, file, function, line, message, logger
//!   name), swappable at runtime
//! - **Lazy messages**: the message closure only runs when the level passes
//!   the logger's threshold
//! - **Ordered delivery**: each logger owns one queue, synchronous or backed
//!   by a worker thread; lines arrive in the order their calls passed the
//!   level gate, across all threads
//! - **Pluggable sinks**: console, desktop notification, file, memory, or any
//!   closure
//!
//! ## Example
//!
//! ```
//! use echo_logger::prelude::*;
//! use echo_logger::warn;
//!
//! let memory = MemorySink::new();
//! let logger = Logger::builder()
//!     .name("app")
//!     .level(Level::Info)
//!     .format(vec![
//!         FormatToken::flag(LevelFlags::new().with(Level::Warn, "W")),
//!         FormatToken::literal(" "),
//!         FormatToken::Message,
//!     ])
//!     .sink(memory.clone())
//!     .build();
//!
//! let free = 3;
//! warn!(logger, "disk low: {}%", free);
//! assert_eq!(memory.lines(), vec!["W disk low: 3%"]);
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    #[cfg(feature = "file")]
    pub use crate::sinks::FileSink;
    #[cfg(feature = "notification")]
    pub use crate::sinks::NotificationSink;
    pub use crate::sinks::{ConsoleSink, ConsoleTarget, FnSink, MemorySink};
    pub use crate::core::{
        CallSite, Format, FormatConfig, FormatToken, Level, LevelFlags, LogEvent, Logger,
        LoggerBuilder, LoggerConfig, LoggerError, LoggerGroup, LoggerMetrics, Propagator,
        RenderedLine, Result, Sink, Ticket, TimestampFormat, DEFAULT_SHUTDOWN_TIMEOUT,
    };
}

#[cfg(feature = "file")]
pub use sinks::FileSink;
#[cfg(feature = "notification")]
pub use sinks::NotificationSink;
pub use sinks::{ConsoleSink, ConsoleTarget, FnSink, MemorySink};
pub use core::{
    CallSite, Format, FormatConfig, FormatToken, Level, LevelFlags, LogEvent, Logger,
    LoggerBuilder, LoggerConfig, LoggerError, LoggerGroup, LoggerMetrics, Propagator,
    RenderedLine, Result, Sink, Ticket, TimestampFormat, DEFAULT_DATE_PATTERN,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
