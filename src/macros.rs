//! Logging macros for ergonomic log message formatting.
//!
//! These macros take `format!`-style arguments and capture the full call
//! site, including the enclosing function path. Formatting is deferred: the
//! arguments are only formatted if the logger accepts the level.
//!
//! # Examples
//!
//! ```
//! use echo_logger::prelude::*;
//! use echo_logger::info;
//!
//! let logger = Logger::new("server", MemorySink::new());
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Capture the current file, function and line as a [`CallSite`](crate::CallSite).
///
/// # Examples
///
/// ```
/// use echo_logger::call_site;
///
/// fn connect() -> echo_logger::CallSite {
///     call_site!()
/// }
///
/// let site = connect();
/// assert!(site.function.ends_with("connect"));
/// assert!(site.line > 0);
/// ```
#[macro_export]
macro_rules! call_site {
    () => {{
        fn __echo_here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = __type_name_of(__echo_here);
        $crate::CallSite::new(
            ::std::file!(),
            name.strip_suffix("::__echo_here").unwrap_or(name),
            ::std::line!(),
        )
    }};
}

/// Log a message with automatic formatting.
///
/// Evaluates to `Option<String>`: the rendered line, or `None` if the level
/// was gated out.
///
/// # Examples
///
/// ```
/// # use echo_logger::prelude::*;
/// # let logger = Logger::new("app", MemorySink::new());
/// use echo_logger::log;
/// log!(logger, Level::Info, "Simple message");
/// log!(logger, Level::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_at($level, $crate::call_site!(), || ::std::format!($($arg)+))
    };
}

/// Log a trace-level message.
///
/// # Examples
///
/// ```
/// # use echo_logger::prelude::*;
/// # let logger = Logger::new("app", MemorySink::new());
/// use echo_logger::trace;
/// trace!(logger, "Entering function: calculate()");
/// trace!(logger, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use echo_logger::prelude::*;
/// # let logger = Logger::new("app", MemorySink::new());
/// use echo_logger::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use echo_logger::prelude::*;
/// # let logger = Logger::new("app", MemorySink::new());
/// use echo_logger::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Error, $($arg)+)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Fatal, $($arg)+)
    };
}
