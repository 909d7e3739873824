//! Call-site capture and per-call events

use super::level::Level;
use chrono::{DateTime, FixedOffset, Local};
use std::borrow::Cow;
use std::panic::Location;

/// Where a log call was made
///
/// Built by [`call_site!`](crate::call_site) at the call boundary, or by
/// [`CallSite::caller`] from `#[track_caller]` entry points. The logger never
/// inspects the stack itself. Names can also come from runtime data, for
/// instance when forwarding records from another logging system.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallSite {
    pub file: Cow<'static, str>,
    pub function: Cow<'static, str>,
    pub line: u32,
}

impl CallSite {
    pub const fn new(file: &'static str, function: &'static str, line: u32) -> Self {
        Self {
            file: Cow::Borrowed(file),
            function: Cow::Borrowed(function),
            line,
        }
    }

    /// Call site built from names known only at runtime
    pub fn owned(
        file: impl Into<Cow<'static, str>>,
        function: impl Into<Cow<'static, str>>,
        line: u32,
    ) -> Self {
        Self {
            file: file.into(),
            function: function.into(),
            line,
        }
    }

    /// File and line of the caller; the function is left empty.
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), "", location.line())
    }

    /// File name without its directories
    pub fn file_name(&self) -> &str {
        self.file
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or(self.file.as_ref())
    }
}

/// One accepted log call, ready to be rendered
///
/// Only built after the level gate has passed, so the message is already
/// evaluated. The clock is read once in [`LogEvent::capture`]; every timestamp
/// token rendered from the same event shows the same instant.
#[derive(Debug, Clone)]
pub struct LogEvent<'a> {
    pub level: Level,
    pub timestamp: DateTime<FixedOffset>,
    pub call_site: CallSite,
    pub emitter: &'a str,
    pub message: String,
}

impl<'a> LogEvent<'a> {
    /// Capture an event at the current local time
    pub fn capture(level: Level, call_site: CallSite, emitter: &'a str, message: String) -> Self {
        Self::at(Local::now().fixed_offset(), level, call_site, emitter, message)
    }

    /// Build an event with an explicit clock reading
    pub fn at(
        timestamp: DateTime<FixedOffset>,
        level: Level,
        call_site: CallSite,
        emitter: &'a str,
        message: String,
    ) -> Self {
        Self {
            level,
            timestamp,
            call_site,
            emitter,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_strips_directories() {
        let unix = CallSite::new("src/net/server.rs", "app::net::serve", 10);
        assert_eq!(unix.file_name(), "server.rs");

        let windows = CallSite::new(r"src\net\server.rs", "app::net::serve", 10);
        assert_eq!(windows.file_name(), "server.rs");

        let bare = CallSite::new("main.rs", "app::main", 1);
        assert_eq!(bare.file_name(), "main.rs");
    }

    #[test]
    fn test_caller_captures_line() {
        let expected = line!() + 1;
        let site = CallSite::caller();
        assert_eq!(site.line, expected);
        assert_eq!(site.file_name(), "event.rs");
        assert_eq!(site.function, "");
    }

    #[test]
    fn test_owned_call_site() {
        let file = format!("{}/{}.py", "plugins", "loader");
        let site = CallSite::owned(file, String::from("loader.load"), 88);

        assert_eq!(site.file_name(), "loader.py");
        assert_eq!(site.function, "loader.load");
        assert_eq!(site, CallSite::new("plugins/loader.py", "loader.load", 88));
    }

    #[test]
    fn test_capture_reads_clock_once() {
        let event = LogEvent::capture(
            Level::Info,
            CallSite::new("a.rs", "f", 1),
            "test",
            "hello".to_string(),
        );
        let copy = event.clone();
        assert_eq!(event.timestamp, copy.timestamp);
        assert_eq!(event.message, "hello");
    }
}
