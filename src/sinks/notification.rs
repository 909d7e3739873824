//! Desktop notification sink
//!
//! Each line becomes one notification banner, raised by running the
//! platform's notifier program: `notify-send` on Linux and the BSDs,
//! `osascript` on macOS. Any other program can be configured with
//! [`NotificationSink::with_command`].

use crate::core::{Level, LoggerError, RenderedLine, Result, Sink};
use std::process::{Command, Stdio};

/// Raises a desktop notification per line
pub struct NotificationSink {
    title: String,
    program: String,
    args: Vec<String>,
}

impl NotificationSink {
    /// Notifications titled `title`, through the platform notifier
    pub fn new(title: impl Into<String>) -> Self {
        let (program, args) = platform_command();
        Self {
            title: title.into(),
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Use a custom notifier program
    ///
    /// In `args`, `{title}`, `{body}` and `{urgency}` are replaced per line.
    /// `{urgency}` is `low`, `normal` or `critical`.
    ///
    /// ```
    /// use echo_logger::NotificationSink;
    ///
    /// let sink = NotificationSink::new("app")
    ///     .with_command("dunstify", ["-u", "{urgency}", "--", "{title}", "{body}"]);
    /// assert_eq!(sink.program(), "dunstify");
    /// ```
    #[must_use]
    pub fn with_command<I, S>(mut self, program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.program = program.into();
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments for one line, placeholders filled in
    fn arguments(&self, line: &RenderedLine) -> Vec<String> {
        let body = if self.program == "osascript" {
            apple_script_quote(&line.text)
        } else {
            line.text.clone()
        };
        let title = if self.program == "osascript" {
            apple_script_quote(&self.title)
        } else {
            self.title.clone()
        };

        self.args
            .iter()
            .map(|arg| {
                arg.replace("{urgency}", urgency(line.level))
                    .replace("{title}", &title)
                    .replace("{body}", &body)
            })
            .collect()
    }
}

impl Sink for NotificationSink {
    fn accept(&mut self, line: &RenderedLine) -> Result<()> {
        let status = Command::new(&self.program)
            .args(self.arguments(line))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| {
                LoggerError::io_operation(
                    "raising notification",
                    format!("Failed to run {}", self.program),
                    e,
                )
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(LoggerError::sink(
                "notification",
                format!("{} exited with {}", self.program, status),
            ))
        }
    }

    fn name(&self) -> &str {
        "notification"
    }
}

fn urgency(level: Level) -> &'static str {
    match level {
        Level::Trace | Level::Debug => "low",
        Level::Info | Level::Warn => "normal",
        Level::Error | Level::Fatal | Level::Off => "critical",
    }
}

/// Escape text for a double-quoted AppleScript string
fn apple_script_quote(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(target_os = "macos")]
fn platform_command() -> (&'static str, &'static [&'static str]) {
    (
        "osascript",
        &["-e", "display notification \"{body}\" with title \"{title}\""],
    )
}

#[cfg(not(target_os = "macos"))]
fn platform_command() -> (&'static str, &'static [&'static str]) {
    // "--" keeps a title or body starting with '-' from being read as an option
    ("notify-send", &["-u", "{urgency}", "--", "{title}", "{body}"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        let sink = NotificationSink::new("api").with_command("notify", ["{urgency}|{title}|{body}"]);
        let args = sink.arguments(&RenderedLine::new(Level::Fatal, "db down"));
        assert_eq!(args, vec!["critical|api|db down"]);
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn test_dashed_text_is_not_an_option() {
        let sink = NotificationSink::new("--help");
        let args = sink.arguments(&RenderedLine::new(Level::Warn, "-v flag ignored"));
        assert_eq!(args, vec!["-u", "normal", "--", "--help", "-v flag ignored"]);
    }

    #[test]
    fn test_apple_script_escaping() {
        let sink = NotificationSink::new("say \"hi\"").with_command(
            "osascript",
            ["-e", "display notification \"{body}\" with title \"{title}\""],
        );
        let args = sink.arguments(&RenderedLine::new(Level::Info, r#"path C:\tmp "x""#));
        assert_eq!(
            args[1],
            r#"display notification "path C:\\tmp \"x\"" with title "say \"hi\"""#
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_is_reported() {
        let mut ok = NotificationSink::new("t").with_command("true", Vec::<String>::new());
        assert!(ok.accept(&RenderedLine::new(Level::Info, "x")).is_ok());

        let mut failing = NotificationSink::new("t").with_command("false", Vec::<String>::new());
        let err = failing.accept(&RenderedLine::new(Level::Info, "x")).unwrap_err();
        assert!(matches!(err, LoggerError::SinkError { .. }));
    }

    #[test]
    fn test_missing_program() {
        let mut sink = NotificationSink::new("t")
            .with_command("echo-logger-no-such-notifier", Vec::<String>::new());
        let err = sink.accept(&RenderedLine::new(Level::Info, "x")).unwrap_err();
        assert!(matches!(err, LoggerError::IoOperation { .. }));
    }
}
