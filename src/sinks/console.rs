//! Console sink implementation

use crate::core::{Level, RenderedLine, Result, Sink};
#[cfg(feature = "console")]
use colored::Colorize;
use std::io::Write;

/// Which stream a [`ConsoleSink`] writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleTarget {
    /// `Error` and `Fatal` to stderr, everything else to stdout
    #[default]
    Auto,
    Stdout,
    Stderr,
}

impl ConsoleTarget {
    fn uses_stderr(self, level: Level) -> bool {
        match self {
            ConsoleTarget::Auto => matches!(level, Level::Error | Level::Fatal),
            ConsoleTarget::Stdout => false,
            ConsoleTarget::Stderr => true,
        }
    }
}

/// Prints each line to the terminal
pub struct ConsoleSink {
    #[cfg_attr(not(feature = "console"), allow(dead_code))]
    use_colors: bool,
    target: ConsoleTarget,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            use_colors: false,
            target: ConsoleTarget::Auto,
        }
    }

    /// Tint whole lines with the level colour
    ///
    /// Has no effect unless the `console` feature is enabled.
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: ConsoleTarget) -> Self {
        self.target = target;
        self
    }

    fn decorate(&self, line: &RenderedLine) -> String {
        #[cfg(feature = "console")]
        if self.use_colors {
            return line.text.as_str().color(line.level.color_code()).to_string();
        }
        line.text.clone()
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn accept(&mut self, line: &RenderedLine) -> Result<()> {
        let output = self.decorate(line);

        if self.target.uses_stderr(line.level) {
            writeln!(std::io::stderr().lock(), "{}", output)?;
        } else {
            writeln!(std::io::stdout().lock(), "{}", output)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        // Flush both stdout and stderr since we write to both
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
