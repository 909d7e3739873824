//! Format tokens
//!
//! A line format is an ordered list of [`FormatToken`]s. Each token renders
//! one piece of the line on its own; the line is the concatenation of the
//! pieces in list order.

use super::level::Level;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Display strings for severity levels
///
/// Levels without an entry render as the empty string.
///
/// # Examples
///
/// ```
/// use echo_logger::{Level, LevelFlags};
///
/// let flags = LevelFlags::new().with(Level::Warn, "W");
/// assert_eq!(flags.get(Level::Warn), "W");
/// assert_eq!(flags.get(Level::Info), "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelFlags(BTreeMap<Level, String>);

impl LevelFlags {
    /// An empty mapping; every level renders as `""`
    pub fn new() -> Self {
        Self::default()
    }

    /// Same as [`LevelFlags::new`]; hides the flag column
    pub fn empty() -> Self {
        Self::default()
    }

    /// Icons for every level, the default flag set
    pub fn emoji() -> Self {
        Self::from_pairs([
            (Level::Trace, "💊"),
            (Level::Debug, "☕️"),
            (Level::Info, "💡"),
            (Level::Warn, "⚠️"),
            (Level::Error, "❌"),
            (Level::Fatal, "💣"),
        ])
    }

    /// Upper-case level names: `TRACE`, `DEBUG`, ...
    pub fn words() -> Self {
        Self(Level::ALL.iter().map(|l| (*l, l.to_str().to_string())).collect())
    }

    /// Lower-case bracketed names: `[trace]`, `[debug]`, ...
    pub fn bracketed() -> Self {
        Self(
            Level::ALL
                .iter()
                .map(|l| (*l, format!("[{}]", l.to_str().to_lowercase())))
                .collect(),
        )
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Level, S)>,
        S: Into<String>,
    {
        Self(pairs.into_iter().map(|(l, s)| (l, s.into())).collect())
    }

    #[must_use]
    pub fn with(mut self, level: Level, flag: impl Into<String>) -> Self {
        self.0.insert(level, flag.into());
        self
    }

    pub fn insert(&mut self, level: Level, flag: impl Into<String>) {
        self.0.insert(level, flag.into());
    }

    /// Flag for `level`, or `""` when unmapped
    pub fn get(&self, level: Level) -> &str {
        self.0.get(&level).map(String::as_str).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One renderable piece of a log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatToken {
    /// Text emitted verbatim
    Literal(String),
    /// The event's capture time
    Timestamp(TimestampFormat),
    /// The event level looked up in a flag table
    SeverityFlag(LevelFlags),
    /// Base name of the call-site file
    SourceFile,
    /// Call-site function path
    SourceFunction,
    /// 1-based call-site line
    SourceLine,
    /// The logged value
    Message,
    /// Name of the logger that produced the event
    EmitterName,
}

impl FormatToken {
    pub fn literal(text: impl Into<String>) -> Self {
        FormatToken::Literal(text.into())
    }

    /// Timestamp token with a date pattern such as `HH:mm:ss`
    pub fn timestamp(pattern: impl Into<String>) -> Self {
        FormatToken::Timestamp(TimestampFormat::pattern(pattern))
    }

    pub fn flag(flags: LevelFlags) -> Self {
        FormatToken::SeverityFlag(flags)
    }
}

impl From<&str> for FormatToken {
    fn from(text: &str) -> Self {
        FormatToken::Literal(text.to_string())
    }
}

impl From<TimestampFormat> for FormatToken {
    fn from(format: TimestampFormat) -> Self {
        FormatToken::Timestamp(format)
    }
}

impl From<LevelFlags> for FormatToken {
    fn from(flags: LevelFlags) -> Self {
        FormatToken::SeverityFlag(flags)
    }
}
