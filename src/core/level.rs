//! Severity levels

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log event, ordered by declaration.
///
/// `Off` ranks above every logging level. It only makes sense as a
/// threshold: a logger whose threshold is `Off` emits nothing, and an event
/// tagged `Off` is never emitted.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Level {
    #[default]
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
    Off = 6,
}

impl Level {
    /// Every level that can be attached to an event, lowest first.
    pub const ALL: [Level; 6] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
            Level::Off => "OFF",
        }
    }

    /// Whether an event at `self` passes a logger whose threshold is `threshold`.
    #[inline]
    pub fn passes(self, threshold: Level) -> bool {
        self != Level::Off && self >= threshold
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            Level::Trace => BrightBlack,
            Level::Debug => Blue,
            Level::Info => Green,
            Level::Warn => Yellow,
            Level::Error => Red,
            Level::Fatal | Level::Off => BrightRed,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TRACE" => Ok(Level::Trace),
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARN" | "WARNING" => Ok(Level::Warn),
            "ERROR" => Ok(Level::Error),
            "FATAL" => Ok(Level::Fatal),
            "OFF" => Ok(Level::Off),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_order() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Fatal);
        assert!(Level::Fatal < Level::Off);
    }

    #[test]
    fn test_passes() {
        assert!(Level::Warn.passes(Level::Info));
        assert!(Level::Info.passes(Level::Info));
        assert!(!Level::Debug.passes(Level::Info));
        assert!(!Level::Fatal.passes(Level::Off));
        assert!(!Level::Off.passes(Level::Trace));
    }

    #[test]
    fn test_parse() {
        assert_eq!("warning".parse::<Level>(), Ok(Level::Warn));
        assert_eq!(" Off ".parse::<Level>(), Ok(Level::Off));
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&Level::Fatal).unwrap();
        assert_eq!(json, "\"Fatal\"");
        let level: Level = serde_json::from_str("\"Debug\"").unwrap();
        assert_eq!(level, Level::Debug);
    }
}
