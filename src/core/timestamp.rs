//! Timestamp formatting
//!
//! A `Timestamp` token carries a [`TimestampFormat`]. Besides the fixed
//! machine formats (ISO 8601, RFC 3339, Unix) it accepts date patterns in the
//! `yyyy-MM-dd HH:mm:ss.SSS` style and raw strftime strings.
//!
//! Formatting never fails. A pattern that cannot be interpreted renders as its
//! own text so that a bad configuration degrades the line instead of breaking
//! the log call.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Pattern used by the default format preset.
pub const DEFAULT_DATE_PATTERN: &str = "HH:mm:ss.SSS";

/// How a `Timestamp` token renders the event's clock reading
///
/// # Examples
///
/// ```
/// use echo_logger::TimestampFormat;
/// use chrono::{FixedOffset, TimeZone};
///
/// let at = FixedOffset::east_opt(0)
///     .unwrap()
///     .with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
///     .unwrap();
///
/// assert_eq!(TimestampFormat::pattern("HH:mm:ss").format(&at), "10:30:45");
/// assert_eq!(TimestampFormat::Unix.format(&at), "1736332245");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// Date pattern such as `HH:mm:ss.SSS` or `yyyy-MM-dd'T'HH:mm`
    Pattern(String),

    /// ISO 8601 in UTC with milliseconds: `2025-01-08T10:30:45.123Z`
    Iso8601,

    /// ISO 8601 in UTC with microseconds: `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// RFC 3339 keeping the captured offset: `2025-01-08T10:30:45.123+00:00`
    Rfc3339,

    /// Unix timestamp in seconds
    Unix,

    /// Unix timestamp in milliseconds
    UnixMillis,

    /// Unix timestamp in microseconds
    UnixMicros,

    /// Raw strftime format string
    Strftime(String),
}

impl Default for TimestampFormat {
    fn default() -> Self {
        TimestampFormat::Pattern(DEFAULT_DATE_PATTERN.to_string())
    }
}

impl TimestampFormat {
    pub fn pattern(pattern: impl Into<String>) -> Self {
        TimestampFormat::Pattern(pattern.into())
    }

    pub fn strftime(format: impl Into<String>) -> Self {
        TimestampFormat::Strftime(format.into())
    }

    /// Render `datetime` according to this format
    #[must_use]
    pub fn format(&self, datetime: &DateTime<FixedOffset>) -> String {
        match self {
            TimestampFormat::Pattern(pattern) => format_pattern(pattern, datetime),
            TimestampFormat::Iso8601 => datetime
                .with_timezone(&Utc)
                .format("%Y-%m-%dT%H:%M:%S%.3fZ")
                .to_string(),
            TimestampFormat::Iso8601Micros => datetime
                .with_timezone(&Utc)
                .format("%Y-%m-%dT%H:%M:%S%.6fZ")
                .to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::UnixMicros => datetime.timestamp_micros().to_string(),
            TimestampFormat::Strftime(format) => format_strftime(format, datetime),
        }
    }

    /// Whether this format renders as a plain integer
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TimestampFormat::Unix | TimestampFormat::UnixMillis | TimestampFormat::UnixMicros
        )
    }

    /// Whether this format can be rendered as written
    ///
    /// Invalid formats still render; they fall back to their raw text.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            TimestampFormat::Pattern(pattern) => parse_pattern(pattern).is_some(),
            TimestampFormat::Strftime(format) => strftime_items(format).is_some(),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternItem {
    Literal(String),
    Field(char, usize),
}

const FIELD_LETTERS: &[char] = &['y', 'M', 'd', 'H', 'h', 'm', 's', 'S', 'a', 'E', 'Z'];

/// Split a date pattern into literal runs and field letters.
///
/// Returns `None` for an unknown field letter or an unterminated quote.
fn parse_pattern(pattern: &str) -> Option<Vec<PatternItem>> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut items = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                literal.push('\'');
                i += 2;
                continue;
            }

            // quoted literal, '' inside is an escaped quote
            i += 1;
            loop {
                match chars.get(i) {
                    None => return None,
                    Some(&'\'') if chars.get(i + 1) == Some(&'\'') => {
                        literal.push('\'');
                        i += 2;
                    }
                    Some(&'\'') => {
                        i += 1;
                        break;
                    }
                    Some(&other) => {
                        literal.push(other);
                        i += 1;
                    }
                }
            }
            continue;
        }

        if c.is_ascii_alphabetic() {
            if !FIELD_LETTERS.contains(&c) {
                return None;
            }
            let run = chars[i..].iter().take_while(|&&next| next == c).count();
            if !literal.is_empty() {
                items.push(PatternItem::Literal(std::mem::take(&mut literal)));
            }
            items.push(PatternItem::Field(c, run));
            i += run;
            continue;
        }

        literal.push(c);
        i += 1;
    }

    if !literal.is_empty() {
        items.push(PatternItem::Literal(literal));
    }
    Some(items)
}

fn pad(value: i64, width: usize) -> String {
    if value < 0 {
        format!("-{:0width$}", -value, width = width)
    } else {
        format!("{:0width$}", value, width = width)
    }
}

fn format_field(letter: char, count: usize, datetime: &DateTime<FixedOffset>) -> String {
    match letter {
        'y' if count == 2 => pad(i64::from(datetime.year()).rem_euclid(100), 2),
        'y' => pad(i64::from(datetime.year()), count),
        'M' if count >= 4 => datetime.format("%B").to_string(),
        'M' if count == 3 => datetime.format("%b").to_string(),
        'M' => pad(i64::from(datetime.month()), count),
        'd' => pad(i64::from(datetime.day()), count),
        'H' => pad(i64::from(datetime.hour()), count),
        'h' => pad(i64::from(datetime.hour12().1), count),
        'm' => pad(i64::from(datetime.minute()), count),
        's' => pad(i64::from(datetime.second()), count),
        'S' => {
            // leap seconds report nanos above 1e9
            let nanos = format!("{:09}", datetime.nanosecond() % 1_000_000_000);
            if count <= 9 {
                nanos[..count].to_string()
            } else {
                format!("{:0<width$}", nanos, width = count)
            }
        }
        'a' => {
            if datetime.hour12().0 {
                "PM".to_string()
            } else {
                "AM".to_string()
            }
        }
        'E' if count >= 4 => datetime.format("%A").to_string(),
        'E' => datetime.format("%a").to_string(),
        'Z' if count >= 4 => datetime.format("%:z").to_string(),
        'Z' => datetime.format("%z").to_string(),
        _ => String::new(),
    }
}

fn format_pattern(pattern: &str, datetime: &DateTime<FixedOffset>) -> String {
    let Some(items) = parse_pattern(pattern) else {
        return pattern.to_string();
    };

    let mut output = String::with_capacity(pattern.len() + 8);
    for item in &items {
        match item {
            PatternItem::Literal(text) => output.push_str(text),
            PatternItem::Field(letter, count) => {
                output.push_str(&format_field(*letter, *count, datetime))
            }
        }
    }
    output
}

fn strftime_items(format: &str) -> Option<Vec<Item<'_>>> {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        None
    } else {
        Some(items)
    }
}

fn format_strftime(format: &str, datetime: &DateTime<FixedOffset>) -> String {
    match strftime_items(format) {
        Some(items) => datetime.format_with_items(items.iter()).to_string(),
        None => format.to_string(),
    }
}
