//! Line formats
//!
//! A [`Format`] is an ordered token list. Rendering walks the list once and
//! concatenates each token's text. Tokens never see each other's output, so
//! moving a token only changes the line where it moved.
//!
//! The bracketed template syntax (`"[flag] [datetime] [message]"`) is kept as
//! a convenience and desugars into tokens through [`Format::from_template`].

use super::event::LogEvent;
use super::token::{FormatToken, LevelFlags};
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};

/// Template placeholders and the token each one desugars to
const TEMPLATE_PLACEHOLDERS: &[(&str, Placeholder)] = &[
    ("[datetime]", Placeholder::DateTime),
    ("[flag]", Placeholder::Flag),
    ("[filename]", Placeholder::Filename),
    ("[function]", Placeholder::Function),
    ("[line]", Placeholder::Line),
    ("[message]", Placeholder::Message),
    ("[name]", Placeholder::Name),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder {
    DateTime,
    Flag,
    Filename,
    Function,
    Line,
    Message,
    Name,
}

/// An ordered sequence of format tokens
///
/// # Examples
///
/// ```
/// use echo_logger::{CallSite, Format, FormatToken, Level, LevelFlags, LogEvent};
///
/// let format = Format::new(vec![
///     FormatToken::flag(LevelFlags::new().with(Level::Warn, "W")),
///     FormatToken::literal(" "),
///     FormatToken::Message,
/// ]);
///
/// let event = LogEvent::capture(
///     Level::Warn,
///     CallSite::new("src/main.rs", "app::main", 3),
///     "app",
///     "disk low".to_string(),
/// );
/// assert_eq!(format.render(&event), "W disk low");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Format {
    tokens: Vec<FormatToken>,
}

impl Format {
    pub fn new(tokens: Vec<FormatToken>) -> Self {
        Self { tokens }
    }

    /// A format with no tokens; renders every event as `""`
    pub fn empty() -> Self {
        Self { tokens: Vec::new() }
    }

    /// Append a token
    #[must_use]
    pub fn then(mut self, token: impl Into<FormatToken>) -> Self {
        self.tokens.push(token.into());
        self
    }

    pub fn tokens(&self) -> &[FormatToken] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Swap the flag table of every severity flag token
    pub fn set_flags(&mut self, flags: &LevelFlags) {
        for token in &mut self.tokens {
            if let FormatToken::SeverityFlag(current) = token {
                *current = flags.clone();
            }
        }
    }

    /// Swap the clock format of every timestamp token
    pub fn set_timestamp_format(&mut self, timestamp: &TimestampFormat) {
        for token in &mut self.tokens {
            if let FormatToken::Timestamp(current) = token {
                *current = timestamp.clone();
            }
        }
    }

    /// Render `event` into one line
    #[must_use]
    pub fn render(&self, event: &LogEvent<'_>) -> String {
        let mut line = String::with_capacity(event.message.len() + 32);
        for token in &self.tokens {
            render_token(token, event, &mut line);
        }
        line
    }

    /// `flag [time] [file:line]<TAB>message` with emoji flags
    pub fn standard() -> Self {
        Self::standard_with(TimestampFormat::default(), LevelFlags::emoji())
    }

    /// The standard layout with a custom clock format and flag table
    pub fn standard_with(timestamp: TimestampFormat, flags: LevelFlags) -> Self {
        Self::new(vec![
            FormatToken::SeverityFlag(flags),
            FormatToken::literal(" ["),
            FormatToken::Timestamp(timestamp),
            FormatToken::literal("] ["),
            FormatToken::SourceFile,
            FormatToken::literal(":"),
            FormatToken::SourceLine,
            FormatToken::literal("]\t"),
            FormatToken::Message,
        ])
    }

    /// `LEVEL yyyy-MM-dd HH:mm:ss.SSS name file:line function - message`
    pub fn detailed() -> Self {
        Self::new(vec![
            FormatToken::SeverityFlag(LevelFlags::words()),
            FormatToken::literal(" "),
            FormatToken::timestamp("yyyy-MM-dd HH:mm:ss.SSS"),
            FormatToken::literal(" "),
            FormatToken::EmitterName,
            FormatToken::literal(" "),
            FormatToken::SourceFile,
            FormatToken::literal(":"),
            FormatToken::SourceLine,
            FormatToken::literal(" "),
            FormatToken::SourceFunction,
            FormatToken::literal(" - "),
            FormatToken::Message,
        ])
    }

    pub fn message_only() -> Self {
        Self::new(vec![FormatToken::Message])
    }

    /// Desugar a bracketed template into tokens
    ///
    /// Recognised placeholders are `[datetime]`, `[flag]`, `[filename]`,
    /// `[function]`, `[line]`, `[message]` and `[name]`. Everything else,
    /// including unknown bracketed words, stays literal text.
    ///
    /// ```
    /// use echo_logger::{Format, FormatToken, LevelFlags, TimestampFormat};
    ///
    /// let format = Format::from_template(
    ///     "[[filename]:[line]] [message]",
    ///     TimestampFormat::default(),
    ///     LevelFlags::words(),
    /// );
    /// assert_eq!(
    ///     format.tokens(),
    ///     &[
    ///         FormatToken::literal("["),
    ///         FormatToken::SourceFile,
    ///         FormatToken::literal(":"),
    ///         FormatToken::SourceLine,
    ///         FormatToken::literal("] "),
    ///         FormatToken::Message,
    ///     ]
    /// );
    /// ```
    pub fn from_template(template: &str, timestamp: TimestampFormat, flags: LevelFlags) -> Self {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(c) = rest.chars().next() {
            let matched = if c == '[' {
                TEMPLATE_PLACEHOLDERS
                    .iter()
                    .find(|(name, _)| rest.starts_with(name))
            } else {
                None
            };

            match matched {
                Some((name, placeholder)) => {
                    if !literal.is_empty() {
                        tokens.push(FormatToken::Literal(std::mem::take(&mut literal)));
                    }
                    tokens.push(match placeholder {
                        Placeholder::DateTime => FormatToken::Timestamp(timestamp.clone()),
                        Placeholder::Flag => FormatToken::SeverityFlag(flags.clone()),
                        Placeholder::Filename => FormatToken::SourceFile,
                        Placeholder::Function => FormatToken::SourceFunction,
                        Placeholder::Line => FormatToken::SourceLine,
                        Placeholder::Message => FormatToken::Message,
                        Placeholder::Name => FormatToken::EmitterName,
                    });
                    rest = &rest[name.len()..];
                }
                None => {
                    literal.push(c);
                    rest = &rest[c.len_utf8()..];
                }
            }
        }

        if !literal.is_empty() {
            tokens.push(FormatToken::Literal(literal));
        }

        Self { tokens }
    }
}

impl Default for Format {
    fn default() -> Self {
        Self::standard()
    }
}

impl From<Vec<FormatToken>> for Format {
    fn from(tokens: Vec<FormatToken>) -> Self {
        Self::new(tokens)
    }
}

impl FromIterator<FormatToken> for Format {
    fn from_iter<I: IntoIterator<Item = FormatToken>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn render_token(token: &FormatToken, event: &LogEvent<'_>, line: &mut String) {
    match token {
        FormatToken::Literal(text) => line.push_str(text),
        FormatToken::Timestamp(format) => line.push_str(&format.format(&event.timestamp)),
        FormatToken::SeverityFlag(flags) => line.push_str(flags.get(event.level)),
        FormatToken::SourceFile => line.push_str(event.call_site.file_name()),
        FormatToken::SourceFunction => line.push_str(&event.call_site.function),
        FormatToken::SourceLine => line.push_str(&event.call_site.line.to_string()),
        FormatToken::Message => line.push_str(&event.message),
        FormatToken::EmitterName => line.push_str(event.emitter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::CallSite;
    use crate::core::level::Level;
    use chrono::{FixedOffset, TimeZone};

    fn event(level: Level, message: &str) -> LogEvent<'static> {
        let at = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .unwrap()
            + chrono::Duration::milliseconds(7);
        LogEvent::at(
            at,
            level,
            CallSite::new("src/storage/disk.rs", "app::storage::check", 42),
            "storage",
            message.to_string(),
        )
    }

    #[test]
    fn test_empty_format_renders_empty() {
        assert_eq!(Format::empty().render(&event(Level::Info, "x")), "");
    }

    #[test]
    fn test_every_token_kind() {
        let format = Format::empty()
            .then(FormatToken::flag(LevelFlags::words()))
            .then("|")
            .then(FormatToken::timestamp("HH:mm:ss.SSS"))
            .then("|")
            .then(FormatToken::SourceFile)
            .then("|")
            .then(FormatToken::SourceFunction)
            .then("|")
            .then(FormatToken::SourceLine)
            .then("|")
            .then(FormatToken::EmitterName)
            .then("|")
            .then(FormatToken::Message);

        assert_eq!(
            format.render(&event(Level::Error, "boom")),
            "ERROR|10:30:45.007|disk.rs|app::storage::check|42|storage|boom"
        );
    }

    #[test]
    fn test_unmapped_flag_renders_nothing() {
        let format = Format::new(vec![
            FormatToken::flag(LevelFlags::new().with(Level::Fatal, "💀")),
            FormatToken::literal(" "),
            FormatToken::Message,
        ]);
        assert_eq!(format.render(&event(Level::Fatal, "m")), "💀 m");
        assert_eq!(format.render(&event(Level::Trace, "m")), " m");
    }

    #[test]
    fn test_timestamps_share_one_reading() {
        let format = Format::new(vec![
            FormatToken::timestamp("HH:mm:ss"),
            FormatToken::literal(" "),
            FormatToken::Timestamp(TimestampFormat::Iso8601),
            FormatToken::literal(" "),
            FormatToken::Timestamp(TimestampFormat::UnixMillis),
        ]);
        assert_eq!(
            format.render(&event(Level::Info, "")),
            "10:30:45 2025-01-08T10:30:45.007Z 1736332245007"
        );
    }

    #[test]
    fn test_standard_preset() {
        let format = Format::standard_with(TimestampFormat::pattern("HH:mm"), LevelFlags::words());
        assert_eq!(
            format.render(&event(Level::Warn, "low space")),
            "WARN [10:30] [disk.rs:42]\tlow space"
        );
    }

    #[test]
    fn test_detailed_preset() {
        assert_eq!(
            Format::detailed().render(&event(Level::Info, "ok")),
            "INFO 2025-01-08 10:30:45.007 storage disk.rs:42 app::storage::check - ok"
        );
    }

    #[test]
    fn test_template_matches_standard_preset() {
        let template = "[flag] [[datetime]] [[filename]:[line]]\t[message]";
        let parsed = Format::from_template(template, TimestampFormat::default(), LevelFlags::emoji());
        assert_eq!(parsed, Format::standard());
    }

    #[test]
    fn test_template_keeps_unknown_placeholders() {
        let format = Format::from_template(
            "[level] [name]: [message] [",
            TimestampFormat::default(),
            LevelFlags::new(),
        );
        assert_eq!(
            format.tokens(),
            &[
                FormatToken::literal("[level] "),
                FormatToken::EmitterName,
                FormatToken::literal(": "),
                FormatToken::Message,
                FormatToken::literal(" ["),
            ]
        );
    }

    #[test]
    fn test_template_with_multibyte_text() {
        let format = Format::from_template(
            "→ [message] ←",
            TimestampFormat::default(),
            LevelFlags::new(),
        );
        assert_eq!(format.render(&event(Level::Info, "ok")), "→ ok ←");
    }

    #[test]
    fn test_set_flags_and_timestamp_format() {
        let mut format = Format::standard();
        format.set_flags(&LevelFlags::bracketed());
        format.set_timestamp_format(&TimestampFormat::pattern("HH"));
        assert_eq!(
            format.render(&event(Level::Debug, "m")),
            "[debug] [10] [disk.rs:42]\tm"
        );
    }

    #[test]
    fn test_format_json_is_token_list() {
        let format = Format::new(vec![FormatToken::literal(">"), FormatToken::Message]);
        let json = serde_json::to_string(&format).unwrap();
        assert_eq!(json, r#"[{"Literal":">"},"Message"]"#);
    }
}
