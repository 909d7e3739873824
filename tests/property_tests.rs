//! Property-based tests for echo_logger using proptest

use chrono::{FixedOffset, TimeZone};
use echo_logger::prelude::*;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

fn any_level() -> impl Strategy<Value = Level> {
    prop_oneof![
        Just(Level::Trace),
        Just(Level::Debug),
        Just(Level::Info),
        Just(Level::Warn),
        Just(Level::Error),
        Just(Level::Fatal),
    ]
}

fn any_threshold() -> impl Strategy<Value = Level> {
    prop_oneof![any_level(), Just(Level::Off)]
}

fn any_token() -> impl Strategy<Value = FormatToken> {
    prop_oneof![
        "[a-z :|\\[\\]-]{0,8}".prop_map(FormatToken::Literal),
        Just(FormatToken::timestamp("yyyy-MM-dd HH:mm:ss.SSS")),
        Just(FormatToken::Timestamp(TimestampFormat::Rfc3339)),
        Just(FormatToken::flag(LevelFlags::emoji())),
        Just(FormatToken::SourceFile),
        Just(FormatToken::SourceFunction),
        Just(FormatToken::SourceLine),
        Just(FormatToken::Message),
        Just(FormatToken::EmitterName),
    ]
}

fn fixed_event(level: Level, message: String) -> LogEvent<'static> {
    let at = FixedOffset::east_opt(3600)
        .unwrap()
        .with_ymd_and_hms(2014, 12, 3, 15, 4, 5)
        .unwrap();
    LogEvent::at(
        at,
        level,
        CallSite::new("src/app/main.rs", "app::main", 12),
        "prop",
        message,
    )
}

// ============================================================================
// Level Tests
// ============================================================================

proptest! {
    /// Level string conversions roundtrip
    #[test]
    fn test_level_str_roundtrip(level in any_threshold()) {
        let parsed: Level = level.to_str().parse().unwrap();
        prop_assert_eq!(level, parsed);
    }

    /// Ordering follows declaration rank
    #[test]
    fn test_level_ordering(a in any_threshold(), b in any_threshold()) {
        prop_assert_eq!(a <= b, (a as u8) <= (b as u8));
        prop_assert!(a < Level::Off || a == Level::Off);
    }
}

// ============================================================================
// Gate Tests
// ============================================================================

proptest! {
    /// The message closure runs exactly once when the level passes, never otherwise
    #[test]
    fn test_thunk_runs_iff_gate_passes(level in any_level(), threshold in any_threshold()) {
        let memory = MemorySink::new();
        let logger = Logger::builder()
            .level(threshold)
            .format(Format::message_only())
            .sink(memory.clone())
            .build();
        let calls = AtomicUsize::new(0);

        let result = logger.log(level, || {
            calls.fetch_add(1, Ordering::SeqCst);
            "m"
        });

        let passes = threshold != Level::Off && level >= threshold;
        prop_assert_eq!(calls.load(Ordering::SeqCst), usize::from(passes));
        prop_assert_eq!(result.is_some(), passes);
        prop_assert_eq!(memory.len(), usize::from(passes));
    }

    /// An Off threshold delivers nothing, whatever is logged
    #[test]
    fn test_off_delivers_nothing(levels in prop::collection::vec(any_level(), 0..32)) {
        let memory = MemorySink::new();
        let logger = Logger::builder()
            .level(Level::Off)
            .sink(memory.clone())
            .build();

        for level in levels {
            logger.log(level, || "x");
        }
        prop_assert!(memory.is_empty());
    }
}

// ============================================================================
// Rendering Tests
// ============================================================================

proptest! {
    /// Rendering is a pure function of format and event
    #[test]
    fn test_render_is_deterministic(
        tokens in prop::collection::vec(any_token(), 0..12),
        level in any_level(),
        message in "\\PC{0,40}",
    ) {
        let format = Format::new(tokens);
        let event = fixed_event(level, message);
        prop_assert_eq!(format.render(&event), format.render(&event));
    }

    /// Rendering a list equals concatenating each token rendered alone
    #[test]
    fn test_render_concatenates_tokens(
        tokens in prop::collection::vec(any_token(), 0..12),
        level in any_level(),
        message in "\\PC{0,40}",
    ) {
        let event = fixed_event(level, message);
        let whole = Format::new(tokens.clone()).render(&event);
        let pieces: String = tokens
            .into_iter()
            .map(|t| Format::new(vec![t]).render(&event))
            .collect();
        prop_assert_eq!(whole, pieces);
    }

    /// Swapping two adjacent literals only swaps their text in the output
    #[test]
    fn test_literal_reordering_is_local(
        prefix in prop::collection::vec(any_token(), 0..4),
        a in "[a-z]{1,5}",
        b in "[0-9]{1,5}",
        suffix in prop::collection::vec(any_token(), 0..4),
    ) {
        let event = fixed_event(Level::Info, "msg".to_string());
        let render = |middle: Vec<FormatToken>| {
            let tokens: Vec<FormatToken> = prefix
                .iter()
                .cloned()
                .chain(middle)
                .chain(suffix.iter().cloned())
                .collect();
            Format::new(tokens).render(&event)
        };

        let head = Format::new(prefix.clone()).render(&event);
        let tail = Format::new(suffix.clone()).render(&event);

        let ab = render(vec![FormatToken::literal(a.clone()), FormatToken::literal(b.clone())]);
        let ba = render(vec![FormatToken::literal(b.clone()), FormatToken::literal(a.clone())]);

        prop_assert_eq!(ab, format!("{}{}{}{}", head, a, b, tail));
        prop_assert_eq!(ba, format!("{}{}{}{}", head, b, a, tail));
    }

    /// Unmapped levels render an empty flag
    #[test]
    fn test_unmapped_flag_is_empty(mapped in any_level(), logged in any_level()) {
        let format = Format::new(vec![
            FormatToken::flag(LevelFlags::new().with(mapped, "F")),
            FormatToken::Message,
        ]);
        let line = format.render(&fixed_event(logged, "m".to_string()));
        let expected = if mapped == logged { "Fm" } else { "m" };
        prop_assert_eq!(line, expected);
    }

    /// Templates without brackets are one literal
    #[test]
    fn test_plain_template_is_literal(text in "[^\\[]{1,40}") {
        let format = Format::from_template(&text, TimestampFormat::default(), LevelFlags::new());
        prop_assert_eq!(format.tokens(), &[FormatToken::Literal(text.clone())][..]);
    }

    /// Any date pattern renders without panicking
    #[test]
    fn test_any_pattern_renders(pattern in "\\PC{0,20}") {
        let event = fixed_event(Level::Info, String::new());
        let rendered = TimestampFormat::pattern(pattern.clone()).format(&event.timestamp);
        if !TimestampFormat::pattern(pattern.clone()).is_valid() {
            prop_assert_eq!(rendered, pattern);
        }
    }
}
