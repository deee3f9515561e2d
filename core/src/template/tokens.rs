//! Format-token rendering for `{name:FMT}` placeholders
//!
//! Tokens follow the Luxon table of tokens that block authors already know
//! (`yyyy-MM-dd`, `LLL d, yyyy`, `hh:mm:ss`). A token is a run of one
//! repeated letter; text inside single quotes is literal. Anything not
//! understood is written through unchanged.

use chrono::{Datelike, NaiveDateTime, Timelike};
use countdown_types::formatting::pad;

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Duration units from largest to smallest, with their token letter
const DURATION_UNITS: &[(char, i64)] = &[
    ('d', MS_PER_DAY),
    ('h', MS_PER_HOUR),
    ('m', MS_PER_MINUTE),
    ('s', MS_PER_SECOND),
    ('S', 1),
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    /// A run of `count` copies of `letter`
    Field { letter: char, count: usize },
}

fn tokenize(fmt: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = fmt.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\'' {
            // Quoted literal runs to the next quote (or the end)
            for q in chars.by_ref() {
                if q == '\'' {
                    break;
                }
                literal.push(q);
            }
            continue;
        }

        if !c.is_ascii_alphabetic() {
            literal.push(c);
            continue;
        }

        let mut count = 1;
        while chars.peek() == Some(&c) {
            chars.next();
            count += 1;
        }

        if !literal.is_empty() {
            tokens.push(Token::Literal(std::mem::take(&mut literal)));
        }
        tokens.push(Token::Field { letter: c, count });
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    tokens
}

fn repeat(letter: char, count: usize) -> String {
    std::iter::repeat_n(letter, count).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Dates
// ─────────────────────────────────────────────────────────────────────────────

/// Render an instant with a date/time token string.
pub fn format_date(instant: NaiveDateTime, fmt: &str) -> String {
    tokenize(fmt)
        .into_iter()
        .map(|token| match token {
            Token::Literal(text) => text,
            Token::Field { letter, count } => {
                date_field(instant, letter, count).unwrap_or_else(|| repeat(letter, count))
            }
        })
        .collect()
}

fn date_field(dt: NaiveDateTime, letter: char, count: usize) -> Option<String> {
    let text = match (letter, count) {
        // Year
        ('y', 2) => pad(dt.year().rem_euclid(100) as u64, 2),
        ('y', 1 | 4 | 6) => pad(dt.year().max(0) as u64, count),

        // Month (format and standalone forms are identical in English)
        ('M' | 'L', 1 | 2) => pad(dt.month() as u64, count),
        ('M' | 'L', 3) => dt.format("%b").to_string(),
        ('M' | 'L', 4) => dt.format("%B").to_string(),
        ('M' | 'L', 5) => dt.format("%B").to_string().chars().take(1).collect(),

        // Day of month / day of year
        ('d', 1 | 2) => pad(dt.day() as u64, count),
        ('o', 1 | 3) => pad(dt.ordinal() as u64, count),

        // Weekday
        ('E' | 'c', 1) => dt.weekday().number_from_monday().to_string(),
        ('E' | 'c', 3) => dt.format("%a").to_string(),
        ('E' | 'c', 4) => dt.format("%A").to_string(),
        ('E' | 'c', 5) => dt.format("%A").to_string().chars().take(1).collect(),

        // Time of day
        ('H', 1 | 2) => pad(dt.hour() as u64, count),
        ('h', 1 | 2) => pad(dt.hour12().1 as u64, count),
        ('m', 1 | 2) => pad(dt.minute() as u64, count),
        ('s', 1 | 2) => pad(dt.second() as u64, count),
        ('S', 1 | 3) => pad((dt.nanosecond() / 1_000_000).min(999) as u64, count),
        ('a', 1) => dt.format("%p").to_string(),

        // Quarter and ISO week
        ('q', 1 | 2) => pad(dt.month0() as u64 / 3 + 1, count),
        ('W', 1 | 2) => pad(dt.iso_week().week() as u64, count),

        // Presets
        ('D', 1) => format_date(dt, "M/d/yyyy"),
        ('D', 2) => format_date(dt, "LLL d, yyyy"),
        ('D', 3) => format_date(dt, "LLLL d, yyyy"),
        ('D', 4) => format_date(dt, "EEEE, LLLL d, yyyy"),
        ('t', 1) => format_date(dt, "h:mm a"),
        ('T', 1) => format_date(dt, "HH:mm"),

        _ => return None,
    };
    Some(text)
}

// ─────────────────────────────────────────────────────────────────────────────
// Durations
// ─────────────────────────────────────────────────────────────────────────────

/// Render a non-negative duration (in seconds) with a token string.
///
/// The duration is shifted into the units the format mentions: the largest
/// unit present absorbs everything above it, and anything below the
/// smallest unit present is dropped. With `hh:mm` a span of 1 day 2 hours 5
/// minutes renders as `26:05`.
pub fn format_duration(total_secs: f64, fmt: &str) -> String {
    let tokens = tokenize(fmt);
    let total_ms = if total_secs.is_finite() {
        (total_secs.max(0.0) * 1_000.0).floor() as i64
    } else {
        0
    };

    let mut values: Vec<(char, i64)> = Vec::with_capacity(DURATION_UNITS.len());
    let mut left = total_ms;
    for &(unit, ms) in DURATION_UNITS {
        let used = tokens
            .iter()
            .any(|t| matches!(t, Token::Field { letter, .. } if *letter == unit));
        if used {
            values.push((unit, left / ms));
            left %= ms;
        }
    }

    tokens
        .into_iter()
        .map(|token| match token {
            Token::Literal(text) => text,
            Token::Field { letter, count } => values
                .iter()
                .find(|(unit, _)| *unit == letter)
                .map(|&(_, value)| pad(value as u64, count))
                .unwrap_or_else(|| repeat(letter, count)),
        })
        .collect()
}
