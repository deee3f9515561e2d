//! Temporal progress model
//!
//! Resolves the date/time fields of a block into absolute instants and
//! derives the progress fraction, phase and the elapsed/remaining/total
//! durations for a reference "now".
//!
//! ```text
//!   start ─────────── now ─────────────────── end
//!   │◄──── elapsed ───►│◄────── remaining ─────►│
//!   │◄──────────────────── total ──────────────►│
//! ```

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use countdown_types::DurationRounding;
use countdown_types::formatting::DurationParts;

use crate::error::{CountdownError, Endpoint};

/// Layouts accepted for a full `date+time` value
const COMBINED_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];
const RESOLVED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";
const MIDNIGHT: &str = "00:00:00";

// ─────────────────────────────────────────────────────────────────────────────
// Instant resolution
// ─────────────────────────────────────────────────────────────────────────────

/// True for `YYYY-MM-DDTHH:MM` with optional `:SS`
fn is_combined(value: &str) -> bool {
    const SHAPE: &[u8] = b"dddd-dd-ddTdd:dd:dd";
    let bytes = value.as_bytes();
    if bytes.len() != 16 && bytes.len() != 19 {
        return false;
    }
    bytes.iter().zip(SHAPE).all(|(&b, &expected)| match expected {
        b'd' => b.is_ascii_digit(),
        other => b == other,
    })
}

/// Expand `HH` and `HH:MM` to `HH:MM:SS`
fn normalize_time(time: &str) -> String {
    match time.matches(':').count() {
        0 => format!("{}:00:00", time),
        1 => format!("{}:00", time),
        _ => time.to_string(),
    }
}

/// Resolve optional date and time components into an absolute instant.
///
/// A date already in combined `date+time` form is parsed as-is. Otherwise
/// the date defaults to the calendar day of `now` and the time to midnight.
pub fn resolve_instant(
    date: Option<&str>,
    time: Option<&str>,
    now: NaiveDateTime,
    endpoint: Endpoint,
) -> Result<NaiveDateTime, CountdownError> {
    let invalid = |input: String| CountdownError::InvalidTemporalInput { endpoint, input };

    if let Some(date) = date.filter(|d| is_combined(d)) {
        return COMBINED_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(date, fmt).ok())
            .ok_or_else(|| invalid(date.to_string()));
    }

    let date = match date {
        Some(d) => d.to_string(),
        None => now.date().format(DATE_FORMAT).to_string(),
    };
    let time = time.map(normalize_time).unwrap_or_else(|| MIDNIGHT.to_string());
    let combined = format!("{}T{}", date, time);

    NaiveDateTime::parse_from_str(&combined, RESOLVED_FORMAT).map_err(|_| invalid(combined))
}

/// Calendar date of an instant in ISO form (`YYYY-MM-DD`)
pub fn iso_date(instant: NaiveDateTime) -> String {
    instant.date().format(DATE_FORMAT).to_string()
}

/// Parse a `--at` style instant: combined form or a bare date at midnight
pub fn parse_reference_instant(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    COMBINED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

// ─────────────────────────────────────────────────────────────────────────────
// Interval
// ─────────────────────────────────────────────────────────────────────────────

/// A non-empty span of time; `start < end` always holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl Interval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, CountdownError> {
        if end <= start {
            return Err(CountdownError::DegenerateInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn length(&self) -> TimeDelta {
        self.end - self.start
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Progress state
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Before the configured start
    Upcoming,
    /// Between start and end
    Active,
    /// At or after the end
    Complete,
}

/// The three instants a template can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instants {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub current: NaiveDateTime,
}

/// Derived progress for one evaluation. Never stored; recomputed per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressState {
    /// Position within the interval, in `[0, 1]`
    pub fraction: f64,
    pub phase: Phase,
    pub elapsed: TimeDelta,
    pub remaining: TimeDelta,
    pub total: TimeDelta,
}

/// Day/hour/minute/second decomposition of the three durations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakdown {
    pub elapsed: DurationParts,
    pub remaining: DurationParts,
    pub total: DurationParts,
}

/// Seconds with sub-second precision, falling back to milliseconds for
/// spans too wide to express in nanoseconds
pub fn delta_secs(delta: TimeDelta) -> f64 {
    match delta.num_nanoseconds() {
        Some(ns) => ns as f64 / 1e9,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}

impl ProgressState {
    /// Evaluate an interval at `now`
    pub fn compute(interval: &Interval, now: NaiveDateTime) -> Self {
        let total = interval.length();
        let elapsed = (now - interval.start()).clamp(TimeDelta::zero(), total);
        let remaining = total - elapsed;

        // Clamp again: the ratio of two rounded floats can stray past the bounds.
        let fraction = (delta_secs(elapsed) / delta_secs(total)).clamp(0.0, 1.0);

        let phase = if now < interval.start() {
            Phase::Upcoming
        } else if fraction >= 1.0 {
            Phase::Complete
        } else {
            Phase::Active
        };

        Self {
            fraction,
            phase,
            elapsed,
            remaining,
            total,
        }
    }

    /// Evaluate the time left before `start` as its own interval `[now, start]`.
    ///
    /// Returns `None` once `now` has reached `start`.
    pub fn until_start(start: NaiveDateTime, now: NaiveDateTime) -> Option<Self> {
        let interval = Interval::new(now, start).ok()?;
        let mut state = Self::compute(&interval, now);
        state.phase = Phase::Upcoming;
        Some(state)
    }

    pub fn breakdown(&self, rounding: DurationRounding) -> Breakdown {
        Breakdown {
            elapsed: DurationParts::decompose(delta_secs(self.elapsed), rounding),
            remaining: DurationParts::decompose(delta_secs(self.remaining), rounding),
            total: DurationParts::decompose(delta_secs(self.total), rounding),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, RESOLVED_FORMAT).unwrap()
    }

    fn day_interval() -> Interval {
        Interval::new(at("2025-01-01T00:00:00"), at("2025-01-02T00:00:00")).unwrap()
    }

    #[test]
    fn test_resolve_combined() {
        let now = at("2030-06-01T08:00:00");
        assert_eq!(
            resolve_instant(Some("2025-03-04T05:06"), None, now, Endpoint::Start).unwrap(),
            at("2025-03-04T05:06:00")
        );
        assert_eq!(
            resolve_instant(Some("2025-03-04T05:06:07"), Some("23:00"), now, Endpoint::Start)
                .unwrap(),
            at("2025-03-04T05:06:07")
        );
    }

    #[test]
    fn test_resolve_defaults() {
        let now = at("2025-06-15T14:30:00");
        // Date only: midnight
        assert_eq!(
            resolve_instant(Some("2025-07-01"), None, now, Endpoint::End).unwrap(),
            at("2025-07-01T00:00:00")
        );
        // Time only: today
        assert_eq!(
            resolve_instant(None, Some("18:45"), now, Endpoint::End).unwrap(),
            at("2025-06-15T18:45:00")
        );
        // Hour only
        assert_eq!(
            resolve_instant(None, Some("9"), now, Endpoint::End).unwrap(),
            at("2025-06-15T09:00:00")
        );
        // Neither: today at midnight
        assert_eq!(
            resolve_instant(None, None, now, Endpoint::Start).unwrap(),
            at("2025-06-15T00:00:00")
        );
    }

    #[test]
    fn test_resolve_invalid() {
        let now = at("2025-06-15T14:30:00");
        let err = resolve_instant(Some("next tuesday"), None, now, Endpoint::End).unwrap_err();
        assert_eq!(
            err,
            CountdownError::InvalidTemporalInput {
                endpoint: Endpoint::End,
                input: "next tuesdayT00:00:00".to_string(),
            }
        );

        let err = resolve_instant(Some("2025-13-01T10:00"), None, now, Endpoint::Start);
        assert!(matches!(err, Err(CountdownError::InvalidTemporalInput { .. })));

        let err = resolve_instant(Some("2025-01-01"), Some("25:00"), now, Endpoint::Start);
        assert!(matches!(err, Err(CountdownError::InvalidTemporalInput { .. })));
    }

    #[test]
    fn test_parse_reference_instant() {
        assert_eq!(
            parse_reference_instant("2025-01-01T12:00"),
            Some(at("2025-01-01T12:00:00"))
        );
        assert_eq!(
            parse_reference_instant("2025-01-01"),
            Some(at("2025-01-01T00:00:00"))
        );
        assert_eq!(parse_reference_instant("soon"), None);
    }

    #[test]
    fn test_interval_rejects_degenerate() {
        let t = at("2025-01-01T00:00:00");
        assert!(matches!(
            Interval::new(t, t),
            Err(CountdownError::DegenerateInterval { .. })
        ));
        assert!(Interval::new(t, t - TimeDelta::seconds(1)).is_err());
    }

    #[test]
    fn test_midpoint() {
        let state = ProgressState::compute(&day_interval(), at("2025-01-01T12:00:00"));
        assert_eq!(state.fraction, 0.5);
        assert_eq!(state.phase, Phase::Active);
        assert_eq!(state.elapsed, TimeDelta::hours(12));
        assert_eq!(state.remaining, TimeDelta::hours(12));
        assert_eq!(state.total, TimeDelta::hours(24));
    }

    #[test]
    fn test_before_and_after() {
        let before = ProgressState::compute(&day_interval(), at("2024-12-31T00:00:00"));
        assert_eq!(before.fraction, 0.0);
        assert_eq!(before.phase, Phase::Upcoming);
        assert_eq!(before.elapsed, TimeDelta::zero());
        assert_eq!(before.remaining, TimeDelta::hours(24));

        let at_start = ProgressState::compute(&day_interval(), at("2025-01-01T00:00:00"));
        assert_eq!(at_start.fraction, 0.0);
        assert_eq!(at_start.phase, Phase::Active);

        let after = ProgressState::compute(&day_interval(), at("2025-01-05T00:00:00"));
        assert_eq!(after.fraction, 1.0);
        assert_eq!(after.phase, Phase::Complete);
        assert_eq!(after.remaining, TimeDelta::zero());
        assert!(after.is_complete());
    }

    #[test]
    fn test_until_start() {
        let start = at("2025-01-02T00:00:00");
        let state = ProgressState::until_start(start, at("2025-01-01T18:00:00")).unwrap();
        assert_eq!(state.phase, Phase::Upcoming);
        assert_eq!(state.fraction, 0.0);
        assert_eq!(state.remaining, TimeDelta::hours(6));

        assert!(ProgressState::until_start(start, start).is_none());
    }

    #[test]
    fn test_breakdown_always_computed() {
        let state = ProgressState::compute(&day_interval(), at("2025-01-03T00:00:00"));
        let parts = state.breakdown(DurationRounding::Floor);
        assert_eq!(parts.total.days, 1);
        assert_eq!(parts.elapsed.days, 1);
        assert!(parts.remaining.is_zero());
    }

    proptest! {
        #[test]
        fn prop_fraction_bounded_and_monotonic(
            start in 0i64..1_000_000_000,
            len in 1i64..100_000_000,
            a in -200_000_000i64..1_300_000_000,
            b in -200_000_000i64..1_300_000_000,
        ) {
            let base = at("2000-01-01T00:00:00");
            let interval = Interval::new(
                base + TimeDelta::seconds(start),
                base + TimeDelta::seconds(start + len),
            ).unwrap();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let s1 = ProgressState::compute(&interval, base + TimeDelta::seconds(lo));
            let s2 = ProgressState::compute(&interval, base + TimeDelta::seconds(hi));

            prop_assert!((0.0..=1.0).contains(&s1.fraction));
            prop_assert!((0.0..=1.0).contains(&s2.fraction));
            prop_assert!(s1.fraction <= s2.fraction);

            let now = base + TimeDelta::seconds(lo);
            prop_assert_eq!(s1.fraction == 0.0, now <= interval.start());
            prop_assert_eq!(s1.fraction == 1.0, now >= interval.end());
        }
    }
}
