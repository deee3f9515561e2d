//! Centralized text formatting for progress info.
//!
//! Percentages and plain-language durations go through this module so every
//! host renders `{percent}` and `{remaining}`-style placeholders identically.

use crate::DurationRounding;

const SECS_PER_MINUTE: f64 = 60.0;
const SECS_PER_HOUR: f64 = 3_600.0;
const SECS_PER_DAY: f64 = 86_400.0;

/// A duration split into non-overlapping day/hour/minute/second fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DurationParts {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl DurationParts {
    /// Decompose a magnitude in seconds.
    ///
    /// Each field is derived from the total magnitude (not by iterative
    /// subtraction), then rounded with the same policy. Negative input is
    /// treated as zero.
    ///
    /// # Examples
    /// ```
    /// use countdown_types::DurationRounding;
    /// use countdown_types::formatting::DurationParts;
    /// let parts = DurationParts::decompose(8_043.0, DurationRounding::Floor);
    /// assert_eq!((parts.days, parts.hours, parts.minutes, parts.seconds), (0, 2, 14, 3));
    /// let parts = DurationParts::decompose(43_200.0, DurationRounding::Ceil);
    /// assert_eq!(parts.days, 1);
    /// ```
    pub fn decompose(total_secs: f64, rounding: DurationRounding) -> Self {
        let total = if total_secs.is_finite() { total_secs.max(0.0) } else { 0.0 };
        let field = |value: f64| rounding.apply(value) as u64;

        Self {
            days: field(total / SECS_PER_DAY),
            hours: field((total / SECS_PER_HOUR) % 24.0),
            minutes: field((total / SECS_PER_MINUTE) % 60.0),
            seconds: field(total % SECS_PER_MINUTE),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }
}

/// Format a count with its unit label, pluralized unless the count is exactly one.
///
/// # Examples
/// ```
/// use countdown_types::formatting::pluralize;
/// assert_eq!(pluralize(1, "day"), "1 day");
/// assert_eq!(pluralize(3, "hour"), "3 hours");
/// assert_eq!(pluralize(0, "second"), "0 seconds");
/// ```
pub fn pluralize(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Format a duration breakdown as plain text, cascading from the largest unit.
///
/// - Days present: days only
/// - Hours present: hours, minutes and seconds
/// - Minutes present: minutes and seconds
/// - Otherwise: seconds
///
/// # Examples
/// ```
/// use countdown_types::formatting::{format_duration_text, DurationParts};
/// let parts = DurationParts { days: 0, hours: 2, minutes: 14, seconds: 3 };
/// assert_eq!(format_duration_text(&parts), "2 hours 14 minutes 3 seconds");
/// let parts = DurationParts { days: 4, hours: 2, minutes: 0, seconds: 0 };
/// assert_eq!(format_duration_text(&parts), "4 days");
/// ```
pub fn format_duration_text(parts: &DurationParts) -> String {
    if parts.days > 0 {
        pluralize(parts.days, "day")
    } else if parts.hours > 0 {
        format!(
            "{} {} {}",
            pluralize(parts.hours, "hour"),
            pluralize(parts.minutes, "minute"),
            pluralize(parts.seconds, "second")
        )
    } else if parts.minutes > 0 {
        format!(
            "{} {}",
            pluralize(parts.minutes, "minute"),
            pluralize(parts.seconds, "second")
        )
    } else {
        pluralize(parts.seconds, "second")
    }
}

/// Whole percentage (floored) of a progress fraction, clamped to 0–100.
///
/// # Examples
/// ```
/// use countdown_types::formatting::format_percent;
/// assert_eq!(format_percent(0.5), "50");
/// assert_eq!(format_percent(0.999), "99");
/// assert_eq!(format_percent(1.2), "100");
/// ```
pub fn format_percent(fraction: f64) -> String {
    let pct = (fraction.clamp(0.0, 1.0) * 100.0).floor() as u32;
    pct.to_string()
}

/// Zero-pad a number to at least `width` digits.
///
/// # Examples
/// ```
/// use countdown_types::formatting::pad;
/// assert_eq!(pad(7, 2), "07");
/// assert_eq!(pad(123, 2), "123");
/// ```
pub fn pad(n: u64, width: usize) -> String {
    format!("{:0width$}", n, width = width)
}
