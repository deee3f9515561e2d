//! Parameter block parsing
//!
//! A block is a list of `key: value` lines:
//!
//! ```text
//! title: Launch
//! startDate: 2025-01-01
//! endDate: 2025-03-01T09:30
//! infoFormat: {percent}% - {remaining} left
//! ```
//!
//! Parsing is forgiving: blank lines, lines without a `:` and lines whose key
//! or value is empty are skipped. Validation then looks at the whole record,
//! since a lone time is only meaningful next to the other fields.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDateTime};

use crate::error::{CountdownError, Endpoint, ValidationError};
use crate::temporal::{Interval, resolve_instant};

pub const START_DATE: &str = "startDate";
pub const START_TIME: &str = "startTime";
pub const END_DATE: &str = "endDate";
pub const END_TIME: &str = "endTime";
pub const TITLE: &str = "title";
pub const TYPE: &str = "type";
pub const COLOR: &str = "color";
pub const TRAIL_COLOR: &str = "trailColor";
pub const BACKGROUND_COLOR: &str = "backgroundColor";
pub const PROGRESS_TYPE: &str = "progressType";
pub const ON_COMPLETE_TEXT: &str = "onCompleteText";
pub const INFO_FORMAT: &str = "infoFormat";
pub const INFO_FORMAT_UPCOMING: &str = "infoFormatUpcoming";
pub const UPDATE_IN_REAL_TIME: &str = "updateInRealTime";
pub const UPDATE_INTERVAL_IN_SECONDS: &str = "updateIntervalInSeconds";
pub const UPDATE_INTERVAL: &str = "updateInterval";

/// Validated key/value record parsed from a block.
///
/// Keys are case-sensitive. Unknown keys are kept but nothing downstream
/// reads them. A repeated key keeps its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: BTreeMap<String, String>,
}

impl Params {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn title(&self) -> Option<&str> {
        self.get(TITLE)
    }

    /// Trail color, accepting the first-generation `backgroundColor` key
    pub fn trail_color(&self) -> Option<&str> {
        self.get(TRAIL_COLOR).or_else(|| self.get(BACKGROUND_COLOR))
    }

    /// Update interval, accepting the shorter `updateInterval` key
    pub fn update_interval(&self) -> Option<&str> {
        self.get(UPDATE_INTERVAL_IN_SECONDS)
            .or_else(|| self.get(UPDATE_INTERVAL))
    }

    /// Resolve the configured start and end against `now`.
    pub fn interval(&self, now: NaiveDateTime) -> Result<Interval, CountdownError> {
        let start = resolve_instant(self.get(START_DATE), self.get(START_TIME), now, Endpoint::Start)?;
        let end = resolve_instant(self.get(END_DATE), self.get(END_TIME), now, Endpoint::End)?;
        Interval::new(start, end)
    }

    /// Structural rules, checked in order; the first violation wins.
    fn validate_fields(&self) -> Result<(), ValidationError> {
        if !self.contains(START_DATE) && !self.contains(START_TIME) {
            return Err(ValidationError::MissingStart);
        }
        if !self.contains(END_DATE) && !self.contains(END_TIME) {
            return Err(ValidationError::MissingEnd);
        }
        let time_only_start = self.contains(START_TIME) && !self.contains(START_DATE);
        if time_only_start && self.contains(END_DATE) {
            return Err(ValidationError::TimeOnlyStartWithDatedEnd);
        }
        Ok(())
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Split a block into key/value pairs without validating them.
pub fn read_entries(source: &str) -> Params {
    source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            let (key, value) = (key.trim(), value.trim());
            (!key.is_empty() && !value.is_empty()).then(|| (key.to_string(), value.to_string()))
        })
        .collect()
}

/// Parse and validate a block, resolving relative fields against `now`.
pub fn parse_at(source: &str, now: NaiveDateTime) -> Result<Params, CountdownError> {
    let params = read_entries(source);
    params.validate_fields()?;
    params.interval(now)?;
    Ok(params)
}

/// Parse and validate a block against the local wall clock.
pub fn parse(source: &str) -> Result<Params, CountdownError> {
    parse_at(source, Local::now().naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2025-06-15T12:00:00", "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn test_parse_date_range() {
        let params = parse_at("startDate: 2025-01-01\nendDate: 2025-01-10", now()).unwrap();
        assert_eq!(params.get(START_DATE), Some("2025-01-01"));
        assert_eq!(params.get(END_DATE), Some("2025-01-10"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_read_entries_is_forgiving() {
        let source = "
            title:   Release: v2

            no separator here
            : orphan value
            empty:
            startDate: 2025-01-01
            custom: kept
        ";
        let params = read_entries(source);
        assert_eq!(params.title(), Some("Release: v2"));
        assert_eq!(params.get("custom"), Some("kept"));
        assert!(!params.contains("empty"));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_repeated_key_last_wins() {
        let params = read_entries("title: first\ntitle: second");
        assert_eq!(params.title(), Some("second"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let params = read_entries("Title: upper\ntitle: lower");
        assert_eq!(params.title(), Some("lower"));
        assert_eq!(params.get("Title"), Some("upper"));
    }

    #[test]
    fn test_missing_start() {
        let err = parse_at("endDate: 2025-01-10", now()).unwrap_err();
        assert_eq!(err, CountdownError::Validation(ValidationError::MissingStart));
    }

    #[test]
    fn test_missing_end() {
        let err = parse_at("startDate: 2025-01-01\ntitle: x", now()).unwrap_err();
        assert_eq!(err, CountdownError::Validation(ValidationError::MissingEnd));
    }

    #[test]
    fn test_first_rule_wins() {
        let err = parse_at("title: nothing else", now()).unwrap_err();
        assert_eq!(err, CountdownError::Validation(ValidationError::MissingStart));
    }

    #[test]
    fn test_time_only_start_requires_time_only_end() {
        let err = parse_at("startTime: 09:00\nendDate: 2025-06-20", now()).unwrap_err();
        assert_eq!(
            err,
            CountdownError::Validation(ValidationError::TimeOnlyStartWithDatedEnd)
        );

        let err = parse_at("startTime: 09:00\nendDate: 2025-06-20\nendTime: 10:00", now())
            .unwrap_err();
        assert_eq!(
            err,
            CountdownError::Validation(ValidationError::TimeOnlyStartWithDatedEnd)
        );

        assert!(parse_at("startTime: 09:00\nendTime: 17:00", now()).is_ok());
    }

    #[test]
    fn test_same_date_is_degenerate() {
        let err = parse_at("startDate: 2025-01-01\nendDate: 2025-01-01", now()).unwrap_err();
        assert!(matches!(err, CountdownError::DegenerateInterval { .. }));
    }

    #[test]
    fn test_equivalent_times_are_degenerate() {
        let err = parse_at("startTime: 9\nendTime: 09:00", now()).unwrap_err();
        assert!(matches!(err, CountdownError::DegenerateInterval { .. }));
    }

    #[test]
    fn test_reversed_is_degenerate() {
        let err = parse_at("startDate: 2025-02-01\nendDate: 2025-01-01", now()).unwrap_err();
        assert!(matches!(err, CountdownError::DegenerateInterval { .. }));
    }

    #[test]
    fn test_invalid_date() {
        let err = parse_at("startDate: 2025-01-01\nendDate: someday", now()).unwrap_err();
        assert!(matches!(
            err,
            CountdownError::InvalidTemporalInput {
                endpoint: Endpoint::End,
                ..
            }
        ));
    }

    #[test]
    fn test_aliases() {
        let params = read_entries("backgroundColor: #111\nupdateInterval: 5");
        assert_eq!(params.trail_color(), Some("#111"));
        assert_eq!(params.update_interval(), Some("5"));

        let params = read_entries(
            "backgroundColor: #111\ntrailColor: #222\nupdateInterval: 5\nupdateIntervalInSeconds: 9",
        );
        assert_eq!(params.trail_color(), Some("#222"));
        assert_eq!(params.update_interval(), Some("9"));
    }

    #[test]
    fn test_combined_start_date() {
        let params = parse_at("startDate: 2025-01-01T08:00\nendDate: 2025-01-01T17:30", now())
            .unwrap();
        let interval = params.interval(now()).unwrap();
        assert_eq!(interval.length(), chrono::TimeDelta::minutes(570));
    }
}
