//! Error taxonomy for rendering a countdown block
//!
//! Every variant is an expected authoring mistake, not a defect. The
//! scheduler turns them into text on the sink's error path; they never
//! reach the host as a failure.

use chrono::NaiveDateTime;
use std::fmt;

/// Which end of the interval a temporal input belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::End => f.write_str("end"),
        }
    }
}

/// Missing or contradictory fields in a parameter block
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Start date or start time is required")]
    MissingStart,

    #[error("End date or end time is required")]
    MissingEnd,

    #[error("Start time with no start date requires an end time with no end date")]
    TimeOnlyStartWithDatedEnd,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CountdownError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid {endpoint} date or time format: {input}")]
    InvalidTemporalInput { endpoint: Endpoint, input: String },

    #[error("End date/time must be after start date/time ({start} .. {end})")]
    DegenerateInterval {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// Errors from loading or storing persisted settings
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load settings: {0}")]
    Load(#[source] confy::ConfyError),

    #[error("Failed to store settings: {0}")]
    Store(#[source] confy::ConfyError),

    #[error("Failed to locate settings file: {0}")]
    Locate(#[source] confy::ConfyError),
}
