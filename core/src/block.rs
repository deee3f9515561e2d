//! A parsed block resolved against global settings
//!
//! [`Block::prepare`] runs once per mount: it parses the source, pins the
//! start/end instants and merges per-block overrides with the global
//! defaults. Every tick afterwards only calls [`Block::evaluate`] against
//! the same pinned interval.

use std::time::Duration;

use chrono::NaiveDateTime;
use countdown_types::{
    BarType, DurationRounding, MAX_UPDATE_INTERVAL_SECS, MIN_UPDATE_INTERVAL_SECS, ProgressType,
    Settings,
};

use crate::error::CountdownError;
use crate::params::{self, Params};
use crate::sink::{Appearance, ProgressSink};
use crate::temporal::{Instants, Interval, Phase, ProgressState};
use crate::template;

/// Per-block overrides merged over the global defaults
#[derive(Debug, Clone, PartialEq)]
pub struct BlockOptions {
    pub title: Option<String>,
    pub appearance: Appearance,
    pub progress_type: ProgressType,
    pub on_complete_text: String,
    pub info_format: String,
    pub info_format_upcoming: String,
    pub update_in_real_time: bool,
    pub update_interval: Duration,
    pub rounding: DurationRounding,
}

impl BlockOptions {
    pub fn resolve(params: &Params, settings: &Settings) -> Self {
        let text = |key: &str, default: &str| params.get(key).unwrap_or(default).to_string();

        let bar_type = params
            .get(params::TYPE)
            .map(|kw| BarType::from_keyword(kw).unwrap_or_default())
            .unwrap_or(settings.default_bar_type);

        let progress_type = params
            .get(params::PROGRESS_TYPE)
            .map(|kw| ProgressType::from_keyword(kw).unwrap_or_default())
            .unwrap_or(settings.default_progress_type);

        let update_in_real_time = params
            .get(params::UPDATE_IN_REAL_TIME)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(settings.default_update_in_real_time);

        let interval_secs = match params.update_interval() {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs <= MAX_UPDATE_INTERVAL_SECS => secs,
                _ => {
                    tracing::warn!(value = raw, "Invalid update interval, using default");
                    settings.update_interval_secs()
                }
            },
            None => settings.update_interval_secs(),
        };

        Self {
            title: params.title().map(str::to_string),
            appearance: Appearance {
                bar_type,
                color: text(params::COLOR, &settings.default_bar_color),
                trail_color: params
                    .trail_color()
                    .unwrap_or(&settings.default_trail_color)
                    .to_string(),
            },
            progress_type,
            on_complete_text: text(params::ON_COMPLETE_TEXT, &settings.default_on_complete_text),
            info_format: text(params::INFO_FORMAT, &settings.default_info_format),
            info_format_upcoming: text(
                params::INFO_FORMAT_UPCOMING,
                &settings.default_info_format_upcoming,
            ),
            update_in_real_time,
            update_interval: Duration::from_secs(interval_secs.max(MIN_UPDATE_INTERVAL_SECS)),
            rounding: settings.duration_rounding,
        }
    }
}

/// One evaluated frame, ready for a sink
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub state: ProgressState,
    /// Value for the visual bar, already adjusted for the progress type
    pub bar_value: f64,
    pub info_text: String,
}

impl Frame {
    pub fn apply(&self, sink: &dyn ProgressSink) {
        sink.set_progress(self.bar_value);
        sink.set_info_text(&self.info_text);
    }
}

#[derive(Debug, Clone)]
pub struct Block {
    options: BlockOptions,
    interval: Interval,
}

impl Block {
    /// Parse and validate `source`, pinning relative dates to `now`.
    pub fn prepare(
        source: &str,
        settings: &Settings,
        now: NaiveDateTime,
    ) -> Result<Self, CountdownError> {
        let params = params::parse_at(source, now)?;
        let interval = params.interval(now)?;
        Ok(Self {
            options: BlockOptions::resolve(&params, settings),
            interval,
        })
    }

    pub fn options(&self) -> &BlockOptions {
        &self.options
    }

    pub fn interval(&self) -> &Interval {
        &self.interval
    }

    /// Send the appearance, the title and the frame at `now` to `sink`.
    pub fn render(&self, now: NaiveDateTime, sink: &dyn ProgressSink) -> Frame {
        sink.set_appearance(&self.options.appearance);
        if let Some(title) = self.options.title.as_deref() {
            sink.set_title(title);
        }
        let frame = self.evaluate(now);
        frame.apply(sink);
        frame
    }

    /// Evaluate at `now`, switching between the upcoming and active views.
    ///
    /// Before the start, the time until start is its own interval and the
    /// upcoming template applies.
    pub fn evaluate(&self, now: NaiveDateTime) -> Frame {
        let start = self.interval.start();
        let opts = &self.options;

        let (state, instants, template) = match ProgressState::until_start(start, now) {
            Some(state) => (
                state,
                Instants {
                    start: now,
                    end: start,
                    current: now,
                },
                &opts.info_format_upcoming,
            ),
            None => (
                ProgressState::compute(&self.interval, now),
                Instants {
                    start,
                    end: self.interval.end(),
                    current: now,
                },
                &opts.info_format,
            ),
        };

        let title = opts.title.as_deref().unwrap_or("");
        let info_text = match state.phase {
            Phase::Complete => template::format_complete(&opts.on_complete_text, title),
            Phase::Upcoming | Phase::Active => {
                template::format(template, &state, &instants, title, opts.rounding)
            }
        };

        Frame {
            bar_value: opts.progress_type.bar_value(state.fraction),
            state,
            info_text,
        }
    }
}
