//! Placeholder templates for the info text
//!
//! Two placeholder families are recognised:
//!
//! | Placeholder | Renders |
//! |-------------|---------|
//! | `{percent}` | Whole percent complete (floored) |
//! | `{start}` `{end}` `{current}` | ISO calendar date |
//! | `{remaining}` `{elapsed}` `{total}` | Plain-language duration |
//! | `{title}` | Block title, or nothing |
//! | `{start:FMT}` `{end:FMT}` `{current:FMT}` | Date rendered with format tokens |
//! | `{remaining:FMT}` `{elapsed:FMT}` `{total:FMT}` | Duration rendered with format tokens |
//!
//! Templates are scanned once, left to right, and substituted text is never
//! rescanned. A `{name:FMT}` token is always read as a whole, so it cannot
//! be mistaken for the plain `{name}` placeholder. Anything unrecognised is
//! left as literal text.

pub mod tokens;

use countdown_types::DurationRounding;
use countdown_types::formatting::{format_duration_text, format_percent};

use crate::temporal::{Instants, ProgressState, delta_secs, iso_date};

/// Replace every `{name}` / `{name:spec}` the resolver recognises.
fn substitute<F>(template: &str, mut resolve: F) -> String
where
    F: FnMut(&str, Option<&str>) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let replaced = after.find('}').and_then(|close| {
            let body = &after[..close];
            if body.contains('{') {
                return None;
            }
            let (name, spec) = match body.split_once(':') {
                Some((name, spec)) => (name, Some(spec)),
                None => (body, None),
            };
            resolve(name, spec).map(|text| (text, close))
        });

        match replaced {
            Some((text, close)) => {
                out.push_str(&text);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Render an info template for one evaluation.
///
/// Pure: the same inputs always produce the same text.
pub fn format(
    template: &str,
    state: &ProgressState,
    instants: &Instants,
    title: &str,
    rounding: DurationRounding,
) -> String {
    let breakdown = state.breakdown(rounding);

    substitute(template, |name, spec| {
        let text = match (name, spec) {
            ("percent", None) => format_percent(state.fraction),
            ("title", None) => title.to_string(),

            ("start", None) => iso_date(instants.start),
            ("end", None) => iso_date(instants.end),
            ("current", None) => iso_date(instants.current),
            ("start", Some(fmt)) => tokens::format_date(instants.start, fmt),
            ("end", Some(fmt)) => tokens::format_date(instants.end, fmt),
            ("current", Some(fmt)) => tokens::format_date(instants.current, fmt),

            ("remaining", None) => format_duration_text(&breakdown.remaining),
            ("elapsed", None) => format_duration_text(&breakdown.elapsed),
            ("total", None) => format_duration_text(&breakdown.total),
            ("remaining", Some(fmt)) => tokens::format_duration(delta_secs(state.remaining), fmt),
            ("elapsed", Some(fmt)) => tokens::format_duration(delta_secs(state.elapsed), fmt),
            ("total", Some(fmt)) => tokens::format_duration(delta_secs(state.total), fmt),

            _ => return None,
        };
        Some(text)
    })
}

/// Render the on-complete text. Only `{title}` is substituted.
pub fn format_complete(template: &str, title: &str) -> String {
    substitute(template, |name, spec| match (name, spec) {
        ("title", None) => Some(title.to_string()),
        _ => None,
    })
}
