//! Shared configuration types for countdown-to
//!
//! These are the global defaults a host persists between sessions. Every
//! field can be overridden per block; absent fields in a stored settings
//! file fall back to the built-in defaults below.

pub mod formatting;

use serde::{Deserialize, Serialize};

/// Lower bound for the real-time update interval, in seconds
pub const MIN_UPDATE_INTERVAL_SECS: u64 = 1;
/// Upper bound for the real-time update interval (one day), in seconds
pub const MAX_UPDATE_INTERVAL_SECS: u64 = 86_400;

pub const DEFAULT_BAR_COLOR: &str = "#4CAF50";
pub const DEFAULT_TRAIL_COLOR: &str = "#e0e0e0";
pub const DEFAULT_ON_COMPLETE_TEXT: &str = "Completed!";
pub const DEFAULT_INFO_FORMAT: &str = "{percent}% - {remaining} remaining";
pub const DEFAULT_INFO_FORMAT_UPCOMING: &str = "Starts in {remaining}";

// ─────────────────────────────────────────────────────────────────────────────
// Keyword enums
// ─────────────────────────────────────────────────────────────────────────────

/// Shape of the visual indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BarType {
    #[default]
    Line,
    Circle,
    SemiCircle,
    Square,
}

impl BarType {
    /// Parse a block keyword (case-insensitive). Returns `None` for unknown shapes.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "line" => Some(Self::Line),
            "circle" => Some(Self::Circle),
            "semicircle" => Some(Self::SemiCircle),
            "square" => Some(Self::Square),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Line => "Line",
            Self::Circle => "Circle",
            Self::SemiCircle => "SemiCircle",
            Self::Square => "Square",
        }
    }
}

/// Direction the bar moves as time passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressType {
    /// Bar fills from empty to full
    #[default]
    #[serde(alias = "Forward")]
    Forward,
    /// Bar drains from full to empty
    #[serde(alias = "Countdown")]
    Countdown,
}

impl ProgressType {
    /// Parse a block keyword (case-insensitive). Returns `None` for unknown types.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "forward" => Some(Self::Forward),
            "countdown" => Some(Self::Countdown),
            _ => None,
        }
    }

    /// Map a progress fraction to the value handed to the visual bar.
    ///
    /// Forward bars move in whole-percent steps; countdown bars drain smoothly.
    pub fn bar_value(self, fraction: f64) -> f64 {
        let fraction = fraction.clamp(0.0, 1.0);
        match self {
            Self::Forward => (fraction * 100.0).floor() / 100.0,
            Self::Countdown => 1.0 - fraction,
        }
    }
}

/// Rounding applied to every field of a duration breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationRounding {
    #[default]
    Floor,
    Ceil,
}

impl DurationRounding {
    #[inline]
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Floor => value.floor(),
            Self::Ceil => value.ceil(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Global defaults for every per-block override key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub default_bar_type: BarType,
    pub default_bar_color: String,
    pub default_trail_color: String,
    pub default_progress_type: ProgressType,
    pub default_on_complete_text: String,
    pub default_info_format: String,
    pub default_info_format_upcoming: String,
    pub default_update_in_real_time: bool,
    pub default_update_interval_seconds: u64,
    pub duration_rounding: DurationRounding,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_bar_type: BarType::Line,
            default_bar_color: DEFAULT_BAR_COLOR.to_string(),
            default_trail_color: DEFAULT_TRAIL_COLOR.to_string(),
            default_progress_type: ProgressType::Forward,
            default_on_complete_text: DEFAULT_ON_COMPLETE_TEXT.to_string(),
            default_info_format: DEFAULT_INFO_FORMAT.to_string(),
            default_info_format_upcoming: DEFAULT_INFO_FORMAT_UPCOMING.to_string(),
            default_update_in_real_time: true,
            default_update_interval_seconds: 1,
            duration_rounding: DurationRounding::Floor,
        }
    }
}

impl Settings {
    /// Global update interval, clamped to
    /// [`MIN_UPDATE_INTERVAL_SECS`]..=[`MAX_UPDATE_INTERVAL_SECS`]
    pub fn update_interval_secs(&self) -> u64 {
        self.default_update_interval_seconds
            .clamp(MIN_UPDATE_INTERVAL_SECS, MAX_UPDATE_INTERVAL_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_type_keywords() {
        assert_eq!(BarType::from_keyword("line"), Some(BarType::Line));
        assert_eq!(BarType::from_keyword("Circle"), Some(BarType::Circle));
        assert_eq!(BarType::from_keyword("SEMICIRCLE"), Some(BarType::SemiCircle));
        assert_eq!(BarType::from_keyword(" square "), Some(BarType::Square));
        assert_eq!(BarType::from_keyword("hexagon"), None);
    }

    #[test]
    fn test_progress_type_keywords() {
        assert_eq!(ProgressType::from_keyword("Countdown"), Some(ProgressType::Countdown));
        assert_eq!(ProgressType::from_keyword("forward"), Some(ProgressType::Forward));
        assert_eq!(ProgressType::from_keyword("backward"), None);
    }

    #[test]
    fn test_bar_value() {
        assert_eq!(ProgressType::Forward.bar_value(0.5), 0.5);
        assert_eq!(ProgressType::Forward.bar_value(0.129), 0.12);
        assert_eq!(ProgressType::Countdown.bar_value(0.25), 0.75);
        assert_eq!(ProgressType::Countdown.bar_value(1.5), 0.0);
    }

    #[test]
    fn test_settings_toml_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_settings_toml_partial() {
        let toml = r##"
default_bar_type = "Circle"
default_progress_type = "Countdown"
default_update_interval_seconds = 0
duration_rounding = "ceil"
"##;

        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(settings.default_bar_type, BarType::Circle);
        assert_eq!(settings.default_progress_type, ProgressType::Countdown);
        assert_eq!(settings.duration_rounding, DurationRounding::Ceil);
        assert_eq!(settings.default_bar_color, DEFAULT_BAR_COLOR);
        assert_eq!(settings.update_interval_secs(), MIN_UPDATE_INTERVAL_SECS);
    }

    #[test]
    fn test_update_interval_clamped_to_a_day() {
        let settings = Settings {
            default_update_interval_seconds: u64::MAX,
            ..Settings::default()
        };
        assert_eq!(settings.update_interval_secs(), MAX_UPDATE_INTERVAL_SECS);
    }

    #[test]
    fn test_settings_toml_roundtrip() {
        let settings = Settings {
            default_on_complete_text: "{title} is done".to_string(),
            default_update_in_real_time: false,
            ..Settings::default()
        };
        let text = toml::to_string_pretty(&settings).unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }
}
