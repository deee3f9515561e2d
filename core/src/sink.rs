//! Output seam between the scheduler and the host's visual layer

use countdown_types::BarType;

/// Anything that can draw a progress value in `[0, 1]`.
///
/// The visual bar library sits behind this one method; the core never
/// learns how the value is drawn.
pub trait ProgressBar: Send + Sync {
    fn set(&self, value: f64);
}

/// Presentation values passed through untouched from the block/settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appearance {
    pub bar_type: BarType,
    pub color: String,
    pub trail_color: String,
}

/// Where one mounted instance renders.
///
/// Implementations use interior mutability; ticks call these from the
/// runtime while the host keeps its own handle.
pub trait ProgressSink: Send + Sync {
    fn set_progress(&self, value: f64);
    fn set_info_text(&self, text: &str);
    fn set_error_text(&self, text: &str);
    fn set_title(&self, text: &str);

    /// Bar shape and colors, sent once per mount
    fn set_appearance(&self, _appearance: &Appearance) {}
}

/// Adapter that routes `set_progress` to a [`ProgressBar`] and discards text.
///
/// Handy for hosts that draw text themselves and only hand the core a bar.
pub struct BarSink<B> {
    bar: B,
}

impl<B: ProgressBar> BarSink<B> {
    pub fn new(bar: B) -> Self {
        Self { bar }
    }

    pub fn bar(&self) -> &B {
        &self.bar
    }
}

impl<B: ProgressBar> ProgressSink for BarSink<B> {
    fn set_progress(&self, value: f64) {
        self.bar.set(value);
    }

    fn set_info_text(&self, _text: &str) {}

    fn set_error_text(&self, text: &str) {
        tracing::debug!(error = text, "Bar-only sink dropped error text");
    }

    fn set_title(&self, _text: &str) {}
}
