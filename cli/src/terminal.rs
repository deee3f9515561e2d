//! Text rendering of a mounted countdown
//!
//! One status line is written per frame:
//!
//! ```text
//! [block 1] Launch [██████████░░░░░░░░░░] 50% - 12 hours 0 minutes 0 seconds remaining
//! ```

use std::io::Write;
use std::sync::Mutex;

use countdown_core::{Appearance, BarType, ProgressSink};

const BAR_WIDTH: usize = 20;
const PIE: [char; 5] = ['○', '◔', '◑', '◕', '●'];

/// Draw `value` in `[0, 1]` for the given bar shape
pub fn draw_bar(bar_type: BarType, value: f64) -> String {
    let value = value.clamp(0.0, 1.0);
    match bar_type {
        BarType::Line => cells(value, BAR_WIDTH, '█', '░'),
        BarType::Square => cells(value, BAR_WIDTH / 2, '■', '□'),
        BarType::SemiCircle => cells(value, BAR_WIDTH / 2, '◗', '◌'),
        BarType::Circle => {
            let idx = (value * (PIE.len() - 1) as f64).floor() as usize;
            PIE[idx.min(PIE.len() - 1)].to_string()
        }
    }
}

fn cells(value: f64, width: usize, filled: char, empty: char) -> String {
    let n = ((value * width as f64).floor() as usize).min(width);
    let mut out = String::with_capacity(width + 2);
    out.push('[');
    out.extend(std::iter::repeat_n(filled, n));
    out.extend(std::iter::repeat_n(empty, width - n));
    out.push(']');
    out
}

#[derive(Debug, Default)]
struct LineState {
    bar_type: BarType,
    title: Option<String>,
    progress: f64,
}

/// [`ProgressSink`] that writes one line per rendered frame
pub struct TerminalSink<W> {
    label: String,
    state: Mutex<LineState>,
    out: Mutex<W>,
}

impl<W: Write + Send> TerminalSink<W> {
    pub fn new(label: impl Into<String>, out: W) -> Self {
        Self {
            label: label.into(),
            state: Mutex::new(LineState::default()),
            out: Mutex::new(out),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, LineState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn write_line(&self, line: &str) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writeln!(out, "[{}] {}", self.label, line).and_then(|_| out.flush()) {
            tracing::warn!(label = %self.label, error = %e, "Failed to write frame");
        }
    }
}

impl TerminalSink<Vec<u8>> {
    pub fn contents(&self) -> String {
        let out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&out).into_owned()
    }
}

impl<W: Write + Send> ProgressSink for TerminalSink<W> {
    fn set_progress(&self, value: f64) {
        self.state().progress = value;
    }

    fn set_info_text(&self, text: &str) {
        let line = {
            let state = self.state();
            let bar = draw_bar(state.bar_type, state.progress);
            match state.title.as_deref() {
                Some(title) => format!("{} {} {}", title, bar, text),
                None => format!("{} {}", bar, text),
            }
        };
        self.write_line(&line);
    }

    fn set_error_text(&self, text: &str) {
        self.write_line(text);
    }

    fn set_title(&self, text: &str) {
        self.state().title = Some(text.to_string());
    }

    fn set_appearance(&self, appearance: &Appearance) {
        self.state().bar_type = appearance.bar_type;
    }
}
