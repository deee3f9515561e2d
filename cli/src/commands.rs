use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use countdown_core::scheduler::ERROR_PREFIX;
use countdown_core::settings;
use countdown_core::{Block, Clock, Settings, SystemClock, params};

use crate::document::{self, CodeBlock};
use crate::terminal::TerminalSink;

pub fn read_document(path: &Path) -> Result<Vec<CodeBlock>, String> {
    let markdown = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    Ok(document::extract_blocks(&markdown))
}

/// `notes.md:12` style label for a block
pub fn block_label(path: &Path, block: &CodeBlock) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    format!("{}:{}", name, block.line)
}

/// Load from an explicit file, or from the default location
pub fn load_settings(config: Option<&Path>) -> Result<Settings, String> {
    match config {
        Some(path) => settings::load_settings_from(path).map_err(|e| e.to_string()),
        None => Ok(settings::load_settings()),
    }
}

pub fn config_path(config: Option<&Path>) -> Result<PathBuf, String> {
    match config {
        Some(path) => Ok(path.to_path_buf()),
        None => settings::settings_path().map_err(|e| e.to_string()),
    }
}

/// Render every block once at `at` (default: now)
pub fn render(path: &Path, at: Option<NaiveDateTime>, settings: &Settings) -> Result<(), String> {
    let blocks = read_document(path)?;
    if blocks.is_empty() {
        println!("No countdown blocks in {}", path.display());
        return Ok(());
    }

    let now = at.unwrap_or_else(|| SystemClock.now());
    for block in &blocks {
        let sink = TerminalSink::new(block_label(path, block), std::io::stdout());
        render_source(&block.source, settings, now, &sink);
    }
    Ok(())
}

/// Render one block source into `sink`, errors included
pub fn render_source(
    source: &str,
    settings: &Settings,
    now: NaiveDateTime,
    sink: &dyn countdown_core::ProgressSink,
) {
    match Block::prepare(source, settings, now) {
        Ok(block) => {
            block.render(now, sink);
        }
        Err(e) => sink.set_error_text(&format!("{}{}", ERROR_PREFIX, e)),
    }
}

/// Validate every block, reporting each one. Fails if any block is invalid.
pub fn check(path: &Path, at: Option<NaiveDateTime>) -> Result<(), String> {
    let blocks = read_document(path)?;
    let now = at.unwrap_or_else(|| SystemClock.now());

    let mut failed = 0;
    for block in &blocks {
        let label = block_label(path, block);
        match params::parse_at(&block.source, now).and_then(|p| p.interval(now)) {
            Ok(interval) => println!("ok    {}  {} .. {}", label, interval.start(), interval.end()),
            Err(e) => {
                failed += 1;
                println!("error {}  {}", label, e);
            }
        }
    }

    println!("{} block(s) checked, {} invalid", blocks.len(), failed);
    if failed > 0 {
        return Err(format!("{} invalid countdown block(s)", failed));
    }
    Ok(())
}

pub fn show_settings(settings: &Settings) -> Result<(), String> {
    let text = toml::to_string_pretty(settings).map_err(|e| e.to_string())?;
    print!("{}", text);
    Ok(())
}

pub fn reset_settings(config: Option<&Path>) -> Result<(), String> {
    let defaults = Settings::default();
    let result = match config {
        Some(path) => settings::save_settings_to(path, &defaults),
        None => settings::save_settings(&defaults),
    };
    result.map_err(|e| e.to_string())?;
    println!("Settings reset to defaults");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn test_block_label() {
        let block = CodeBlock {
            line: 12,
            language: "countdown-to".to_string(),
            source: String::new(),
        };
        assert_eq!(block_label(Path::new("/tmp/notes.md"), &block), "notes.md:12");
    }

    #[test]
    fn test_render_source() {
        let sink = TerminalSink::new("a", Vec::new());
        render_source(
            "startDate: 2025-01-01\nendDate: 2025-01-02\ninfoFormat: {percent}%",
            &Settings::default(),
            at("2025-01-01T06:00:00"),
            &sink,
        );
        assert!(sink.contents().ends_with(" 25%\n"));
    }

    #[test]
    fn test_render_source_error() {
        let sink = TerminalSink::new("a", Vec::new());
        render_source("endDate: 2025-01-02", &Settings::default(), at("2025-01-01T06:00:00"), &sink);
        assert_eq!(
            sink.contents(),
            "[a] Error rendering countdown: Start date or start time is required\n"
        );
    }

    #[test]
    fn test_legacy_block_needs_explicit_start() {
        let blocks = document::extract_blocks("```progressbar\nendDate: 2030-01-01\n```\n");
        let sink = TerminalSink::new("legacy", Vec::new());
        render_source(&blocks[0].source, &Settings::default(), at("2025-01-01T06:00:00"), &sink);
        assert_eq!(
            sink.contents(),
            "[legacy] Error rendering countdown: Start date or start time is required\n"
        );
    }
}
