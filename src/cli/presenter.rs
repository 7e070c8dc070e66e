//! CLI presenter for output formatting
//!
//! Status lines go to stderr; anything a script might capture (paths,
//! durations, config values, session rows) goes to stdout.

use std::time::Duration as StdDuration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::ForwardStage;
use crate::domain::recording::SessionStatus;
use crate::infrastructure::persistence::SessionRecord;

const SPINNER_TICK: StdDuration = StdDuration::from_millis(80);
const BAR_WIDTH: usize = 20;

/// Leading glyph of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Info,
    Success,
    Warn,
    Error,
}

impl Mark {
    fn glyph(self) -> ColoredString {
        match self {
            Self::Info => "ℹ".cyan(),
            Self::Success => "✓".green(),
            Self::Warn => "⚠".yellow(),
            Self::Error => "✗".red(),
        }
    }
}

/// Presenter for CLI output formatting
#[derive(Default)]
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_spinner(&mut self, message: &str) {
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let spinner = ProgressBar::new_spinner().with_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(SPINNER_TICK);
        self.spinner = Some(spinner);
    }

    /// Shared handle for updates from callbacks
    pub fn spinner_handle(&self) -> Option<ProgressBar> {
        self.spinner.clone()
    }

    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    pub fn spinner_success(&mut self, message: &str) {
        self.finish_spinner(Mark::Success, message);
    }

    pub fn spinner_fail(&mut self, message: &str) {
        self.finish_spinner(Mark::Error, message);
    }

    fn finish_spinner(&mut self, mark: Mark, message: &str) {
        match self.spinner.take() {
            Some(spinner) => spinner.finish_with_message(format!("{} {}", mark.glyph(), message)),
            None => self.line(mark, message),
        }
    }

    /// Status line on stderr
    pub fn line(&self, mark: Mark, message: &str) {
        eprintln!("{} {}", mark.glyph(), message);
    }

    pub fn info(&self, message: &str) {
        self.line(Mark::Info, message);
    }

    pub fn success(&self, message: &str) {
        self.line(Mark::Success, message);
    }

    pub fn warn(&self, message: &str) {
        self.line(Mark::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.line(Mark::Error, message);
    }

    /// Machine-readable result on stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Bar plus `elapsed / limit` and the time left before the message limit
    pub fn format_progress(&self, elapsed_secs: u64, limit_secs: u64) -> String {
        let filled = if limit_secs == 0 {
            0
        } else {
            (elapsed_secs.min(limit_secs) as usize * BAR_WIDTH) / limit_secs as usize
        };
        let remaining = limit_secs.saturating_sub(elapsed_secs);

        format!(
            "[{}{}] {} / {} ({} left)",
            "█".repeat(filled).cyan(),
            "░".repeat(BAR_WIDTH - filled),
            clock(elapsed_secs),
            clock(limit_secs),
            clock(remaining)
        )
    }

    pub fn update_recording_progress(&self, elapsed_secs: u64, limit_secs: u64) {
        let progress = self.format_progress(elapsed_secs, limit_secs);
        self.update_spinner(&format!("Recording {}", progress));
    }

    pub fn stage_message(stage: ForwardStage) -> &'static str {
        match stage {
            ForwardStage::Fetching => "Fetching original message...",
            ForwardStage::Composing => "Composing preamble and message...",
            ForwardStage::Validating => "Checking playback...",
            ForwardStage::Uploading => "Uploading...",
        }
    }

    pub fn format_session_row(record: &SessionRecord) -> String {
        let status = record.status.to_string();
        let status = match record.status {
            SessionStatus::Recording => status.red(),
            SessionStatus::Paused => status.yellow(),
            SessionStatus::Stopped => status.green(),
            SessionStatus::Idle => status.normal(),
        };
        let noun = if record.segment_count == 1 { "segment" } else { "segments" };
        format!(
            "{}  {:<9} {:>5}  {:>3} {:<8}  {}",
            record.id.as_str().cyan(),
            status,
            clock(record.elapsed_secs),
            record.segment_count,
            noun,
            record.codec
        )
    }

    /// One line per checkpointed session
    pub fn session_row(&self, record: &SessionRecord) {
        self.output(&Self::format_session_row(record));
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }
}

/// `m:ss`
fn clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recording::{Codec, SessionId};

    #[test]
    fn clock_pads_seconds() {
        assert_eq!(clock(0), "0:00");
        assert_eq!(clock(65), "1:05");
        assert_eq!(clock(300), "5:00");
    }

    #[test]
    fn progress_at_start_shows_full_limit_left() {
        let progress = Presenter::new().format_progress(0, 60);
        assert!(progress.contains("0:00 / 1:00 (1:00 left)"));
    }

    #[test]
    fn progress_past_limit_saturates() {
        let progress = Presenter::new().format_progress(75, 60);
        assert!(progress.contains("1:15 / 1:00 (0:00 left)"));
        assert!(!progress.contains('░'));
    }

    #[test]
    fn progress_with_zero_limit_has_empty_bar() {
        let progress = Presenter::new().format_progress(3, 0);
        assert!(progress.contains(&"░".repeat(BAR_WIDTH)));
    }

    #[test]
    fn session_row_lists_id_elapsed_and_segment_count() {
        colored::control::set_override(false);
        let record = SessionRecord {
            id: SessionId::new("abc"),
            status: SessionStatus::Stopped,
            elapsed_secs: 95,
            codec: Codec::wav(),
            segment_count: 1,
            updated_at: 0,
        };
        let row = Presenter::format_session_row(&record);
        assert!(row.starts_with("abc  stopped"));
        assert!(row.contains("1:35"));
        assert!(row.contains("1 segment "));
        assert!(row.ends_with("audio/wav"));
    }

    #[test]
    fn every_stage_has_a_message() {
        for stage in [
            ForwardStage::Fetching,
            ForwardStage::Composing,
            ForwardStage::Validating,
            ForwardStage::Uploading,
        ] {
            assert!(Presenter::stage_message(stage).ends_with("..."));
        }
    }
}
