//! Progress parsing for tool output and a logging observer

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::ports::ProgressObserver;
use crate::utils::time::{format_elapsed, parse_clock};

static FFMPEG_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Duration: (\d+:\d\d:\d\d\.\d+),").expect("valid duration regex")
});

static FFMPEG_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"size=\s*\S+.*time=(\d+:\d\d:\d\d\.\d+)").expect("valid time regex")
});

static MKVTOOLNIX_PROGRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Progress: (\d+)%").expect("valid progress regex"));

/// Stateful progress parser for one output stream of one tool run.
///
/// ffmpeg announces the input duration once and then reports the current
/// position; mkvtoolnix prints the percentage directly.
#[derive(Debug, Default)]
pub struct ProgressParser {
    total_seconds: Option<f64>,
    last_percent: Option<u8>,
}

impl ProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one output line; returns a percentage when it changed
    pub fn feed(&mut self, line: &str) -> Option<u8> {
        let percent = self.percent_of(line)?;
        if self.last_percent == Some(percent) {
            return None;
        }
        self.last_percent = Some(percent);
        Some(percent)
    }

    fn percent_of(&mut self, line: &str) -> Option<u8> {
        if let Some(captures) = MKVTOOLNIX_PROGRESS.captures(line) {
            let percent: u32 = captures[1].parse().ok()?;
            return Some(percent.min(100) as u8);
        }

        if let Some(captures) = FFMPEG_DURATION.captures(line) {
            self.total_seconds = parse_clock(&captures[1]).filter(|total| *total > 0.0);
            return None;
        }

        let captures = FFMPEG_TIME.captures(line)?;
        let total = self.total_seconds?;
        let current = parse_clock(&captures[1])?;
        Some(((current / total) * 100.0).clamp(0.0, 100.0) as u8)
    }
}

/// Logs progress at fixed percentage steps
pub struct LogProgress {
    label: String,
    step: u8,
    next: AtomicU8,
}

impl LogProgress {
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_step(label, 25)
    }

    pub fn with_step(label: impl Into<String>, step: u8) -> Self {
        let step = step.clamp(1, 100);
        Self {
            label: label.into(),
            step,
            next: AtomicU8::new(step),
        }
    }
}

impl ProgressObserver for LogProgress {
    fn on_progress(&self, percent: u8) {
        let next = self.next.load(Ordering::Relaxed);
        if percent < next {
            return;
        }

        let reached = percent - percent % self.step;
        self.next
            .store(reached.saturating_add(self.step), Ordering::Relaxed);
        info!("{}: {}%", self.label, reached);
    }

    fn on_finish(&self, elapsed: Duration) {
        info!("{}: finished in {}", self.label, format_elapsed(elapsed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mkvtoolnix_progress() {
        let mut parser = ProgressParser::new();
        assert_eq!(parser.feed("Progress: 0%"), Some(0));
        assert_eq!(parser.feed("Progress: 0%"), None);
        assert_eq!(parser.feed("Progress: 42%"), Some(42));
        assert_eq!(parser.feed("Progress: 100%"), Some(100));
    }

    #[test]
    fn test_ffmpeg_progress_needs_duration() {
        let mut parser = ProgressParser::new();
        let status = "size=    2048kB time=00:00:30.00 bitrate= 559.2kbits/s speed=60x";
        assert_eq!(parser.feed(status), None);

        assert_eq!(
            parser.feed("  Duration: 00:02:00.00, start: 0.000000, bitrate: 768 kb/s"),
            None
        );
        assert_eq!(parser.feed(status), Some(25));
        assert_eq!(
            parser.feed("size=    8192kB time=00:02:00.00 bitrate= 559.2kbits/s"),
            Some(100)
        );
    }

    #[test]
    fn test_unrelated_lines_are_ignored() {
        let mut parser = ProgressParser::new();
        assert_eq!(parser.feed("Stream mapping:"), None);
        assert_eq!(parser.feed("The file is being analyzed."), None);
    }

    #[test]
    fn test_log_progress_steps() {
        let observer = LogProgress::with_step("transcode", 50);
        observer.on_progress(10);
        assert_eq!(observer.next.load(Ordering::Relaxed), 50);
        observer.on_progress(73);
        assert_eq!(observer.next.load(Ordering::Relaxed), 100);
        observer.on_progress(100);
        assert_eq!(observer.next.load(Ordering::Relaxed), 150);
    }
}
