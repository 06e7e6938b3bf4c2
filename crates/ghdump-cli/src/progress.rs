//! Phase progress display with progress bars.

use ghdump_core::ProgressObserver;
use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar for one pipeline phase (loading, writing)
///
/// Bars draw on stderr, so they never mix into a dump on stdout.
pub struct PhaseProgress {
    bar: ProgressBar,
}

impl PhaseProgress {
    /// Create a progress bar labelled `label`
    #[must_use]
    pub fn new(total_bytes: u64, label: &str) -> Self {
        let bar = ProgressBar::new(total_bytes);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg}: {spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        bar.set_message(label.to_string());

        Self { bar }
    }

    /// Finish and leave the bar on screen
    pub fn finish(&self) {
        self.bar.finish();
    }

    /// Abandon the progress bar (for errors)
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

impl ProgressObserver for PhaseProgress {
    fn start(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
    }

    fn advance(&self, delta: u64, _done: u64) {
        self.bar.inc(delta);
    }
}

/// Format bytes in human-readable format
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{size:.2} {}", UNITS[unit_idx])
}

/// Format a byte rate in human-readable format
#[must_use]
pub fn format_rate(bytes_per_sec: u64) -> String {
    format!("{}/s", format_bytes(bytes_per_sec))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0.00 B");
        assert_eq!(format_bytes(512), "512.00 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.00 MB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00 GB");
        assert_eq!(format_bytes(1024_u64.pow(4)), "1.00 TB");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(1024), "1.00 KB/s");
        assert_eq!(format_rate(1_500_000), "1.43 MB/s");
    }

    #[test]
    fn test_observer_drives_bar() {
        let progress = PhaseProgress {
            bar: ProgressBar::hidden(),
        };
        progress.start(100);
        progress.advance(40, 40);
        progress.advance(60, 100);
        assert_eq!(progress.bar.position(), 100);
        assert_eq!(progress.bar.length(), Some(100));
    }
}
