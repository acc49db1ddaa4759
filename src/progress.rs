//! # Progress Tracking and Statistics Module
//!
//! Size accounting and the progress bar for the compression pass.
//!
//! ## Components:
//! - `SizeSample`: one file's size before and after compression
//! - `AggregateReport`: running totals folded file by file
//! - `format_bytes()` / `saved_ratio()`: pure reporting helpers
//! - `ProgressManager`: `indicatif` bar, hidden when not wanted
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:03] [=========================>--------------] 12/18 (66%) js/app.js: 41.27% saved
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Human-readable size with 1024 steps and two decimals; `0` is `"0 B"`
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    // floor(log1024(bytes)) from the position of the highest set bit
    let exponent = (((u64::BITS - 1 - bytes.leading_zeros()) / 10) as usize).min(UNITS.len() - 1);
    let scaled = bytes as f64 / 1024f64.powi(exponent as i32);
    format!("{:.2} {}", scaled, UNITS[exponent])
}

/// Like `format_bytes`, with a leading `-` for growth
pub fn format_signed_bytes(bytes: i128) -> String {
    let magnitude = format_bytes(bytes.unsigned_abs().min(u64::MAX as u128) as u64);
    if bytes < 0 {
        format!("-{}", magnitude)
    } else {
        magnitude
    }
}

/// Percentage saved, `100 * (1 - final/start)`, rounded to two decimals.
///
/// Zero when `starting_size` is zero; negative when the file grew.
pub fn saved_ratio(starting_size: u64, final_size: u64) -> f64 {
    if starting_size == 0 {
        return 0.0;
    }
    let ratio = 100.0 * (1.0 - final_size as f64 / starting_size as f64);
    (ratio * 100.0).round() / 100.0
}

/// Size of one file before and after compression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeSample {
    pub starting_size: u64,
    pub final_size: u64,
}

impl SizeSample {
    pub fn new(starting_size: u64, final_size: u64) -> Self {
        Self {
            starting_size,
            final_size,
        }
    }

    pub fn saved_ratio(&self) -> f64 {
        saved_ratio(self.starting_size, self.final_size)
    }

    /// Bytes saved; negative if the minifier grew the file
    pub fn saved_bytes(&self) -> i128 {
        self.starting_size as i128 - self.final_size as i128
    }
}

/// Totals across every successfully compressed file of a run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AggregateReport {
    pub total_starting_size: u64,
    pub total_final_size: u64,
    pub files_compressed: usize,
    pub files_failed: usize,
    pub files_skipped: usize,
}

impl AggregateReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_compressed(&mut self, sample: SizeSample) {
        self.files_compressed += 1;
        self.total_starting_size += sample.starting_size;
        self.total_final_size += sample.final_size;
    }

    /// Failed files stay out of the size totals
    pub fn add_failed(&mut self) {
        self.files_failed += 1;
    }

    pub fn add_skipped(&mut self) {
        self.files_skipped += 1;
    }

    pub fn files_processed(&self) -> usize {
        self.files_compressed + self.files_failed + self.files_skipped
    }

    pub fn saved_ratio(&self) -> f64 {
        saved_ratio(self.total_starting_size, self.total_final_size)
    }

    pub fn saved_bytes(&self) -> i128 {
        self.total_starting_size as i128 - self.total_final_size as i128
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Total saved: {:.2}%, saved size: {}, new total size: {}, original total size: {}",
            self.saved_ratio(),
            format_signed_bytes(self.saved_bytes()),
            format_bytes(self.total_final_size),
            format_bytes(self.total_starting_size),
        )
    }
}

/// Manages the progress bar over the compression pass
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager; a disabled one draws nothing
    pub fn new(total_files: u64, enabled: bool) -> Self {
        if !enabled || total_files == 0 {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new(total_files);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Advance by one file with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Run `f` with the bar temporarily cleared, so log lines don't tear it
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1), "1.00 B");
        assert_eq!(format_bytes(1023), "1023.00 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1048576), "1.00 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.00 GB");
        assert_eq!(format_bytes(u64::MAX), "16.00 EB");
    }

    #[test]
    fn test_format_signed_bytes() {
        assert_eq!(format_signed_bytes(0), "0 B");
        assert_eq!(format_signed_bytes(2048), "2.00 KB");
        assert_eq!(format_signed_bytes(-512), "-512.00 B");
    }

    #[test]
    fn test_saved_ratio() {
        assert_eq!(saved_ratio(1000, 250), 75.00);
        assert_eq!(format!("{:.2}", saved_ratio(1000, 250)), "75.00");
        assert_eq!(saved_ratio(3, 2), 33.33);
        assert_eq!(saved_ratio(100, 100), 0.0);
        assert_eq!(saved_ratio(100, 150), -50.0);
        assert_eq!(saved_ratio(0, 0), 0.0);
    }

    #[test]
    fn test_aggregate_report_folds_samples() {
        let mut report = AggregateReport::new();
        report.add_compressed(SizeSample::new(100, 40));
        report.add_compressed(SizeSample::new(200, 60));
        report.add_failed();
        report.add_skipped();

        assert_eq!(report.total_starting_size, 300);
        assert_eq!(report.total_final_size, 100);
        assert_eq!(report.files_compressed, 2);
        assert_eq!(report.files_failed, 1);
        assert_eq!(report.files_processed(), 4);
        assert_eq!(report.saved_ratio(), 66.67);
        assert_eq!(report.saved_bytes(), 200);

        let summary = report.format_summary();
        assert!(summary.contains("66.67%"));
        assert!(summary.contains("saved size: 200.00 B"));
        assert!(summary.contains("original total size: 300.00 B"));
    }

    #[test]
    fn test_empty_report() {
        let report = AggregateReport::new();
        assert_eq!(report.saved_ratio(), 0.0);
        assert!(report.format_summary().contains("0.00%"));
    }

    #[test]
    fn test_size_sample_growth() {
        let sample = SizeSample::new(10, 12);
        assert_eq!(sample.saved_bytes(), -2);
        assert_eq!(sample.saved_ratio(), -20.0);
    }

    #[test]
    fn test_hidden_progress_manager() {
        let progress = ProgressManager::new(10, false);
        progress.update("a.js: 10.00% saved");
        progress.finish("done");
    }
}
