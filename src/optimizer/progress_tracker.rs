//! # Progress Tracking Module
//!
//! Reports each finished candidate to the console, the progress bar and,
//! in JSON mode, stdout.

use crate::{
    config::Config,
    error::PackError,
    file_manager::FileManager,
    json_output::JsonMessage,
    optimizer::task_compressor::FileOutcome,
    progress::{format_bytes, format_signed_bytes, AggregateReport, ProgressManager},
};
use std::path::Path;
use tracing::{debug, error, info};

/// Console and JSON reporting for the compression pass
pub struct ProgressTracker {
    pub total_files: usize,
    json_output: bool,
    progress_manager: ProgressManager,
}

impl ProgressTracker {
    pub fn new(total_files: usize, config: &Config) -> Self {
        let show_bar = config.show_progress && !config.json_output;
        Self {
            total_files,
            json_output: config.json_output,
            progress_manager: ProgressManager::new(total_files as u64, show_bar),
        }
    }

    /// Report one candidate's result
    pub async fn handle_file_completion(
        &self,
        relative: &Path,
        file_path: &Path,
        result: &Result<FileOutcome, PackError>,
    ) {
        match result {
            Ok(FileOutcome::Compressed(sample)) => {
                self.progress_manager.suspend(|| {
                    info!(
                        "✨ Compressed: {}, saved {:.2}% ({}), new size {}",
                        file_path.display(),
                        sample.saved_ratio(),
                        format_signed_bytes(sample.saved_bytes()),
                        format_bytes(sample.final_size)
                    )
                });
                if self.json_output {
                    JsonMessage::file_compressed(relative, sample).emit();
                }
                self.progress_manager.update(&format!(
                    "{}: {:.2}% saved",
                    relative.display(),
                    sample.saved_ratio()
                ));
            }
            Ok(FileOutcome::Skipped) => {
                debug!("Skipped {}: no minifier registered", file_path.display());
                self.progress_manager
                    .update(&format!("{}: skipped", relative.display()));
            }
            Err(e) => {
                self.progress_manager.suspend(|| {
                    error!("❌ Error while compressing {}: {}", file_path.display(), e)
                });
                if self.json_output {
                    // Failed files were not replaced, so this is still the original size
                    let original_size = FileManager::file_size(file_path).await.unwrap_or(0);
                    JsonMessage::file_failed(relative, original_size, e.to_string()).emit();
                }
                self.progress_manager
                    .update(&format!("{}: error", relative.display()));
            }
        }
    }

    /// Close the bar and print the final totals
    pub fn finish(&self, report: &AggregateReport) {
        self.progress_manager.finish(&format!(
            "{} compressed, {} failed",
            report.files_compressed, report.files_failed
        ));
        info!("🎉 Compression completed for all files");
        info!("{}", report.format_summary());
        if report.files_failed > 0 {
            error!("{} of {} files could not be compressed", report.files_failed, self.total_files);
        }
    }
}
