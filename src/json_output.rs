//! # JSON Output Module
//!
//! Structured events on stdout for callers driving the packer from a build
//! script. One JSON object per line, tagged by `type`.
//!
//! ## Message types:
//! - `start`: run begins
//! - `copied`: the copy pass finished
//! - `file_complete`: one candidate was compressed (or failed)
//! - `complete`: final totals
//! - `error`: fatal error, the run ended early

use crate::copier::CopySummary;
use crate::error::PackError;
use crate::progress::{AggregateReport, SizeSample};
use serde::{Deserialize, Serialize};
use std::error::Error as _;
use std::path::{Path, PathBuf};

/// JSON event emitted during a run
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    Start {
        source: PathBuf,
        destination: PathBuf,
    },

    Copied {
        files: usize,
        directories: usize,
        bytes: u64,
    },

    FileComplete {
        path: PathBuf,
        original_size: u64,
        final_size: u64,
        saved_ratio: f64,
        error: Option<String>,
    },

    Complete {
        files_compressed: usize,
        files_failed: usize,
        total_starting_size: u64,
        total_final_size: u64,
        saved_ratio: f64,
        duration_seconds: f64,
    },

    Error {
        message: String,
        details: Option<String>,
    },
}

impl JsonMessage {
    /// Write the message as one line on stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(source: &Path, destination: &Path) -> Self {
        Self::Start {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
        }
    }

    pub fn copied(summary: &CopySummary) -> Self {
        Self::Copied {
            files: summary.files,
            directories: summary.directories,
            bytes: summary.bytes,
        }
    }

    pub fn file_compressed(path: &Path, sample: &SizeSample) -> Self {
        Self::FileComplete {
            path: path.to_path_buf(),
            original_size: sample.starting_size,
            final_size: sample.final_size,
            saved_ratio: sample.saved_ratio(),
            error: None,
        }
    }

    /// A failed file keeps its original size on both sides
    pub fn file_failed(path: &Path, original_size: u64, error: String) -> Self {
        Self::FileComplete {
            path: path.to_path_buf(),
            original_size,
            final_size: original_size,
            saved_ratio: 0.0,
            error: Some(error),
        }
    }

    pub fn complete(report: &AggregateReport, duration_seconds: f64) -> Self {
        Self::Complete {
            files_compressed: report.files_compressed,
            files_failed: report.files_failed,
            total_starting_size: report.total_starting_size,
            total_final_size: report.total_final_size,
            saved_ratio: report.saved_ratio(),
            duration_seconds,
        }
    }

    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }

    /// `error` event for a fatal `PackError`, with its io cause as details
    pub fn failure(error: &PackError) -> Self {
        Self::error(error.to_string(), error.source().map(|source| source.to_string()))
    }
}
