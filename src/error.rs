//! # Error Types Module
//!
//! Error taxonomy for a packaging run.
//!
//! ## Categories:
//! - `Configuration`: bad invocation or config, reported before any side effect
//! - `Structural`: whole-tree failure (clear, create, copy, enumerate), aborts the run
//! - `Compression`: a single file's minifier failed, the run continues
//! - `MissingDependency`: a minifier executable cannot be located
//! - `ConfigFile`: the JSON config file could not be parsed
//!
//! ## Example:
//! ```ignore
//! if destination.is_none() {
//!     return Err(PackError::Configuration("missing destination directory".into()));
//! }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

/// Whole-tree stages of the pipeline that can abort a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    ClearDestination,
    CreateDestination,
    CopyTree,
    EnumerateCandidates,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ClearDestination => "clear destination",
            Self::CreateDestination => "create destination",
            Self::CopyTree => "copy tree",
            Self::EnumerateCandidates => "enumerate candidates",
        };
        f.write_str(label)
    }
}

/// Custom error types for asset packaging
#[derive(thiserror::Error, Debug)]
pub enum PackError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to {stage} at {}: {source}", .path.display())]
    Structural {
        stage: PipelineStage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Compression failed for {}: {reason}", .path.display())]
    Compression { path: PathBuf, reason: String },

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Invalid config file: {0}")]
    ConfigFile(#[from] serde_json::Error),
}

impl PackError {
    pub fn structural(stage: PipelineStage, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Structural {
            stage,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn compression(path: impl AsRef<Path>, cause: &anyhow::Error) -> Self {
        Self::Compression {
            path: path.as_ref().to_path_buf(),
            // {:#} keeps the whole context chain on one line
            reason: format!("{:#}", cause),
        }
    }

    /// Stage that aborted the run, if this is a structural error
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            Self::Structural { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::ConfigFile(_))
    }
}
