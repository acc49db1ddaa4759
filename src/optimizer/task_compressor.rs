//! # Task Compressor Module
//!
//! Compresses one candidate file: measure, minify, measure.
//!
//! The minifier writes to a scratch file next to the target, which replaces
//! the target by rename only once the minifier succeeded. A failing minifier
//! therefore leaves the copied file exactly as it was.

use crate::{
    error::PackError,
    file_manager::FileManager,
    minifier::{Minifier, MinifierRegistry},
    optimizer::path_resolver::PathResolver,
    progress::SizeSample,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Result of processing one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Compressed(SizeSample),
    /// No minifier registered for the extension
    Skipped,
}

/// Per-file worker for the compression pass
pub struct TaskCompressor {
    registry: MinifierRegistry,
    destination_root: PathBuf,
}

impl TaskCompressor {
    pub fn new(registry: MinifierRegistry, destination_root: PathBuf) -> Self {
        Self {
            registry,
            destination_root,
        }
    }

    /// Compress the file at `relative` under the destination root
    pub async fn compress(&self, relative: &Path) -> Result<FileOutcome, PackError> {
        let file_path = PathResolver::destination_path(&self.destination_root, relative);

        let Some(minifier) = self.registry.lookup(relative) else {
            debug!("No minifier registered for {}", relative.display());
            return Ok(FileOutcome::Skipped);
        };

        self.compress_with(minifier.as_ref(), &file_path)
            .await
            .map(FileOutcome::Compressed)
            .map_err(|e| PackError::compression(&file_path, &e))
    }

    async fn compress_with(&self, minifier: &dyn Minifier, file_path: &Path) -> Result<SizeSample> {
        let starting_size = FileManager::file_size(file_path)
            .await
            .with_context(|| format!("Failed to read size of {}", file_path.display()))?;

        debug!("Minifying {} with {}", file_path.display(), minifier.name());
        Self::minify_in_place(minifier, file_path).await?;

        let final_size = FileManager::file_size(file_path)
            .await
            .with_context(|| format!("Failed to read size of {}", file_path.display()))?;

        Ok(SizeSample::new(starting_size, final_size))
    }

    async fn minify_in_place(minifier: &dyn Minifier, file_path: &Path) -> Result<()> {
        let parent = file_path
            .parent()
            .with_context(|| format!("{} has no parent directory", file_path.display()))?;
        let suffix = file_path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let scratch = tempfile::Builder::new()
            .prefix(".asset-packer-")
            .suffix(&suffix)
            .tempfile_in(parent)
            .context("Failed to create scratch file")?
            .into_temp_path();

        minifier
            .minify(file_path, &scratch)
            .await
            .with_context(|| format!("{} failed", minifier.name()))?;

        // Scratch files are created 0600; keep the copied file's mode
        let permissions = fs::metadata(file_path).await?.permissions();
        fs::set_permissions(&scratch, permissions).await?;

        scratch
            .persist(file_path)
            .map_err(|e| e.error)
            .context("Failed to replace original with minified output")?;
        Ok(())
    }
}
