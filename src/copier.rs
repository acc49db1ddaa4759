//! # Tree Copier Module
//!
//! Mirrors a source directory into an (empty) destination root.
//!
//! Traversal keeps an explicit frontier of directories still to visit instead
//! of recursing, so very deep trees cannot exhaust the call stack. Every
//! directory is created before anything is copied into it, and the first
//! failure aborts the copy.
//!
//! Symlinks are followed. A directory reachable by two paths is copied at
//! both; only a link back to one of its own ancestors is an error.

use crate::error::{PackError, PipelineStage};
use crate::file_manager::{EntryKind, FileEntry};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// What a finished copy produced
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopySummary {
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
}

/// A directory still to copy, with the canonical paths of the directories
/// above it (itself included)
struct PendingDir {
    relative_path: PathBuf,
    ancestors: Vec<PathBuf>,
}

/// Copies whole directory trees
pub struct TreeCopier;

impl TreeCopier {
    /// Copy everything under `source` into `destination`.
    ///
    /// `destination` must already exist; it is expected to be empty, since no
    /// merge with pre-existing content is attempted.
    pub async fn copy_tree(source: &Path, destination: &Path) -> Result<CopySummary, PackError> {
        let mut summary = CopySummary::default();
        let root = fs::canonicalize(source).await.map_err(|e| copy_error(source, e))?;
        let mut frontier = vec![PendingDir {
            relative_path: PathBuf::new(),
            ancestors: vec![root],
        }];

        while let Some(PendingDir {
            relative_path: relative_dir,
            ancestors,
        }) = frontier.pop()
        {
            let source_dir = source.join(&relative_dir);

            let mut entries = fs::read_dir(&source_dir)
                .await
                .map_err(|e| copy_error(&source_dir, e))?;

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| copy_error(&source_dir, e))?
            {
                let entry = FileEntry {
                    relative_path: relative_dir.join(entry.file_name()),
                    kind: match Self::classify(&entry.path()).await? {
                        Some(kind) => kind,
                        None => continue,
                    },
                };

                if entry.is_file() {
                    summary.bytes += Self::copy_file(source, destination, &entry).await?;
                    summary.files += 1;
                } else {
                    let ancestors = Self::descend(&ancestors, &source.join(&entry.relative_path)).await?;
                    let target = destination.join(&entry.relative_path);
                    fs::create_dir(&target)
                        .await
                        .map_err(|e| copy_error(&target, e))?;
                    summary.directories += 1;
                    frontier.push(PendingDir {
                        relative_path: entry.relative_path,
                        ancestors,
                    });
                }
            }
        }

        debug!(
            "Copied {} files and {} directories ({} bytes)",
            summary.files, summary.directories, summary.bytes
        );
        Ok(summary)
    }

    /// File or directory, following symlinks. `None` for special files.
    async fn classify(path: &Path) -> Result<Option<EntryKind>, PackError> {
        let metadata = fs::metadata(path).await.map_err(|e| copy_error(path, e))?;
        if metadata.is_dir() {
            Ok(Some(EntryKind::Directory))
        } else if metadata.is_file() {
            Ok(Some(EntryKind::File))
        } else {
            warn!("Skipping special file: {}", path.display());
            Ok(None)
        }
    }

    async fn copy_file(source: &Path, destination: &Path, entry: &FileEntry) -> Result<u64, PackError> {
        let from = source.join(&entry.relative_path);
        let to = destination.join(&entry.relative_path);
        fs::copy(&from, &to).await.map_err(|e| copy_error(&from, e))
    }

    /// Ancestor chain for `dir`, or an error if a symlink leads back up the chain
    async fn descend(ancestors: &[PathBuf], dir: &Path) -> Result<Vec<PathBuf>, PackError> {
        let canonical = fs::canonicalize(dir).await.map_err(|e| copy_error(dir, e))?;
        if ancestors.contains(&canonical) {
            return Err(copy_error(
                dir,
                io::Error::new(io::ErrorKind::Other, "directory cycle through symlink"),
            ));
        }
        let mut chain = ancestors.to_vec();
        chain.push(canonical);
        Ok(chain)
    }
}

fn copy_error(path: &Path, source: io::Error) -> PackError {
    PackError::structural(PipelineStage::CopyTree, path, source)
}
