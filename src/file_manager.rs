//! # File Management Module
//!
//! Directory walking and the small filesystem operations the pipeline needs.
//!
//! ## Operations:
//! - `walk_entries()`: lazy, recursive walk yielding every file and directory
//! - `find_candidate_files()`: relative paths of `.html`/`.js`/`.css` files
//! - `is_candidate()`: case-insensitive extension check
//! - `file_size()`: current byte length of a file
//! - `reset_destination()`: wipe and recreate the output root
//!
//! Walk errors are never skipped: an unreadable directory or entry ends the
//! walk with a structural error.
//!
//! ## Example:
//! ```ignore
//! for rel in FileManager::find_candidate_files(&dist)? {
//!     println!("{}", rel.display());
//! }
//! ```

use crate::error::{PackError, PipelineStage};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

/// Extensions eligible for minification, lowercase and without the dot
pub const CANDIDATE_EXTENSIONS: &[&str] = &["html", "js", "css"];

/// Kind of a walked entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A path relative to the walked root plus its kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub relative_path: PathBuf,
    pub kind: EntryKind,
}

impl FileEntry {
    pub fn file(relative_path: impl Into<PathBuf>) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: EntryKind::File,
        }
    }

    pub fn directory(relative_path: impl Into<PathBuf>) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: EntryKind::Directory,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Manages file discovery and destination housekeeping
pub struct FileManager;

impl FileManager {
    /// Walk `root` recursively, yielding each regular file and directory below it.
    ///
    /// The root itself is not yielded. Order follows directory listing order,
    /// parents before their contents. Symlinks are followed; anything that is
    /// neither a regular file nor a directory is left out.
    pub fn walk_entries(root: &Path) -> impl Iterator<Item = Result<FileEntry, PackError>> + '_ {
        WalkDir::new(root)
            .min_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    let relative = entry
                        .path()
                        .strip_prefix(root)
                        .unwrap_or_else(|_| entry.path())
                        .to_path_buf();
                    if file_type.is_dir() {
                        Some(Ok(FileEntry::directory(relative)))
                    } else if file_type.is_file() {
                        Some(Ok(FileEntry::file(relative)))
                    } else {
                        None
                    }
                }
                Err(err) => {
                    let path = err.path().unwrap_or(root).to_path_buf();
                    let source = io::Error::from(err);
                    Some(Err(PackError::structural(
                        PipelineStage::EnumerateCandidates,
                        path,
                        source,
                    )))
                }
            })
    }

    /// Find every minification candidate under `root`, as paths relative to it
    pub fn find_candidate_files(root: &Path) -> Result<Vec<PathBuf>, PackError> {
        let mut files = Vec::new();

        for entry in Self::walk_entries(root) {
            let entry = entry?;
            if entry.is_file() && Self::is_candidate(&entry.relative_path) {
                files.push(entry.relative_path);
            }
        }

        debug!("Found {} candidate files under {}", files.len(), root.display());
        Ok(files)
    }

    /// Check if a file's name makes it a minification candidate
    pub fn is_candidate(path: &Path) -> bool {
        CANDIDATE_EXTENSIONS
            .iter()
            .any(|ext| Self::has_extension(path, ext))
    }

    /// Case-insensitive `*.ext` match on the file name
    pub fn has_extension(path: &Path, ext: &str) -> bool {
        path.file_name()
            .map(|name| {
                let suffix = format!(".{}", ext.to_lowercase());
                name.to_string_lossy().to_lowercase().ends_with(&suffix)
            })
            .unwrap_or(false)
    }

    /// Current size of a file in bytes
    pub async fn file_size(path: &Path) -> io::Result<u64> {
        Ok(fs::metadata(path).await?.len())
    }

    /// Remove `destination` if present, then recreate it empty
    pub async fn reset_destination(destination: &Path) -> Result<(), PackError> {
        match fs::remove_dir_all(destination).await {
            Ok(()) => debug!("Removed previous destination {}", destination.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(PackError::structural(
                    PipelineStage::ClearDestination,
                    destination,
                    e,
                ))
            }
        }

        fs::create_dir_all(destination)
            .await
            .map_err(|e| PackError::structural(PipelineStage::CreateDestination, destination, e))
    }
}
