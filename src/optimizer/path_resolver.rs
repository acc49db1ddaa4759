//! # Path Resolution Module
//!
//! Turns the two command-line paths into a validated `PackRequest`.
//! All checks run before anything on disk is touched.

use crate::error::PackError;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validated source and destination roots, both absolute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl PackRequest {
    /// Validate the invocation.
    ///
    /// Fails with `PackError::Configuration` when an argument is missing, the
    /// source is not a directory, or the two trees overlap.
    pub fn new(source: Option<PathBuf>, destination: Option<PathBuf>) -> Result<Self, PackError> {
        let (source, destination) = match (source, destination) {
            (Some(source), Some(destination)) => (source, destination),
            (None, Some(_)) => return Err(missing("project directory")),
            (Some(_), None) => return Err(missing("destination directory")),
            (None, None) => return Err(missing("project directory and destination directory")),
        };

        if !source.is_dir() {
            return Err(PackError::Configuration(format!(
                "project directory does not exist or is not a directory: {}",
                source.display()
            )));
        }

        let source = PathResolver::resolve(&source).map_err(|e| resolve_error(&source, e))?;
        let destination =
            PathResolver::resolve(&destination).map_err(|e| resolve_error(&destination, e))?;
        debug!("Resolved request: {} -> {}", source.display(), destination.display());

        if destination.starts_with(&source) {
            return Err(PackError::Configuration(format!(
                "destination {} must not be the project directory or inside it",
                destination.display()
            )));
        }
        if source.starts_with(&destination) {
            return Err(PackError::Configuration(format!(
                "destination {} contains the project directory and would be wiped with it",
                destination.display()
            )));
        }

        Ok(Self {
            source,
            destination,
        })
    }
}

fn missing(what: &str) -> PackError {
    PackError::Configuration(format!(
        "please provide both the project directory and the destination directory (missing {})",
        what
    ))
}

fn resolve_error(path: &Path, e: io::Error) -> PackError {
    PackError::Configuration(format!("cannot resolve {}: {}", path.display(), e))
}

/// Path arithmetic shared by the pipeline
pub struct PathResolver;

impl PathResolver {
    /// Absolute, symlink-free form of `path`, which need not exist yet.
    ///
    /// The deepest existing ancestor is canonicalized and the missing
    /// components are appended unchanged.
    pub fn resolve(path: &Path) -> io::Result<PathBuf> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };

        let mut existing = absolute.as_path();
        let mut missing_components = Vec::new();
        loop {
            if let Ok(canonical) = existing.canonicalize() {
                let mut resolved = canonical;
                for component in missing_components.iter().rev() {
                    resolved.push(component);
                }
                return Ok(resolved);
            }
            match (existing.parent(), existing.file_name()) {
                (Some(parent), Some(name)) => {
                    missing_components.push(name.to_os_string());
                    existing = parent;
                }
                _ => return Ok(absolute),
            }
        }
    }

    /// Absolute location of a walked file inside the destination root
    pub fn destination_path(destination_root: &Path, relative: &Path) -> PathBuf {
        destination_root.join(relative)
    }
}
