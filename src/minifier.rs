//! # Minifier Module
//!
//! The compression capability and the extension table that selects it.
//!
//! ## Components:
//! - `Minifier`: reads one file, writes its minified form to another path
//! - `CommandMinifier`: runs an external CLI (closure compiler, clean-css,
//!   html-minifier, ...) built from a `ToolCommand` template
//! - `MinifierRegistry`: extension -> minifier map; a new format is supported
//!   by registering an entry
//!
//! Minifiers never write over their input themselves. The caller hands them a
//! scratch output path and swaps it in only on success.

use crate::config::{Config, ToolCommand};
use crate::file_manager::FileManager;
use crate::tool_resolver::ToolPathResolver;
use crate::utils::expand_placeholders;
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Something that can minify a single file
pub trait Minifier: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Minify `input`, writing the result to `output`
    fn minify<'a>(&'a self, input: &'a Path, output: &'a Path) -> BoxFuture<'a, Result<()>>;

    /// Whether the minifier can run at all on this machine
    fn is_available(&self) -> bool {
        true
    }
}

/// Minifier backed by an external program
pub struct CommandMinifier {
    command: ToolCommand,
    program_path: Option<PathBuf>,
}

impl CommandMinifier {
    pub fn new(command: ToolCommand, resolver: &ToolPathResolver) -> Self {
        let program_path = resolver.resolve_tool(&command.program);
        Self {
            command,
            program_path,
        }
    }

    async fn run(&self, input: &Path, output: &Path) -> Result<()> {
        let program = self
            .program_path
            .as_deref()
            .unwrap_or_else(|| Path::new(&self.command.program));
        let args = expand_placeholders(&self.command.args, input, output);

        debug!("Running {} {:?}", program.display(), args);

        let result = tokio::process::Command::new(program)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("Failed to execute {}", self.command.program))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            anyhow::bail!(
                "{} exited with {}: {}",
                self.command.program,
                result.status,
                stderr.trim()
            );
        }

        Ok(())
    }
}

impl Minifier for CommandMinifier {
    fn name(&self) -> &str {
        &self.command.program
    }

    fn minify<'a>(&'a self, input: &'a Path, output: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.run(input, output))
    }

    fn is_available(&self) -> bool {
        self.program_path.is_some()
    }
}

/// Static mapping from file extension to minifier
#[derive(Clone, Default)]
pub struct MinifierRegistry {
    by_extension: BTreeMap<String, Arc<dyn Minifier>>,
}

impl MinifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the configured `.js`, `.css` and `.html` commands
    pub fn from_config(config: &Config, resolver: &ToolPathResolver) -> Self {
        let mut registry = Self::new();
        registry.register("js", CommandMinifier::new(config.js_minifier.clone(), resolver));
        registry.register("css", CommandMinifier::new(config.css_minifier.clone(), resolver));
        registry.register("html", CommandMinifier::new(config.html_minifier.clone(), resolver));
        registry
    }

    /// Register (or replace) the minifier for an extension, given without the dot
    pub fn register(&mut self, extension: &str, minifier: impl Minifier + 'static) -> &mut Self {
        self.by_extension
            .insert(extension.to_lowercase(), Arc::new(minifier));
        self
    }

    /// Minifier responsible for `path`, by case-insensitive extension
    pub fn lookup(&self, path: &Path) -> Option<Arc<dyn Minifier>> {
        self.by_extension
            .iter()
            .find(|(ext, _)| FileManager::has_extension(path, ext))
            .map(|(_, minifier)| Arc::clone(minifier))
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.by_extension.keys().map(String::as_str)
    }

    /// Warn about minifiers whose executable cannot be found.
    ///
    /// Not fatal: the affected files fail one by one and the rest proceed.
    pub fn check_dependencies(&self) -> Vec<String> {
        let mut missing = Vec::new();
        for (ext, minifier) in &self.by_extension {
            if !minifier.is_available() {
                warn!(
                    "Minifier for .{} files not found: {} ({})",
                    ext,
                    minifier.name(),
                    ToolPathResolver::install_instructions(minifier.name())
                );
                missing.push(minifier.name().to_string());
            }
        }
        missing
    }
}
