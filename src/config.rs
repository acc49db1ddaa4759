//! # Configuration Management Module
//!
//! Holds everything a packaging run can be tuned with.
//!
//! ## Parameters:
//! - `js_minifier`: command used for `.js` files (default: google-closure-compiler)
//! - `css_minifier`: command used for `.css` files (default: cleancss)
//! - `html_minifier`: command used for `.html` files (default: html-minifier)
//! - `json_output`: emit one JSON event per line on stdout (default: false)
//! - `show_progress`: draw a progress bar over the compression pass (default: true)
//!
//! Each command is a program plus an argument template where `{input}` and
//! `{output}` are replaced with absolute paths at run time.
//!
//! ## Example `config.json`:
//! ```json
//! {
//!   "js_minifier": { "program": "terser", "args": ["{input}", "-c", "-m", "-o", "{output}"] },
//!   "css_minifier": { "program": "cleancss", "args": ["-o", "{output}", "{input}"] },
//!   "html_minifier": { "program": "html-minifier", "args": ["--collapse-whitespace", "-o", "{output}", "{input}"] },
//!   "json_output": false,
//!   "show_progress": true
//! }
//! ```

use crate::args;
use crate::error::PackError;
use crate::utils::has_placeholders;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An external program and its argument template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn validate(&self, label: &str) -> Result<(), PackError> {
        if self.program.trim().is_empty() {
            return Err(PackError::Configuration(format!(
                "{} minifier program must not be empty",
                label
            )));
        }
        if !has_placeholders(&self.args) {
            return Err(PackError::Configuration(format!(
                "{} minifier arguments must reference both {{input}} and {{output}}",
                label
            )));
        }
        Ok(())
    }
}

/// Configuration for a packaging run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minifier for `.js` files
    pub js_minifier: ToolCommand,
    /// Minifier for `.css` files
    pub css_minifier: ToolCommand,
    /// Minifier for `.html` files
    pub html_minifier: ToolCommand,
    /// Output progress and results as JSON lines for programmatic use
    pub json_output: bool,
    /// Show a progress bar while compressing
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            js_minifier: ToolCommand::new(
                "google-closure-compiler",
                args!["--js", "{input}", "--js_output_file", "{output}"],
            ),
            css_minifier: ToolCommand::new("cleancss", args!["-o", "{output}", "{input}"]),
            html_minifier: ToolCommand::new(
                "html-minifier",
                args![
                    "--collapse-whitespace",
                    "--remove-comments",
                    "--minify-css",
                    "true",
                    "--minify-js",
                    "true",
                    "-o",
                    "{output}",
                    "{input}",
                ],
            ),
            json_output: false,
            show_progress: true,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), PackError> {
        self.js_minifier.validate("JavaScript")?;
        self.css_minifier.validate("CSS")?;
        self.html_minifier.validate("HTML")?;
        Ok(())
    }

    /// Per-user config location, `<config dir>/asset-packer/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("asset-packer").join("config.json"))
    }

    /// Load configuration from file, falling back to defaults if it is absent
    pub async fn from_file(path: &Path) -> Result<Self, PackError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            PackError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
