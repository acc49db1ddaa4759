//! # Tool Path Resolver
//!
//! Finds minifier executables. The default minifiers are npm packages, so
//! besides `PATH` the resolver looks in `node_modules/.bin` of the project
//! being packaged and of the current directory and its ancestors.
//!
//! ## Search order:
//! 1. explicit path (program contains a path separator)
//! 2. `$ASSET_PACKER_TOOLS_DIR`
//! 3. `<project>/node_modules/.bin`
//! 4. `node_modules/.bin` from the current directory upwards (10 levels max)
//! 5. `PATH`

use crate::config::{Config, ToolCommand};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable pointing at a directory of minifier executables
pub const TOOLS_DIR_ENV: &str = "ASSET_PACKER_TOOLS_DIR";

const MAX_PARENT_LEVELS: usize = 10;

/// Tool path resolver for project-local and system-installed minifiers
#[derive(Debug, Clone)]
pub struct ToolPathResolver {
    search_dirs: Vec<PathBuf>,
}

impl ToolPathResolver {
    /// Create a resolver, optionally aware of the project being packaged
    pub fn new(project_dir: Option<&Path>) -> Self {
        let mut search_dirs = Vec::new();

        if let Some(tools_dir) = env::var_os(TOOLS_DIR_ENV) {
            search_dirs.push(PathBuf::from(tools_dir));
        }

        if let Some(project_dir) = project_dir {
            search_dirs.push(project_dir.join("node_modules").join(".bin"));
        }

        if let Ok(current_dir) = env::current_dir() {
            search_dirs.extend(
                current_dir
                    .ancestors()
                    .take(MAX_PARENT_LEVELS)
                    .map(|dir| dir.join("node_modules").join(".bin")),
            );
        }

        if let Some(path) = env::var_os("PATH") {
            search_dirs.extend(env::split_paths(&path));
        }

        search_dirs.retain(|dir| dir.is_dir());
        search_dirs.dedup();
        debug!("Tool search directories: {:?}", search_dirs);

        Self { search_dirs }
    }

    /// Resolver over an explicit list of directories only
    pub fn with_search_dirs(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }

    /// Resolve the path to a specific tool
    pub fn resolve_tool(&self, program: &str) -> Option<PathBuf> {
        let as_path = Path::new(program);
        if as_path.components().count() > 1 {
            return Self::with_platform_suffixes(as_path)
                .into_iter()
                .find(|candidate| candidate.is_file());
        }

        let found = self.search_dirs.iter().find_map(|dir| {
            Self::with_platform_suffixes(&dir.join(program))
                .into_iter()
                .find(|candidate| candidate.is_file())
        });

        match &found {
            Some(path) => debug!("Resolved tool {} -> {}", program, path.display()),
            None => debug!("Tool not found: {}", program),
        }
        found
    }

    /// Check if a specific tool is available
    pub fn is_tool_available(&self, program: &str) -> bool {
        self.resolve_tool(program).is_some()
    }

    /// npm installs `.cmd` shims on Windows
    fn with_platform_suffixes(path: &Path) -> Vec<PathBuf> {
        if cfg!(windows) {
            let mut candidates = vec![path.to_path_buf()];
            for suffix in ["cmd", "exe", "bat"] {
                candidates.push(path.with_extension(suffix));
            }
            candidates
        } else {
            vec![path.to_path_buf()]
        }
    }

    /// Report of the configured minifiers and where they resolve
    pub fn get_tools_report(&self, config: &Config) -> String {
        let mut report = String::from("Minifier availability:\n");

        let tools: [(&str, &ToolCommand); 3] = [
            ("JavaScript", &config.js_minifier),
            ("CSS", &config.css_minifier),
            ("HTML", &config.html_minifier),
        ];

        for (label, command) in tools {
            match self.resolve_tool(&command.program) {
                Some(path) => report.push_str(&format!(
                    "  ✅ {:<10} {} -> {}\n",
                    label,
                    command.program,
                    path.display()
                )),
                None => report.push_str(&format!(
                    "  ❌ {:<10} {} (install with: {})\n",
                    label,
                    command.program,
                    Self::install_instructions(&command.program)
                )),
            }
        }

        report
    }

    /// Installation hint for the well-known minifier CLIs
    pub fn install_instructions(program: &str) -> String {
        match program {
            "google-closure-compiler" => "npm install --save-dev google-closure-compiler".to_string(),
            "cleancss" => "npm install --save-dev clean-css-cli".to_string(),
            "html-minifier" => "npm install --save-dev html-minifier".to_string(),
            "html-minifier-terser" => "npm install --save-dev html-minifier-terser".to_string(),
            "terser" => "npm install --save-dev terser".to_string(),
            "uglifyjs" => "npm install --save-dev uglify-js".to_string(),
            "esbuild" => "npm install --save-dev esbuild".to_string(),
            _ => format!("make sure '{}' is on PATH", program),
        }
    }
}
