//! # Asset Packer Library
//!
//! Copies a web project to a build directory, then minifies its HTML, JS and
//! CSS files in place and reports the bytes saved.
//!
//! ## Modules:
//! - `config`: configuration, minifier commands, validation
//! - `error`: error taxonomy (configuration, structural, per-file compression)
//! - `file_manager`: directory walking, candidate discovery, destination reset
//! - `copier`: recursive tree copy
//! - `minifier`: `Minifier` capability and the extension registry
//! - `tool_resolver`: locating minifier executables
//! - `optimizer`: pipeline driver and per-file worker
//! - `progress`: size accounting and progress bar
//! - `json_output`: machine-readable events
//!
//! ## Usage:
//! ```ignore
//! use asset_packer::{AssetPacker, Config, PackRequest};
//!
//! let request = PackRequest::new(Some("site".into()), Some("dist".into()))?;
//! let report = AssetPacker::from_config(Config::default(), &request).run(&request).await?;
//! println!("{}", report.format_summary());
//! ```

pub mod config;
pub mod copier;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod minifier;
pub mod optimizer;
pub mod progress;
pub mod tool_resolver;
pub mod utils;

pub use config::{Config, ToolCommand};
pub use error::{PackError, PipelineStage};
pub use minifier::{CommandMinifier, Minifier, MinifierRegistry};
pub use optimizer::{AssetPacker, PackRequest};
pub use progress::{format_bytes, saved_ratio, AggregateReport, SizeSample};
