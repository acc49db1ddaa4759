//! # Optimizer Module
//!
//! The packaging pipeline, split by responsibility:
//! - `asset_packer`: pipeline driver
//! - `task_compressor`: per-file compression step
//! - `progress_tracker`: per-file console and JSON reporting
//! - `path_resolver`: invocation validation and path joins

pub mod asset_packer;
pub mod path_resolver;
pub mod progress_tracker;
pub mod task_compressor;

pub use asset_packer::AssetPacker;
pub use path_resolver::{PackRequest, PathResolver};
pub use progress_tracker::ProgressTracker;
pub use task_compressor::{FileOutcome, TaskCompressor};
