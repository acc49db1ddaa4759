//! # Asset Packer - Main Entry Point
//!
//! ## Flow:
//! 1. Parse CLI arguments
//! 2. Set up `tracing` (INFO, DEBUG with `--verbose`, `RUST_LOG` overrides)
//! 3. Load the config file and apply flag overrides
//! 4. Validate the two paths, then run the pipeline
//!
//! ## Example:
//! ```bash
//! asset-packer ./site ./dist --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use asset_packer::tool_resolver::ToolPathResolver;
use asset_packer::{AssetPacker, Config, MinifierRegistry, PackError, PackRequest};

#[derive(Parser)]
#[command(name = "asset-packer")]
#[command(about = "Copy a web project and minify its HTML, JS and CSS files")]
struct Args {
    /// Project directory to package
    project_directory: Option<PathBuf>,

    /// Destination directory (deleted and recreated on every run)
    destination_directory: Option<PathBuf>,

    /// Config file (default: <config dir>/asset-packer/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit JSON events on stdout
    #[arg(long)]
    json: bool,

    /// Don't draw a progress bar
    #[arg(long)]
    no_progress: bool,

    /// Print which minifiers are installed, then exit (non-zero if any is missing)
    #[arg(long)]
    check_tools: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; stderr keeps stdout free for --json
    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = load_config(args.config.as_deref()).await?;
    config.json_output |= args.json;
    config.show_progress &= !args.no_progress;

    if args.check_tools {
        let resolver = ToolPathResolver::new(args.project_directory.as_deref());
        print!("{}", resolver.get_tools_report(&config));
        let missing = MinifierRegistry::from_config(&config, &resolver).check_dependencies();
        if !missing.is_empty() {
            return Err(PackError::MissingDependency(missing.join(", ")).into());
        }
        return Ok(());
    }

    let request = match PackRequest::new(args.project_directory, args.destination_directory) {
        Ok(request) => request,
        Err(e) => {
            AssetPacker::report_failure(&e, config.json_output);
            return Err(e.into());
        }
    };

    let packer = AssetPacker::from_config(config, &request);
    packer.run(&request).await?;

    Ok(())
}

async fn load_config(explicit: Option<&std::path::Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                warn!("Config file {} not found, using defaults", path.display());
            }
            path.to_path_buf()
        }
        None => match Config::default_path() {
            Some(path) => path,
            None => return Ok(Config::default()),
        },
    };

    let config = Config::from_file(&path).await?;
    if path.exists() {
        info!("Loaded config from {}", path.display());
    }
    Ok(config)
}
