//! Darkroom - folder-watching daemon that normalizes images in place.
//!
//! Darkroom scans a folder once, then watches it for new image files. Every
//! file is resized to fit a maximum bounding box and HEIC/HEIF arrivals are
//! converted to JPEG, all in place. Runs until interrupted.
//!
//! # Usage
//!
//! ```bash
//! # Watch the configured root (defaults to ~/Pictures)
//! darkroom
//!
//! # Watch a specific folder
//! darkroom /mnt/photoframe/pictures
//!
//! # Use an explicit config file
//! darkroom --config /etc/darkroom.toml
//! ```

use std::path::PathBuf;

use clap::Parser;

mod logging;

/// Darkroom - watch a folder and normalize incoming images in place.
#[derive(Parser, Debug)]
#[command(name = "darkroom")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Folder to watch (overrides the configured root)
    root: Option<PathBuf>,

    /// Path to a config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let load_result = match &cli.config {
        Some(path) => darkroom_core::Config::load_from(path),
        None => darkroom_core::Config::load(),
    };
    let mut config = match load_result {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration."
            );
            darkroom_core::Config::default()
        }
    };
    if let Some(root) = &cli.root {
        config.watch.root = root.display().to_string();
    }

    logging::init(&config.logging, cli.verbose, cli.json_logs);
    tracing::debug!("Darkroom v{}", darkroom_core::VERSION);

    darkroom_core::Darkroom::new(config).run().await?;
    Ok(())
}
