// SPDX-License-Identifier: GPL-3.0-only

use camera_ask::{Config, ConfigOverrides};
use camera_ask::constants::{APP_ID, TERMINAL_LOG_FILE_NAME};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Mutex;

mod cli;

#[derive(Parser)]
#[command(name = "camera-ask")]
#[command(about = "Take a picture and ask an inference service what it shows")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    /// Config file (default: ~/.config/camera-ask/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Inference endpoint URL (overrides the config file)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Capture quality between 0 and 1 (overrides the config file)
    #[arg(long, global = true)]
    quality: Option<f32>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run in terminal mode (default)
    Terminal {
        /// Camera index to use (from 'camera-ask list')
        #[arg(short, long)]
        camera: Option<usize>,

        /// Use an image file instead of a camera
        #[arg(short, long)]
        image: Option<PathBuf>,
    },

    /// List available cameras
    List,

    /// Take one picture, upload it and print the answer
    Ask {
        /// Camera index to use (from 'camera-ask list')
        #[arg(short, long)]
        camera: Option<usize>,

        /// Use an image file instead of a camera
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Terminal { .. }));

    init_logging(interactive)?;

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let (camera_index, image) = match &cli.command {
        Some(Commands::Terminal { camera, image } | Commands::Ask { camera, image }) => {
            (*camera, image.clone())
        }
        None | Some(Commands::List) => (None, None),
    };
    config.apply(ConfigOverrides {
        endpoint: cli.endpoint,
        capture_quality: cli.quality,
        camera_index,
    });

    match cli.command {
        None | Some(Commands::Terminal { .. }) => {
            camera_ask::terminal::run(&config, image.as_deref())
        }
        Some(Commands::List) => cli::list_cameras(),
        Some(Commands::Ask { .. }) => cli::ask(&config, image),
    }
}

/// Initialize logging
///
/// Set RUST_LOG environment variable to control log level
/// Examples: RUST_LOG=debug, RUST_LOG=camera_ask=debug, RUST_LOG=info
///
/// Terminal mode owns the screen, so its logs go to a file in the cache directory.
fn init_logging(interactive: bool) -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true);

    if !interactive {
        builder.with_writer(std::io::stderr).init();
        return Ok(());
    }

    match dirs::cache_dir() {
        Some(dir) => {
            let dir = dir.join(APP_ID);
            std::fs::create_dir_all(&dir)?;
            let file = std::fs::File::create(dir.join(TERMINAL_LOG_FILE_NAME))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => builder.with_writer(std::io::sink).init(),
    }

    Ok(())
}
