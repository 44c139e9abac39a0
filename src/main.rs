// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use depth_segmenter::Config;
use depth_segmenter::constants::DepthRange;
use std::path::PathBuf;
use tracing::warn;

mod cli;

#[derive(Parser)]
#[command(name = "depth-segmenter")]
#[command(about = "Interactive region segmentation for depth sensor streams")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Replay a 16-bit grayscale PNG of millimeter depths instead of the
    /// synthetic sensor
    #[arg(long, global = true)]
    depth: Option<PathBuf>,

    /// Color image to overlay, used together with --depth
    #[arg(long, global = true, requires = "depth")]
    color: Option<PathBuf>,

    /// Region tolerance in millimeters (overrides the config file)
    #[arg(short, long, global = true)]
    tolerance: Option<u32>,

    /// Use the near depth range (400-3000 mm)
    #[arg(long, global = true)]
    near: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive terminal viewer (default)
    View,

    /// Process frames without a display and print pipeline statistics
    Headless {
        /// Number of depth frames to feed
        #[arg(short = 'n', long, default_value = "100")]
        frames: u64,

        /// Seed point as X,Y (default: frame center)
        #[arg(long, value_parser = cli::parse_seed)]
        seed: Option<(u32, u32)>,

        /// Save the last composited frame as PNG
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=depth_segmenter=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });
    if let Some(tolerance) = cli.tolerance {
        config.tolerance = tolerance;
    }
    if cli.near {
        config.depth_range = DepthRange::Near;
    }

    match cli.command {
        Some(Commands::Config { save }) => cli::show_config(&config, save),
        Some(Commands::Headless {
            frames,
            seed,
            output,
        }) => {
            let source = cli::open_source(&config, cli.depth.as_deref(), cli.color.as_deref())?;
            cli::run_headless(source, &config, frames, seed, output.as_deref())
        }
        Some(Commands::View) | None => {
            let source = cli::open_source(&config, cli.depth.as_deref(), cli.color.as_deref())?;
            depth_segmenter::terminal::run(source, &config)
        }
    }
}
