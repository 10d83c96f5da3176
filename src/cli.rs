//! Command-line interface: `serve` runs the HTTP service, `remove` processes
//! a single file.

use crate::config::{CoordinateMode, PipelineConfig, ServerConfig};
use crate::processor::BackgroundRemover;
use crate::server::{build_detector, run_server};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;

/// Pose-keypoint background removal service
#[derive(Parser)]
#[command(name = "posecut", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// CLI-facing mirror of [`CoordinateMode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliCoordinateMode {
    /// Keypoints are absolute pixel coordinates
    Absolute,
    /// Keypoints are fractions of width/height
    Normalized,
}

impl From<CliCoordinateMode> for CoordinateMode {
    fn from(mode: CliCoordinateMode) -> Self {
        match mode {
            CliCoordinateMode::Absolute => Self::AbsolutePixels,
            CliCoordinateMode::Normalized => Self::NormalizedFraction,
        }
    }
}

/// Shared pipeline flags for both subcommands
#[derive(Debug, clap::Args)]
struct PipelineArgs {
    /// Path to the pose model (ONNX); omit to run the null detector
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Keypoint coordinate interpretation
    #[arg(long, value_enum, default_value_t = CliCoordinateMode::Normalized)]
    coordinates: CliCoordinateMode,

    /// Blur radius (Gaussian sigma) for mask refinement
    #[arg(long, default_value_t = 10.0)]
    blur_radius: f32,

    /// Binarization threshold (1-255)
    #[arg(long, default_value_t = 128)]
    threshold: u8,

    /// Minimum per-body detection confidence
    #[arg(long, default_value_t = 0.3)]
    score_threshold: f32,
}

impl PipelineArgs {
    fn pipeline_config(&self) -> crate::error::Result<PipelineConfig> {
        PipelineConfig::builder()
            .coordinate_mode(self.coordinates.into())
            .blur_radius(self.blur_radius)
            .threshold(self.threshold)
            .build()
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run the background removal HTTP service
    Serve {
        /// Bind host
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Bind port
        #[arg(short, long, default_value_t = 3005)]
        port: u16,

        /// Directory output PNGs are written under
        #[arg(long, default_value = "images")]
        output_dir: PathBuf,

        /// Prefix for timestamped output filenames
        #[arg(long, default_value = "bg_removed_")]
        output_prefix: String,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Remove the background from a single image file
    Remove {
        /// Input image path
        input: PathBuf,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },
}

/// Parse arguments and dispatch
///
/// # Errors
/// Returns configuration, pipeline, and server errors.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    crate::tracing_config::init_tracing(cli.verbose);

    match cli.command {
        Command::Serve {
            host,
            port,
            output_dir,
            output_prefix,
            pipeline,
        } => {
            let config = ServerConfig {
                host,
                port,
                output_dir,
                output_prefix,
                model_path: pipeline.model.clone(),
                score_threshold: pipeline.score_threshold,
                pipeline: pipeline.pipeline_config()?,
            };
            run_server(config).await.context("server failed")
        },
        Command::Remove {
            input,
            output,
            pipeline,
        } => {
            let detector =
                build_detector(pipeline.model.as_deref(), pipeline.score_threshold)?;
            let remover = BackgroundRemover::new(detector, pipeline.pipeline_config()?)?;

            let bytes = std::fs::read(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let result = remover.process_bytes(&bytes)?;
            result.save_png(&output)?;

            info!(
                input = %input.display(),
                output = %output.display(),
                "background removed"
            );
            println!("Background removed. Output saved to {}", output.display());
            Ok(())
        },
    }
}
