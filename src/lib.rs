//! # posecut
//!
//! Background removal driven by body-pose keypoints: an uploaded image is
//! run through a pretrained pose detector, the detected landmarks are
//! rasterized into a sparse binary mask, the mask is grown into a filled
//! region by a blur-then-threshold pass (approximate dilation), and the
//! result is alpha-composited destination-in against the original image.
//! Output is always PNG, since transparency is the whole point.
//!
//! The detector is an opaque collaborator behind the
//! [`detector::PoseDetector`] trait; one handle is built at startup and
//! shared across requests. Keypoint-based masking makes no claim of
//! producing accurate silhouettes.
//!
//! ## Quick start
//!
//! ```rust
//! use posecut::{BackgroundRemover, NullDetector, PipelineConfig};
//! use std::sync::Arc;
//!
//! # fn example() -> posecut::Result<()> {
//! let remover = BackgroundRemover::new(Arc::new(NullDetector), PipelineConfig::default())?;
//! let image = image::DynamicImage::new_rgb8(64, 64);
//! let result = remover.process_image(&image)?;
//! let png = result.to_png_bytes()?;
//! # let _ = png;
//! # Ok(())
//! # }
//! ```
//!
//! ## Service
//!
//! The `serve` subcommand exposes `POST /api/design/remove-background`
//! accepting a multipart upload with an `image` field, and writes the
//! composited PNG under a timestamp-named path in the output directory.
//!
//! ## Feature flags
//!
//! - `onnx` (default): ONNX Runtime pose detector backend
//! - `cli` (default): command-line interface and tracing subscriber setup

pub mod backends;
#[cfg(feature = "cli")]
pub mod cli;
pub mod compositor;
pub mod config;
pub mod detector;
pub mod error;
pub mod mask;
pub mod processor;
pub mod server;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;

pub use config::{CoordinateMode, PipelineConfig, ServerConfig};
pub use detector::{NullDetector, PoseDetector, SharedDetector};
pub use error::{CutoutError, Result};
pub use processor::BackgroundRemover;
pub use types::{BinaryMask, Body, DetectionResult, Keypoint, RemovalResult};

#[cfg(feature = "onnx")]
pub use backends::OnnxPoseDetector;
