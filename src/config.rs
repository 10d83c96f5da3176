//! Configuration types for the masking pipeline and the HTTP service

use crate::error::{CutoutError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Interpretation of detector keypoint coordinates.
///
/// Observed pose detectors disagree on this: some emit absolute pixel
/// positions, others emit fractions of the image dimensions. The mode is a
/// fixed, explicit deployment choice and is never inferred from the magnitude
/// of the values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateMode {
    /// Keypoints are absolute pixel coordinates
    AbsolutePixels,
    /// Keypoints are fractions in [0, 1] of width/height
    NormalizedFraction,
}

impl Default for CoordinateMode {
    fn default() -> Self {
        // Matches the detector backend shipped with this crate
        Self::NormalizedFraction
    }
}

impl std::fmt::Display for CoordinateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AbsolutePixels => write!(f, "absolute-pixels"),
            Self::NormalizedFraction => write!(f, "normalized-fraction"),
        }
    }
}

/// Configuration for the mask build/refine/composite pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// How detector keypoint coordinates map to pixels
    pub coordinate_mode: CoordinateMode,

    /// Gaussian blur sigma used to spread each landmark into a soft disc
    pub blur_radius: f32,

    /// Binarization cutoff (of 255) applied after the blur pass
    pub threshold: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            coordinate_mode: CoordinateMode::default(),
            blur_radius: 10.0,
            threshold: 128,
        }
    }
}

impl PipelineConfig {
    /// Create a builder for pipeline configuration
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate configuration parameters
    ///
    /// # Errors
    /// Returns `InvalidConfig` for a non-finite or non-positive blur radius,
    /// or a zero threshold (which would mark every pixel opaque).
    pub fn validate(&self) -> Result<()> {
        if !self.blur_radius.is_finite() || self.blur_radius <= 0.0 {
            return Err(CutoutError::invalid_config(format!(
                "blur_radius must be a positive finite number, got {}",
                self.blur_radius
            )));
        }
        if self.threshold == 0 {
            return Err(CutoutError::invalid_config(
                "threshold must be in 1..=255; 0 would mark every pixel opaque",
            ));
        }
        Ok(())
    }
}

/// Builder for [`PipelineConfig`]
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the coordinate interpretation mode
    #[must_use]
    pub fn coordinate_mode(mut self, mode: CoordinateMode) -> Self {
        self.config.coordinate_mode = mode;
        self
    }

    /// Set the blur radius (Gaussian sigma)
    #[must_use]
    pub fn blur_radius(mut self, radius: f32) -> Self {
        self.config.blur_radius = radius;
        self
    }

    /// Set the binarization threshold
    #[must_use]
    pub fn threshold(mut self, threshold: u8) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// Returns `InvalidConfig` if any parameter fails validation.
    pub fn build(self) -> Result<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration for the HTTP service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Directory output PNGs are written under (created if absent)
    pub output_dir: PathBuf,

    /// Prefix for timestamped output filenames
    pub output_prefix: String,

    /// Path to the pose model; `None` runs the service with the null
    /// detector (every output fully transparent)
    pub model_path: Option<PathBuf>,

    /// Minimum per-body confidence for the ONNX detector
    pub score_threshold: f32,

    /// Pipeline parameters applied to every request
    pub pipeline: PipelineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3005,
            output_dir: PathBuf::from("images"),
            output_prefix: "bg_removed_".to_string(),
            model_path: None,
            score_threshold: 0.3,
            pipeline: PipelineConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pipeline_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.coordinate_mode, CoordinateMode::NormalizedFraction);
        assert!((config.blur_radius - 10.0).abs() < f32::EPSILON);
        assert_eq!(config.threshold, 128);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = PipelineConfig::builder()
            .coordinate_mode(CoordinateMode::AbsolutePixels)
            .blur_radius(4.0)
            .threshold(200)
            .build()
            .unwrap();
        assert_eq!(config.coordinate_mode, CoordinateMode::AbsolutePixels);
        assert!((config.blur_radius - 4.0).abs() < f32::EPSILON);
        assert_eq!(config.threshold, 200);
    }

    #[test]
    fn test_invalid_blur_radius_rejected() {
        for radius in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let result = PipelineConfig::builder().blur_radius(radius).build();
            assert!(matches!(result, Err(CutoutError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let result = PipelineConfig::builder().threshold(0).build();
        assert!(matches!(result, Err(CutoutError::InvalidConfig(_))));
    }

    #[test]
    fn test_coordinate_mode_display() {
        assert_eq!(CoordinateMode::AbsolutePixels.to_string(), "absolute-pixels");
        assert_eq!(
            CoordinateMode::NormalizedFraction.to_string(),
            "normalized-fraction"
        );
    }
}
