//! Pipeline orchestration: decode, detect, build, refine, composite

use crate::compositor::composite;
use crate::config::PipelineConfig;
use crate::detector::SharedDetector;
use crate::error::Result;
use crate::mask::{build_mask, refine_mask};
use crate::types::RemovalResult;
use image::DynamicImage;
use std::time::Instant;
use tracing::{debug, info};

/// Runs the full background removal pipeline against a shared detector.
///
/// The processor itself is stateless per call: identical inputs and
/// configuration produce byte-identical masks and alpha channels.
pub struct BackgroundRemover {
    detector: SharedDetector,
    config: PipelineConfig,
}

impl BackgroundRemover {
    /// Create a new remover over a shared detector
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the pipeline configuration fails validation.
    pub fn new(detector: SharedDetector, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { detector, config })
    }

    /// Pipeline configuration in effect
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Remove the background from encoded image bytes
    ///
    /// # Errors
    /// Returns `Image` when the bytes do not decode, and any error of
    /// [`Self::process_image`] afterwards.
    pub fn process_bytes(&self, bytes: &[u8]) -> Result<RemovalResult> {
        let decode_start = Instant::now();
        let image = image::load_from_memory(bytes)?;
        debug!(
            width = image.width(),
            height = image.height(),
            bytes = bytes.len(),
            decode_ms = decode_start.elapsed().as_millis() as u64,
            "decoded upload"
        );
        self.process_image(&image)
    }

    /// Remove the background from a decoded image.
    ///
    /// A detection with zero bodies is valid and yields a fully transparent
    /// output of the same dimensions.
    ///
    /// # Errors
    /// - `Detection` when the detector call fails
    /// - `InvalidDimensions` on an internal stage contract violation
    pub fn process_image(&self, image: &DynamicImage) -> Result<RemovalResult> {
        let total_start = Instant::now();
        let (width, height) = (image.width(), image.height());

        let detection = self.detector.detect(image)?;
        debug!(
            detector = self.detector.name(),
            bodies = detection.bodies.len(),
            keypoints = detection.keypoint_count(),
            "detection complete"
        );

        let sparse = build_mask(&detection, width, height, self.config.coordinate_mode)?;
        let refined = refine_mask(&sparse, self.config.blur_radius, self.config.threshold)?;
        let composited = composite(image, &refined)?;

        info!(
            width,
            height,
            bodies = detection.bodies.len(),
            opaque = refined.opaque_pixels(),
            total_ms = total_start.elapsed().as_millis() as u64,
            "background removal complete"
        );

        Ok(RemovalResult::new(composited, refined))
    }
}
