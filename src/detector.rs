//! Pose detector capability
//!
//! The pretrained model is an opaque collaborator behind a narrow trait so
//! the masking and compositing stages can be exercised with synthetic
//! detection fixtures. The service builds one detector at startup and shares
//! it across requests; detector construction is expensive and each `detect`
//! call is stateless.

use crate::error::Result;
use crate::types::DetectionResult;
use image::DynamicImage;
use std::sync::Arc;

/// Narrow interface over a pretrained body-pose model
pub trait PoseDetector: Send + Sync {
    /// Run detection on a decoded image.
    ///
    /// Zero detected bodies is a valid result, not an error.
    ///
    /// # Errors
    /// Returns `Detection` when the underlying model fails.
    fn detect(&self, image: &DynamicImage) -> Result<DetectionResult>;

    /// Human-readable backend name, for logs
    fn name(&self) -> &str;
}

/// Process-wide shared detector handle
pub type SharedDetector = Arc<dyn PoseDetector>;

/// Detector that never finds anything.
///
/// Used when the service runs without a model configured; every request then
/// produces a fully transparent output, which is the documented zero-body
/// behavior of the pipeline.
#[derive(Debug, Default)]
pub struct NullDetector;

impl PoseDetector for NullDetector {
    fn detect(&self, _image: &DynamicImage) -> Result<DetectionResult> {
        Ok(DetectionResult::empty())
    }

    fn name(&self) -> &str {
        "null"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_detector_finds_nothing() {
        let detector = NullDetector;
        let image = DynamicImage::new_rgb8(16, 16);
        let result = detector.detect(&image).unwrap();
        assert!(result.bodies.is_empty());
        assert_eq!(detector.name(), "null");
    }

    #[test]
    fn test_detector_is_object_safe() {
        let detector: SharedDetector = Arc::new(NullDetector);
        let image = DynamicImage::new_rgb8(4, 4);
        assert!(detector.detect(&image).is_ok());
    }
}
