//! ONNX Runtime pose detector for MoveNet-style multipose models
//!
//! The model contract: input `[1, S, S, 3]` RGB, output `[1, N, 56]` where
//! each row is 17 keypoint triplets `(y, x, score)` followed by a bounding
//! box and an overall instance score. Keypoint coordinates are normalized
//! fractions of the input frame, which is why the pipeline defaults to
//! `CoordinateMode::NormalizedFraction`.

use crate::detector::PoseDetector;
use crate::error::{CutoutError, Result};
use crate::types::{Body, DetectionResult, Keypoint};
use image::{imageops::FilterType, DynamicImage};
use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

const KEYPOINTS_PER_BODY: usize = 17;
const VALUES_PER_BODY: usize = KEYPOINTS_PER_BODY * 3 + 5;
const INSTANCE_SCORE_INDEX: usize = VALUES_PER_BODY - 1;

/// ONNX Runtime backed body-pose detector.
///
/// Constructed once at startup and shared across requests; `ort` sessions
/// require exclusive access per run, so invocations serialize on an internal
/// lock.
pub struct OnnxPoseDetector {
    session: Mutex<Session>,
    input_size: u32,
    score_threshold: f32,
    keypoint_threshold: f32,
}

impl OnnxPoseDetector {
    /// Load a multipose model from disk with default thresholds
    ///
    /// # Errors
    /// Returns `Io` when the model file cannot be read and `Detection` when
    /// session construction fails.
    pub fn new<P: AsRef<Path>>(model_path: P, score_threshold: f32) -> Result<Self> {
        Self::with_thresholds(model_path, 256, score_threshold, 0.2)
    }

    /// Load a multipose model with explicit input size and thresholds
    ///
    /// # Errors
    /// Returns `Io` when the model file cannot be read and `Detection` when
    /// session construction fails.
    pub fn with_thresholds<P: AsRef<Path>>(
        model_path: P,
        input_size: u32,
        score_threshold: f32,
        keypoint_threshold: f32,
    ) -> Result<Self> {
        let path = model_path.as_ref();
        let model_data = std::fs::read(path)
            .map_err(|e| CutoutError::file_io_error("read model file", path, e))?;

        let session = Session::builder()
            .map_err(|e| CutoutError::detection(format!("Failed to create session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| CutoutError::detection(format!("Failed to set optimization level: {e}")))?
            .commit_from_memory(&model_data)
            .map_err(|e| CutoutError::detection(format!("Failed to load pose model: {e}")))?;

        info!(
            model = %path.display(),
            input_size,
            score_threshold,
            "pose model loaded"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_size,
            score_threshold,
            keypoint_threshold,
        })
    }

    /// Resize to the model's square input frame and lay pixels out as
    /// `[1, S, S, 3]` RGB. `resize_exact` keeps the mapping between model
    /// output fractions and original-image fractions trivial.
    fn to_input_tensor(&self, image: &DynamicImage) -> Array4<f32> {
        let size = self.input_size;
        let resized = image
            .resize_exact(size, size, FilterType::Triangle)
            .to_rgb8();

        let mut tensor = Array4::<f32>::zeros((1, size as usize, size as usize, 3));
        for (x, y, pixel) in resized.enumerate_pixels() {
            for c in 0..3 {
                tensor[[0, y as usize, x as usize, c]] = f32::from(pixel[c]);
            }
        }
        tensor
    }

    fn parse_output(&self, output: &ndarray::ArrayViewD<'_, f32>) -> Result<DetectionResult> {
        let shape = output.shape();
        if shape.len() != 3 || shape[2] < VALUES_PER_BODY {
            return Err(CutoutError::detection(format!(
                "unexpected pose output shape {shape:?}, expected [1, N, {VALUES_PER_BODY}]"
            )));
        }

        let mut bodies = Vec::new();
        for i in 0..shape[1] {
            let instance_score = output[[0, i, INSTANCE_SCORE_INDEX]];
            if instance_score < self.score_threshold {
                continue;
            }

            let mut keypoints = Vec::with_capacity(KEYPOINTS_PER_BODY);
            for k in 0..KEYPOINTS_PER_BODY {
                let y = output[[0, i, k * 3]];
                let x = output[[0, i, k * 3 + 1]];
                let score = output[[0, i, k * 3 + 2]];
                if score >= self.keypoint_threshold {
                    keypoints.push(Keypoint::new(x, y));
                }
            }
            if !keypoints.is_empty() {
                bodies.push(Body::new(keypoints));
            }
        }

        Ok(DetectionResult::new(bodies))
    }
}

impl PoseDetector for OnnxPoseDetector {
    fn detect(&self, image: &DynamicImage) -> Result<DetectionResult> {
        let tensor = self.to_input_tensor(image);
        let input_value = Value::from_array(tensor)
            .map_err(|e| CutoutError::detection(format!("Failed to convert input tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| CutoutError::detection("pose session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(|e| CutoutError::detection(format!("Pose inference failed: {e}")))?;

        let keys: Vec<_> = outputs.keys().collect();
        let first_key = keys
            .first()
            .ok_or_else(|| CutoutError::detection("pose model produced no outputs"))?;
        let output = outputs
            .get(first_key)
            .ok_or_else(|| CutoutError::detection("first output tensor not found"))?
            .try_extract_array::<f32>()
            .map_err(|e| CutoutError::detection(format!("Failed to extract output tensor: {e}")))?;

        let detection = self.parse_output(&output.view())?;
        debug!(
            bodies = detection.bodies.len(),
            keypoints = detection.keypoint_count(),
            "pose detection complete"
        );
        Ok(detection)
    }

    fn name(&self) -> &str {
        "onnx-multipose"
    }
}
