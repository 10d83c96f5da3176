//! Pose detector backends
//!
//! One backend ships with this crate: an ONNX Runtime detector for
//! MoveNet-style multipose models. Additional backends only need to
//! implement [`crate::detector::PoseDetector`].

#[cfg(feature = "onnx")]
pub mod onnx;

#[cfg(feature = "onnx")]
pub use self::onnx::OnnxPoseDetector;
