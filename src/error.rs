//! Error types for the background removal pipeline

use thiserror::Error;

/// Result type alias for background removal operations
pub type Result<T> = std::result::Result<T, CutoutError>;

/// Error types for the keypoint masking pipeline and its HTTP surface
#[derive(Error, Debug)]
pub enum CutoutError {
    /// No image file was provided with the request
    #[error("No image file uploaded")]
    MissingInput,

    /// Stage contract violation: mask and image rasters disagree on size.
    /// Indicates a pipeline bug, not bad input.
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// The pose detector failed or returned an unusable result
    #[error("Detection error: {0}")]
    Detection(String),

    /// Image decode/encode errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Filesystem read/write/delete errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CutoutError {
    /// Create a new detection error
    pub fn detection<S: Into<String>>(msg: S) -> Self {
        Self::Detection(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a dimension-mismatch error between two rasters
    pub fn dimension_mismatch(
        context: &str,
        expected: (u32, u32),
        actual: (u32, u32),
    ) -> Self {
        Self::InvalidDimensions(format!(
            "{context}: expected {}x{}, got {}x{}",
            expected.0, expected.1, actual.0, actual.1
        ))
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {operation} '{path_display}': {error}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CutoutError::MissingInput;
        assert_eq!(err.to_string(), "No image file uploaded");

        let err = CutoutError::detection("model produced no outputs");
        assert_eq!(err.to_string(), "Detection error: model produced no outputs");
    }

    #[test]
    fn test_dimension_mismatch_context() {
        let err = CutoutError::dimension_mismatch("composite", (100, 100), (50, 50));
        let msg = err.to_string();
        assert!(msg.contains("composite"));
        assert!(msg.contains("expected 100x100"));
        assert!(msg.contains("got 50x50"));
    }

    #[test]
    fn test_file_io_error_context() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = CutoutError::file_io_error("read upload", std::path::Path::new("/tmp/upload"), io_error);
        let msg = err.to_string();
        assert!(msg.contains("read upload"));
        assert!(msg.contains("/tmp/upload"));
    }
}
