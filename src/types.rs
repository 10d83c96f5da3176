//! Core data types: keypoints, detection results, binary masks, removal results

use crate::error::{CutoutError, Result};
use image::{GrayImage, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;

/// A single 2-D body landmark produced by the pose detector.
///
/// Interpretation of `x`/`y` (absolute pixels vs. normalized fraction of the
/// image dimensions) is governed by [`crate::config::CoordinateMode`]; the
/// values themselves carry no unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate
    pub y: f32,
}

impl Keypoint {
    /// Create a new keypoint
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One detected body: an ordered list of its landmarks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Landmarks attributed to this body
    pub keypoints: Vec<Keypoint>,
}

impl Body {
    /// Create a body from a list of keypoints
    #[must_use]
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self { keypoints }
    }
}

/// Output of one detector invocation: zero or more bodies in detector order.
///
/// An empty result is valid (nothing in frame) and flows through the pipeline
/// as a fully transparent output, not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Detected bodies; no identity beyond list position
    pub bodies: Vec<Body>,
}

impl DetectionResult {
    /// Create a detection result from a list of bodies
    #[must_use]
    pub fn new(bodies: Vec<Body>) -> Self {
        Self { bodies }
    }

    /// Detection result with no bodies
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Total number of keypoints across all bodies
    #[must_use]
    pub fn keypoint_count(&self) -> usize {
        self.bodies.iter().map(|b| b.keypoints.len()).sum()
    }
}

/// Single-channel binary mask, values restricted to {0, 255}.
///
/// Invariant: `data.len() == width * height`, and dimensions always match the
/// image the mask was built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    /// Row-major mask data, one byte per pixel
    pub data: Vec<u8>,

    /// Mask width in pixels
    pub width: u32,

    /// Mask height in pixels
    pub height: u32,
}

impl BinaryMask {
    /// Create a zero-filled (fully transparent) mask
    ///
    /// # Errors
    /// Returns `InvalidDimensions` if either dimension is zero.
    pub fn zeroed(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CutoutError::InvalidDimensions(format!(
                "mask dimensions must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self {
            data: vec![0; width as usize * height as usize],
            width,
            height,
        })
    }

    /// Mask dimensions as (width, height)
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Mask value at (x, y); caller guarantees in-bounds coordinates
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[self.index(x, y)]
    }

    /// Set the pixel at (x, y) fully opaque
    pub fn set_opaque(&mut self, x: u32, y: u32) {
        let idx = self.index(x, y);
        self.data[idx] = 255;
    }

    /// True if no pixel is lit
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&v| v == 0)
    }

    /// Number of opaque pixels
    #[must_use]
    pub fn opaque_pixels(&self) -> usize {
        self.data.iter().filter(|&&v| v == 255).count()
    }

    /// Convert the mask to a grayscale image
    pub fn to_gray_image(&self) -> Result<GrayImage> {
        GrayImage::from_raw(self.width, self.height, self.data.clone()).ok_or_else(|| {
            CutoutError::InvalidDimensions(format!(
                "mask buffer of {} bytes does not match {}x{}",
                self.data.len(),
                self.width,
                self.height
            ))
        })
    }

    /// Build a mask from a grayscale image, mapping every non-zero value to 255
    #[must_use]
    pub fn from_gray_image(image: &GrayImage) -> Self {
        let (width, height) = image.dimensions();
        let data = image.as_raw().iter().map(|&v| if v > 0 { 255 } else { 0 }).collect();
        Self { data, width, height }
    }
}

/// Result of a full background removal run
#[derive(Debug, Clone)]
pub struct RemovalResult {
    /// Composited image: original colors, mask-gated alpha
    pub image: RgbaImage,

    /// The refined binary mask that gated the alpha channel
    pub mask: BinaryMask,
}

impl RemovalResult {
    /// Create a new removal result
    #[must_use]
    pub fn new(image: RgbaImage, mask: BinaryMask) -> Self {
        Self { image, mask }
    }

    /// Output dimensions as (width, height)
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Encode the composited image as PNG bytes.
    ///
    /// PNG is the only supported container: the output's entire purpose is
    /// transparency, so the encoding must carry an alpha channel.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Save the composited image as PNG with alpha channel
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.image.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}
