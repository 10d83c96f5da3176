//! Destination-in compositing of the refined mask against the original image

use crate::error::{CutoutError, Result};
use crate::types::BinaryMask;
use image::{DynamicImage, RgbaImage};
use tracing::debug;

/// Composite the original image against a refined binary mask.
///
/// Destination-in semantics: the mask supplies the output alpha (0 or 255),
/// the original supplies the color channels unmodified. No soft blending is
/// performed; the mask's binary guarantee carries straight through to the
/// alpha channel.
///
/// # Errors
/// Returns `InvalidDimensions` when image and mask disagree on size. The
/// raster is never silently cropped or stretched to fit.
pub fn composite(image: &DynamicImage, mask: &BinaryMask) -> Result<RgbaImage> {
    let image_dims = (image.width(), image.height());
    if image_dims != mask.dimensions() {
        return Err(CutoutError::dimension_mismatch(
            "composite: image and mask rasters differ",
            image_dims,
            mask.dimensions(),
        ));
    }

    let mut rgba = image.to_rgba8();
    for (pixel, &alpha) in rgba.pixels_mut().zip(mask.data.iter()) {
        pixel[3] = alpha;
    }

    debug!(
        width = image_dims.0,
        height = image_dims.1,
        opaque = mask.opaque_pixels(),
        "composited mask against image"
    );

    Ok(rgba)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid_image(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([rgb[0], rgb[1], rgb[2], 255]),
        ))
    }

    #[test]
    fn test_mask_gates_alpha_and_preserves_color() {
        let image = solid_image(4, 4, [200, 100, 50]);
        let mut mask = BinaryMask::zeroed(4, 4).unwrap();
        mask.set_opaque(1, 2);

        let out = composite(&image, &mask).unwrap();
        let kept = out.get_pixel(1, 2);
        assert_eq!(kept.0, [200, 100, 50, 255]);
        let dropped = out.get_pixel(0, 0);
        assert_eq!(dropped.0[3], 0);
        // Color channels pass through unmodified even where alpha is zero
        assert_eq!(&dropped.0[..3], &[200, 100, 50]);
    }

    #[test]
    fn test_blank_mask_yields_fully_transparent_output() {
        let image = solid_image(8, 6, [1, 2, 3]);
        let mask = BinaryMask::zeroed(8, 6).unwrap();
        let out = composite(&image, &mask).unwrap();
        assert_eq!(out.dimensions(), (8, 6));
        assert!(out.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_dimension_mismatch_is_an_error() {
        let image = solid_image(10, 10, [0, 0, 0]);
        let mask = BinaryMask::zeroed(5, 10).unwrap();
        assert!(matches!(
            composite(&image, &mask),
            Err(CutoutError::InvalidDimensions(_))
        ));

        let mask = BinaryMask::zeroed(10, 11).unwrap();
        assert!(matches!(
            composite(&image, &mask),
            Err(CutoutError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn test_alpha_is_strictly_binary() {
        let image = solid_image(3, 3, [9, 9, 9]);
        let mut mask = BinaryMask::zeroed(3, 3).unwrap();
        mask.set_opaque(0, 0);
        mask.set_opaque(2, 2);
        let out = composite(&image, &mask).unwrap();
        assert!(out.pixels().all(|p| p.0[3] == 0 || p.0[3] == 255));
    }
}
