//! Mask construction and refinement
//!
//! The detector yields point landmarks, not a silhouette, so the mask is
//! built intentionally sparse (one lit pixel per keypoint) and density is
//! recovered afterwards by approximating morphological dilation with a
//! blur-then-threshold pass.

use crate::config::CoordinateMode;
use crate::error::{CutoutError, Result};
use crate::types::{BinaryMask, DetectionResult, Keypoint};
use image::{imageops, ImageBuffer, Luma};
use tracing::debug;

type GrayF32 = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Map a keypoint to integer pixel coordinates, or `None` if it falls
/// outside `[0, width) x [0, height)` or is not finite.
fn map_keypoint(
    keypoint: Keypoint,
    width: u32,
    height: u32,
    mode: CoordinateMode,
) -> Option<(u32, u32)> {
    let (fx, fy) = match mode {
        CoordinateMode::AbsolutePixels => (keypoint.x, keypoint.y),
        CoordinateMode::NormalizedFraction => {
            (keypoint.x * width as f32, keypoint.y * height as f32)
        },
    };
    if !fx.is_finite() || !fy.is_finite() {
        return None;
    }
    let x = fx.floor();
    let y = fy.floor();
    if x < 0.0 || y < 0.0 || x >= width as f32 || y >= height as f32 {
        return None;
    }
    Some((x as u32, y as u32))
}

/// Build a sparse binary mask from a detection result: one opaque pixel per
/// in-bounds keypoint, union over all bodies.
///
/// Out-of-bounds keypoints are discarded, never written. The coordinate
/// interpretation is the caller's fixed configuration choice; it is not
/// guessed from value magnitudes.
///
/// # Errors
/// Returns `InvalidDimensions` if either target dimension is zero.
pub fn build_mask(
    detection: &DetectionResult,
    width: u32,
    height: u32,
    mode: CoordinateMode,
) -> Result<BinaryMask> {
    let mut mask = BinaryMask::zeroed(width, height)?;

    let mut skipped = 0usize;
    for body in &detection.bodies {
        for &keypoint in &body.keypoints {
            match map_keypoint(keypoint, width, height, mode) {
                Some((x, y)) => mask.set_opaque(x, y),
                None => skipped += 1,
            }
        }
    }

    debug!(
        bodies = detection.bodies.len(),
        keypoints = detection.keypoint_count(),
        skipped,
        lit = mask.opaque_pixels(),
        mode = %mode,
        "built sparse keypoint mask"
    );

    Ok(mask)
}

/// Refine a sparse mask into a filled region: Gaussian blur spreads every
/// lit point into a soft disc, then a hard threshold binarizes the result.
///
/// The blur runs in f32 and the cutoff is taken as `threshold`/255 of the
/// blurred peak value. An isolated landmark blurred with a large sigma peaks
/// far below 255, so an absolute cutoff would erase it entirely; scaling the
/// cutoff to the peak keeps the dilation approximation working for sparse
/// masks while agreeing with the absolute cutoff on dense ones.
///
/// An all-zero input yields an all-zero output of identical dimensions; this
/// is a valid outcome (nothing detected), not an error.
///
/// # Errors
/// Returns `InvalidConfig` for a non-finite or non-positive blur radius.
pub fn refine_mask(mask: &BinaryMask, blur_radius: f32, threshold: u8) -> Result<BinaryMask> {
    if !blur_radius.is_finite() || blur_radius <= 0.0 {
        return Err(CutoutError::invalid_config(format!(
            "blur radius must be a positive finite number, got {blur_radius}"
        )));
    }

    if mask.is_blank() {
        // Blurring zeros yields zeros; skip the filter pass
        return Ok(mask.clone());
    }

    let float: GrayF32 = ImageBuffer::from_raw(
        mask.width,
        mask.height,
        mask.data.iter().map(|&v| f32::from(v)).collect(),
    )
    .ok_or_else(|| {
        CutoutError::InvalidDimensions(format!(
            "mask buffer of {} bytes does not match {}x{}",
            mask.data.len(),
            mask.width,
            mask.height
        ))
    })?;

    let blurred = imageops::blur(&float, blur_radius);
    // The blur preserves the raster dimensions; the binary output must too
    debug_assert_eq!(blurred.dimensions(), (mask.width, mask.height));

    let peak = blurred.as_raw().iter().fold(0.0_f32, |acc, &v| acc.max(v));
    if peak <= 0.0 {
        return BinaryMask::zeroed(mask.width, mask.height);
    }

    let cutoff = peak * (f32::from(threshold) / 255.0);
    let data = blurred
        .as_raw()
        .iter()
        .map(|&v| if v >= cutoff { 255 } else { 0 })
        .collect();

    let refined = BinaryMask {
        data,
        width: mask.width,
        height: mask.height,
    };

    debug!(
        sigma = blur_radius,
        threshold,
        lit = refined.opaque_pixels(),
        "refined mask"
    );

    Ok(refined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Body;

    fn single_point(x: f32, y: f32) -> DetectionResult {
        DetectionResult::new(vec![Body::new(vec![Keypoint::new(x, y)])])
    }

    #[test]
    fn test_absolute_keypoint_lights_exact_pixel() {
        let mask = build_mask(
            &single_point(50.0, 50.0),
            100,
            100,
            CoordinateMode::AbsolutePixels,
        )
        .unwrap();
        assert_eq!(mask.get(50, 50), 255);
        assert_eq!(mask.opaque_pixels(), 1);
    }

    #[test]
    fn test_normalized_keypoint_maps_by_dimension() {
        let mask = build_mask(
            &single_point(0.5, 0.25),
            200,
            100,
            CoordinateMode::NormalizedFraction,
        )
        .unwrap();
        assert_eq!(mask.get(100, 25), 255);
        assert_eq!(mask.opaque_pixels(), 1);
    }

    #[test]
    fn test_truncation_not_rounding() {
        let mask = build_mask(
            &single_point(10.9, 20.9),
            100,
            100,
            CoordinateMode::AbsolutePixels,
        )
        .unwrap();
        assert_eq!(mask.get(10, 20), 255);
        assert_eq!(mask.get(11, 21), 0);
    }

    #[test]
    fn test_out_of_bounds_keypoints_skipped() {
        let detection = DetectionResult::new(vec![Body::new(vec![
            Keypoint::new(-1.0, 50.0),
            Keypoint::new(50.0, -0.001),
            Keypoint::new(100.0, 50.0),
            Keypoint::new(50.0, 1000.0),
            Keypoint::new(f32::NAN, 50.0),
            Keypoint::new(f32::INFINITY, 50.0),
        ])]);
        let mask = build_mask(&detection, 100, 100, CoordinateMode::AbsolutePixels).unwrap();
        assert!(mask.is_blank());
    }

    #[test]
    fn test_normalized_one_is_out_of_bounds() {
        // 1.0 * width floors to width itself, which is outside [0, width)
        let mask = build_mask(
            &single_point(1.0, 1.0),
            100,
            100,
            CoordinateMode::NormalizedFraction,
        )
        .unwrap();
        assert!(mask.is_blank());
    }

    #[test]
    fn test_union_across_bodies() {
        let detection = DetectionResult::new(vec![
            Body::new(vec![Keypoint::new(10.0, 10.0)]),
            Body::new(vec![Keypoint::new(20.0, 20.0), Keypoint::new(10.0, 10.0)]),
        ]);
        let mask = build_mask(&detection, 50, 50, CoordinateMode::AbsolutePixels).unwrap();
        assert_eq!(mask.get(10, 10), 255);
        assert_eq!(mask.get(20, 20), 255);
        assert_eq!(mask.opaque_pixels(), 2);
    }

    #[test]
    fn test_empty_detection_yields_blank_mask() {
        let mask = build_mask(
            &DetectionResult::empty(),
            64,
            48,
            CoordinateMode::NormalizedFraction,
        )
        .unwrap();
        assert_eq!(mask.dimensions(), (64, 48));
        assert!(mask.is_blank());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let result = build_mask(
            &DetectionResult::empty(),
            0,
            100,
            CoordinateMode::AbsolutePixels,
        );
        assert!(matches!(result, Err(CutoutError::InvalidDimensions(_))));
    }

    #[test]
    fn test_refine_blank_mask_stays_blank() {
        let mask = BinaryMask::zeroed(64, 64).unwrap();
        let refined = refine_mask(&mask, 10.0, 128).unwrap();
        assert_eq!(refined.dimensions(), (64, 64));
        assert!(refined.is_blank());
    }

    #[test]
    fn test_refine_output_is_strictly_binary() {
        let mut mask = BinaryMask::zeroed(60, 60).unwrap();
        mask.set_opaque(30, 30);
        mask.set_opaque(32, 31);
        let refined = refine_mask(&mask, 5.0, 128).unwrap();
        assert!(refined.data.iter().all(|&v| v == 0 || v == 255));
    }

    #[test]
    fn test_refine_grows_single_point_into_disc() {
        let mut mask = BinaryMask::zeroed(100, 100).unwrap();
        mask.set_opaque(50, 50);
        let refined = refine_mask(&mask, 10.0, 128).unwrap();

        assert_eq!(refined.dimensions(), (100, 100));
        // Center stays opaque and the point has grown
        assert_eq!(refined.get(50, 50), 255);
        assert!(refined.opaque_pixels() > 1);
        // Contiguous near the center
        for (x, y) in [(55, 50), (45, 50), (50, 55), (50, 45), (44, 44)] {
            assert_eq!(refined.get(x, y), 255, "expected opaque at ({x}, {y})");
        }
        // Far field stays transparent
        for (x, y) in [(0, 0), (99, 99), (50, 85), (10, 50)] {
            assert_eq!(refined.get(x, y), 0, "expected transparent at ({x}, {y})");
        }
    }

    #[test]
    fn test_refine_is_deterministic() {
        let mut mask = BinaryMask::zeroed(40, 40).unwrap();
        mask.set_opaque(20, 10);
        mask.set_opaque(12, 30);
        let a = refine_mask(&mask, 6.0, 128).unwrap();
        let b = refine_mask(&mask, 6.0, 128).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_refine_rejects_bad_radius() {
        let mask = BinaryMask::zeroed(10, 10).unwrap();
        for radius in [0.0, -2.0, f32::NAN] {
            assert!(matches!(
                refine_mask(&mask, radius, 128),
                Err(CutoutError::InvalidConfig(_))
            ));
        }
    }
}
