// src/processing/boundary.rs
use tracing::debug;

use crate::processing::contour::extract_largest_polygon;
use crate::types::{IndexRaster, Polygon};

/// Outline of the largest region whose index is strictly above `threshold`.
///
/// Returns `None` when no pixel passes the threshold. Non-finite pixels never pass.
/// `threshold` is not range-checked here.
pub fn detect_boundary(index: &IndexRaster, threshold: f32) -> Option<Polygon> {
    let mask = index.mask_where(|v| v.is_finite() && v > threshold);
    let selected = mask.count();
    debug!(threshold, selected, "Thresholded index raster");

    if selected == 0 {
        return None;
    }

    extract_largest_polygon(&mask, &index.transform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoTransform;

    fn raster(width: usize, height: usize, data: Vec<f32>) -> IndexRaster {
        IndexRaster {
            width,
            height,
            data,
            transform: GeoTransform::identity(),
        }
    }

    #[test]
    fn test_threshold_is_strict() {
        let index = raster(2, 1, vec![0.5, 0.5]);
        assert!(detect_boundary(&index, 0.5).is_none());
        assert!(detect_boundary(&index, 0.49).is_some());
    }

    #[test]
    fn test_nan_pixels_are_excluded() {
        let index = raster(2, 2, vec![f32::NAN; 4]);
        assert!(detect_boundary(&index, -1.0).is_none());
    }

    #[test]
    fn test_infinite_pixels_are_excluded() {
        let index = raster(2, 1, vec![f32::INFINITY, f32::NAN]);
        assert!(detect_boundary(&index, 0.4).is_none());

        let index = raster(3, 1, vec![f32::INFINITY, 0.1, 0.8]);
        let polygon = detect_boundary(&index, 0.4).unwrap();
        let (min, max) = polygon.bounding_box();
        assert_eq!(min, [2.0, 0.0]);
        assert_eq!(max, [3.0, 1.0]);
    }

    #[test]
    fn test_minus_one_pixels_fail_lowest_threshold() {
        let index = raster(2, 2, vec![-1.0; 4]);
        assert!(detect_boundary(&index, -1.0).is_none());

        let index = raster(2, 2, vec![-1.0, -1.0, -1.0, -0.99]);
        assert!(detect_boundary(&index, -1.0).is_some());
    }

    #[test]
    fn test_largest_region_wins() {
        #[rustfmt::skip]
        let index = raster(5, 3, vec![
            0.9, 0.1, 0.1, 0.9, 0.9,
            0.1, 0.1, 0.1, 0.9, 0.9,
            0.1, 0.1, 0.1, 0.9, 0.9,
        ]);
        let polygon = detect_boundary(&index, 0.5).unwrap();
        let (min, max) = polygon.bounding_box();
        assert_eq!(min, [3.0, 0.0]);
        assert_eq!(max, [5.0, 3.0]);
    }
}
