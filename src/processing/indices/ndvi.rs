// src/processing/indices/ndvi.rs
use rayon::prelude::*;
use tracing::debug;

use crate::error::{Result, ZoningError};
use crate::processing::indices::IndexCalculator;
use crate::types::{IndexRaster, RasterBand};

/// Denominator guard added to `nir + red`
pub const EPSILON: f32 = 1e-9;

/// Normalized Difference Vegetation Index (NDVI) calculator
pub struct NDVI {
    epsilon: f32,
    name: String,
}

impl NDVI {
    pub fn new(name: Option<String>) -> Self {
        Self {
            epsilon: EPSILON,
            name: name.unwrap_or_else(|| "NDVI".to_string()),
        }
    }
}

impl Default for NDVI {
    fn default() -> Self {
        Self::new(None)
    }
}

impl IndexCalculator for NDVI {
    fn calculate(&self, red: &RasterBand, nir: &RasterBand) -> Result<IndexRaster> {
        if red.shape() != nir.shape() {
            return Err(ZoningError::ShapeMismatch {
                red: red.shape(),
                nir: nir.shape(),
            });
        }

        debug!(width = red.width, height = red.height, index = %self.name, "Computing index");

        // Preallocate result buffer
        let mut result_data = vec![0.0f32; red.data.len()];
        let eps = self.epsilon;

        // NDVI = (NIR - RED) / (NIR + RED + eps), no clamping
        result_data
            .par_iter_mut()
            .zip(red.data.par_iter().zip(nir.data.par_iter()))
            .for_each(|(result, (&r, &n))| {
                *result = (n - r) / (n + r + eps);
            });

        Ok(IndexRaster {
            width: red.width,
            height: red.height,
            data: result_data,
            transform: red.transform,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Compute NDVI for an aligned red/nir pair; the red grid is authoritative.
pub fn compute_index(red: &RasterBand, nir: &RasterBand) -> Result<IndexRaster> {
    NDVI::default().calculate(red, nir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoTransform;

    fn band(values: &[f32]) -> RasterBand {
        RasterBand::new(values.len(), 1, values.to_vec(), GeoTransform::identity())
    }

    #[test]
    fn test_zero_denominator_is_guarded() {
        let index = compute_index(&band(&[0.0]), &band(&[0.0])).unwrap();
        assert_eq!(index.data[0], 0.0);
        assert!(index.data[0].is_finite());
    }

    #[test]
    fn test_nan_input_propagates() {
        let index = compute_index(&band(&[f32::NAN, 1.0]), &band(&[1.0, 3.0])).unwrap();
        assert!(index.data[0].is_nan());
        assert!((index.data[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_shape_mismatch_is_an_error() {
        let err = compute_index(&band(&[1.0, 2.0]), &band(&[1.0])).unwrap_err();
        assert!(matches!(err, ZoningError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_custom_name() {
        let ndvi = NDVI::new(Some("Sentinel NDVI".to_string()));
        assert_eq!(ndvi.name(), "Sentinel NDVI");
        assert_eq!(NDVI::default().name(), "NDVI");
    }
}
