// src/processing/indices/mod.rs
pub mod ndvi;

// Re-export indices
pub use ndvi::{compute_index, NDVI, EPSILON};

use crate::error::Result;
use crate::types::{IndexRaster, RasterBand};

/// Trait for normalized-difference index calculators over a red/nir pair
pub trait IndexCalculator: Send + Sync {
    /// Calculate the index from two bands on the same grid
    fn calculate(&self, red: &RasterBand, nir: &RasterBand) -> Result<IndexRaster>;

    /// Return the name of the index
    fn name(&self) -> &str;
}
