// src/processing/mod.rs
pub mod boundary;
pub mod contour;
pub mod indices;
pub mod pipeline;
pub mod resample;
pub mod zones;

// Re-export main components
pub use boundary::detect_boundary;
pub use contour::{map_to_world, trace};
pub use indices::{compute_index, IndexCalculator, NDVI};
pub use pipeline::{zonate, zonate_bands, ZoningOutput, ZoningParams, ZoningProcessor};
pub use resample::{align_to_reference, resample_bilinear};
pub use zones::{classify_zones, quantile_breaks};
