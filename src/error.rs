// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZoningError {
    #[error("Failed to read raster {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("Unsupported band count in {}: expected a single band, found {count}", path.display())]
    UnsupportedBandCount { path: PathBuf, count: usize },

    #[error("Band shapes are incompatible: red is {red:?}, nir is {nir:?}")]
    ShapeMismatch {
        red: (usize, usize),
        nir: (usize, usize),
    },

    #[error("Coordinate reference systems differ between red and nir bands")]
    CrsMismatch,

    #[error("Raster of {pixels} pixels exceeds the budget of {max_pixels} pixels")]
    RasterTooLarge { pixels: usize, max_pixels: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ZoningError>;
