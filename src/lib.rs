// src/lib.rs
pub mod batch;
pub mod cli;
pub mod error;
pub mod io;
pub mod processing;
pub mod types;
pub mod utils;

pub use error::{Result, ZoningError};
pub use processing::{zonate, ZoningParams, ZoningProcessor};
pub use types::{GeoTransform, IndexRaster, Polygon, RasterBand, ZonationResult, Zone};

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
