// src/io/mod.rs
pub mod geojson;
pub mod reader;
pub mod writer;

pub use self::geojson::OutputFormat;
pub use reader::{load_band, load_band_pair, load_band_with_budget, LoadOptions};
pub use writer::write_index_raster;
