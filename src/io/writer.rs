// src/io/writer.rs
use gdal::raster::{Buffer, RasterCreationOptions};
use gdal::{DriverManager, Metadata};
use std::path::Path;
use tracing::info;

use crate::error::{Result, ZoningError};
use crate::types::IndexRaster;
use crate::utils::fixed_point::{to_fixed_point, with_float_nodata};

pub const NODATA_VALUE_INT: i16 = -10000;
pub const NODATA_VALUE_FLOAT: f32 = -999.0;

/// Write an index raster to GeoTIFF, as scaled int16 or as float32.
pub fn write_index_raster(
    index: &IndexRaster,
    projection: &str,
    output_path: &Path,
    use_fixed_point: bool,
    scale_factor: i32,
) -> Result<()> {
    if use_fixed_point && scale_factor <= 0 {
        return Err(ZoningError::InvalidParameter(format!(
            "scale factor {scale_factor} must be positive"
        )));
    }

    let driver = DriverManager::get_driver_by_name("GTiff")?;

    let creation_options = RasterCreationOptions::from_iter([
        "COMPRESS=DEFLATE",
        "TILED=YES",
        "NUM_THREADS=ALL_CPUS",
    ]);

    let shape = index.shape();

    let mut out_ds = if use_fixed_point {
        driver.create_with_band_type_with_options::<i16, _>(
            output_path,
            index.width,
            index.height,
            1,
            &creation_options,
        )?
    } else {
        driver.create_with_band_type_with_options::<f32, _>(
            output_path,
            index.width,
            index.height,
            1,
            &creation_options,
        )?
    };

    if !projection.is_empty() {
        out_ds.set_projection(projection)?;
    }
    out_ds.set_geo_transform(&index.transform.0)?;

    let mut band = out_ds.rasterband(1)?;
    if use_fixed_point {
        band.set_no_data_value(Some(NODATA_VALUE_INT as f64))?;
        band.set_metadata_item("SCALE", &format!("{}", 1.0 / scale_factor as f64), "")?;
        band.set_metadata_item("OFFSET", "0", "")?;
        band.set_description(&format!("NDVI (scaled by {})", scale_factor))?;

        let fixed_data = to_fixed_point(&index.data, scale_factor, NODATA_VALUE_INT);
        let mut buffer = Buffer::new(shape, fixed_data);
        band.write((0, 0), shape, &mut buffer)?;
    } else {
        band.set_no_data_value(Some(NODATA_VALUE_FLOAT as f64))?;
        band.set_description("NDVI")?;

        let mut buffer = Buffer::new(shape, with_float_nodata(&index.data, NODATA_VALUE_FLOAT));
        band.write((0, 0), shape, &mut buffer)?;
    }

    info!(path = %output_path.display(), fixed_point = use_fixed_point, "Wrote index raster");

    Ok(())
}
