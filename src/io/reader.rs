// src/io/reader.rs
use gdal::Dataset;
use std::borrow::{Borrow, Cow};
use std::io;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Result, ZoningError};
use crate::processing::resample::align_to_reference;
use crate::types::{GeoTransform, RasterBand};

/// Controls applied while loading a red/nir pair
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Reject rasters with more pixels than this before reading any data
    pub max_pixels: Option<usize>,
    /// Fail instead of warning when the two bands carry different projections
    pub strict_crs: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_pixels: None,
            strict_crs: true,
        }
    }
}

fn open_dataset(path: &Path) -> Result<Dataset> {
    if !path.exists() {
        return Err(ZoningError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        });
    }

    Dataset::open(path).map_err(|e| ZoningError::Io {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidData, e.to_string()),
    })
}

/// Read band 1 of a georeferenced raster as `f32`.
pub fn load_band(path: &Path) -> Result<RasterBand> {
    load_band_with_budget(path, None)
}

/// Like [`load_band`], refusing rasters larger than `max_pixels`.
pub fn load_band_with_budget(path: &Path, max_pixels: Option<usize>) -> Result<RasterBand> {
    let dataset = open_dataset(path)?;

    let count = dataset.raster_count() as usize;
    if count == 0 {
        return Err(ZoningError::UnsupportedBandCount {
            path: path.to_path_buf(),
            count,
        });
    }
    if count > 1 {
        warn!(path = %path.display(), count, "Raster has several bands, using band 1");
    }

    let (width, height) = dataset.raster_size();
    if let Some(max_pixels) = max_pixels {
        let pixels = width * height;
        if pixels > max_pixels {
            return Err(ZoningError::RasterTooLarge { pixels, max_pixels });
        }
    }

    // GDAL reports an error for rasters without georeferencing; its default
    // transform is the pixel grid itself.
    let transform = match dataset.geo_transform() {
        Ok(coeffs) => GeoTransform(coeffs),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "No geotransform, using pixel grid");
            GeoTransform::identity()
        }
    };

    let band = dataset.rasterband(1)?;
    let buffer = band.read_as::<f32>((0, 0), (width, height), (width, height), None)?;

    debug!(path = %path.display(), width, height, "Loaded band");

    Ok(RasterBand {
        width,
        height,
        data: buffer.data().to_vec(),
        transform,
        projection: dataset.projection(),
    })
}

/// Load red and nir bands and bring nir onto red's grid.
pub fn load_band_pair(
    red_path: &Path,
    nir_path: &Path,
    options: &LoadOptions,
) -> Result<(RasterBand, RasterBand)> {
    load_aligned(red_path, nir_path, options.strict_crs, |path| {
        load_band_with_budget(path, options.max_pixels)
    })
}

/// Load both bands with `load` and align nir to red. `B` is either an owned
/// band or a shared handle from the band cache.
pub(crate) fn load_aligned<B, F>(
    red_path: &Path,
    nir_path: &Path,
    strict_crs: bool,
    load: F,
) -> Result<(B, B)>
where
    B: Borrow<RasterBand> + From<RasterBand>,
    F: Fn(&Path) -> Result<B>,
{
    let red = load(red_path)?;
    let nir = load(nir_path)?;
    let nir = match align_to_reference(red.borrow(), nir.borrow(), strict_crs)? {
        Cow::Owned(resampled) => B::from(resampled),
        Cow::Borrowed(_) => nir,
    };
    Ok((red, nir))
}
