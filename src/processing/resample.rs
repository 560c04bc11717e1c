// src/processing/resample.rs
use std::borrow::Cow;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{Result, ZoningError};
use crate::types::{GeoTransform, RasterBand};

/// Resample `band` onto a `width` x `height` grid covering the same extent,
/// using bilinear weights between the four nearest source pixel centers.
/// Samples outside the outermost centers are clamped to the edge.
pub fn resample_bilinear(
    band: &RasterBand,
    width: usize,
    height: usize,
    transform: GeoTransform,
) -> Result<RasterBand> {
    if band.width == 0 || band.height == 0 || width == 0 || height == 0 {
        return Err(ZoningError::ShapeMismatch {
            red: (width, height),
            nir: band.shape(),
        });
    }

    debug!(
        from = ?band.shape(),
        to = ?(width, height),
        "Resampling band bilinearly"
    );

    let scale_x = band.width as f64 / width as f64;
    let scale_y = band.height as f64 / height as f64;
    let max_x = (band.width - 1) as f64;
    let max_y = (band.height - 1) as f64;

    let mut data = vec![0.0f32; width * height];
    data.par_chunks_mut(width).enumerate().for_each(|(row, out)| {
        let sy = ((row as f64 + 0.5) * scale_y - 0.5).clamp(0.0, max_y);
        let y0 = sy.floor() as usize;
        let y1 = (y0 + 1).min(band.height - 1);
        let fy = sy - y0 as f64;

        for (col, value) in out.iter_mut().enumerate() {
            let sx = ((col as f64 + 0.5) * scale_x - 0.5).clamp(0.0, max_x);
            let x0 = sx.floor() as usize;
            let x1 = (x0 + 1).min(band.width - 1);
            let fx = sx - x0 as f64;

            let top = lerp(band.get(y0, x0) as f64, band.get(y0, x1) as f64, fx);
            let bottom = lerp(band.get(y1, x0) as f64, band.get(y1, x1) as f64, fx);
            *value = lerp(top, bottom, fy) as f32;
        }
    });

    Ok(RasterBand {
        width,
        height,
        data,
        transform,
        projection: band.projection.clone(),
    })
}

/// Bring `nir` onto the grid of `red`, which is authoritative.
///
/// Matching shapes are passed through untouched; otherwise `nir` is
/// resampled bilinearly and takes over red's transform. With `strict_crs`,
/// differing non-empty projections are rejected.
pub fn align_to_reference<'a>(
    red: &RasterBand,
    nir: &'a RasterBand,
    strict_crs: bool,
) -> Result<Cow<'a, RasterBand>> {
    if !red.projection.is_empty()
        && !nir.projection.is_empty()
        && red.projection.trim() != nir.projection.trim()
    {
        if strict_crs {
            return Err(ZoningError::CrsMismatch);
        }
        warn!("Red and nir projections differ, emitting coordinates in the red frame");
    }

    if red.shape() == nir.shape() {
        return Ok(Cow::Borrowed(nir));
    }

    info!(
        red = ?red.shape(),
        nir = ?nir.shape(),
        "Band shapes differ, resampling nir onto red grid"
    );
    let resampled = resample_bilinear(nir, red.width, red.height, red.transform)?;
    Ok(Cow::Owned(resampled))
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    // Skip the far sample when its weight is zero so NaN neighbors don't leak in
    if t == 0.0 {
        a
    } else {
        a + (b - a) * t
    }
}
