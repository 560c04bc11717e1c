// src/processing/pipeline.rs
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span};

use crate::error::Result;
use crate::io::reader::{load_aligned, load_band_with_budget, LoadOptions};
use crate::processing::boundary::detect_boundary;
use crate::processing::indices::compute_index;
use crate::processing::zones::classify_zones;
use crate::types::{IndexRaster, RasterBand, ZonationResult};
use crate::utils::cache::BandCache;

/// Parameters of one zonation run. Neither value is range-checked here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoningParams {
    pub threshold: f32,
    pub n_zones: u32,
}

/// Boundary and zones for an index raster.
pub fn zonate(index: &IndexRaster, params: &ZoningParams) -> ZonationResult {
    ZonationResult {
        boundary: detect_boundary(index, params.threshold),
        zones: classify_zones(index, params.n_zones),
    }
}

/// Index plus zonation for a pair of bands already on the same grid.
pub fn zonate_bands(
    red: &RasterBand,
    nir: &RasterBand,
    params: &ZoningParams,
) -> Result<(IndexRaster, ZonationResult)> {
    let index = compute_index(red, nir)?;
    let result = zonate(&index, params);
    Ok((index, result))
}

/// Index raster together with the projection of its red band
#[derive(Debug, Clone)]
pub struct IndexedScene {
    pub index: IndexRaster,
    pub projection: String,
}

/// Everything produced by [`ZoningProcessor::process`]
#[derive(Debug, Clone)]
pub struct ZoningOutput {
    pub scene: IndexedScene,
    pub result: ZonationResult,
}

/// Runs the full chain from band files to a [`ZonationResult`].
pub struct ZoningProcessor {
    options: LoadOptions,
    cache: Option<Arc<BandCache>>,
}

impl ZoningProcessor {
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            cache: None,
        }
    }

    /// Share loaded bands with other processors through `cache`
    pub fn with_cache(options: LoadOptions, cache: Arc<BandCache>) -> Self {
        Self {
            options,
            cache: Some(cache),
        }
    }

    fn load(&self, path: &Path) -> Result<Arc<RasterBand>> {
        match &self.cache {
            Some(cache) => cache.get_band(path, self.options.max_pixels),
            None => Ok(Arc::new(load_band_with_budget(path, self.options.max_pixels)?)),
        }
    }

    /// Load both bands, align nir to red and compute the index.
    pub fn index(&self, red_path: &Path, nir_path: &Path) -> Result<IndexedScene> {
        let (red, nir) =
            load_aligned(red_path, nir_path, self.options.strict_crs, |path| self.load(path))?;

        Ok(IndexedScene {
            index: compute_index(&red, &nir)?,
            projection: red.projection.clone(),
        })
    }

    pub fn process(
        &self,
        red_path: &Path,
        nir_path: &Path,
        params: &ZoningParams,
    ) -> Result<ZoningOutput> {
        let span = info_span!("zonate", red = %red_path.display(), nir = %nir_path.display());
        let _guard = span.enter();
        let started = Instant::now();

        let scene = self.index(red_path, nir_path)?;
        let result = zonate(&scene.index, params);

        info!(
            width = scene.index.width,
            height = scene.index.height,
            boundary = result.boundary.is_some(),
            zones = result.zones.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Zonation complete"
        );

        Ok(ZoningOutput { scene, result })
    }
}

impl Default for ZoningProcessor {
    fn default() -> Self {
        Self::new(LoadOptions::default())
    }
}
