// src/utils/cache.rs
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::trace;

use crate::error::Result;
use crate::io::load_band_with_budget;
use crate::types::RasterBand;

/// Thread-safe cache of loaded bands, keyed by path
#[derive(Default)]
pub struct BandCache {
    bands: Mutex<HashMap<PathBuf, Arc<RasterBand>>>,
}

impl BandCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_band<P: AsRef<Path>>(
        &self,
        path: P,
        max_pixels: Option<usize>,
    ) -> Result<Arc<RasterBand>> {
        let path = path.as_ref();

        if let Some(band) = self.bands.lock().get(path) {
            trace!(path = %path.display(), "Band cache hit");
            return Ok(Arc::clone(band));
        }

        // Not in cache: read without holding the lock so other jobs keep going
        let band = Arc::new(load_band_with_budget(path, max_pixels)?);
        let mut bands = self.bands.lock();
        let cached = bands.entry(path.to_path_buf()).or_insert(band);
        Ok(Arc::clone(cached))
    }

    /// Insert an already loaded band
    pub fn insert<P: AsRef<Path>>(&self, path: P, band: RasterBand) -> Arc<RasterBand> {
        let band = Arc::new(band);
        self.bands.lock().insert(path.as_ref().to_path_buf(), Arc::clone(&band));
        band
    }

    pub fn clear(&self) {
        self.bands.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.bands.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.lock().is_empty()
    }
}
