// src/types.rs
use geo_types::{Coord, LineString};
use serde::{Deserialize, Serialize};

/// GDAL-ordered affine coefficients
/// `[origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]`.
///
/// Maps raster space `(row, col)` to world space:
/// ```text
/// x = c0 + col * c1 + row * c2
/// y = c3 + col * c4 + row * c5
/// ```
/// Integer `(row, col)` positions are pixel corners, so pixel `(r, c)` covers
/// `[r, r + 1] x [c, c + 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeoTransform(pub [f64; 6]);

impl GeoTransform {
    /// Transform mapping `(row, col)` straight to `(x = col, y = row)`.
    pub fn identity() -> Self {
        Self([0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
    }

    pub fn apply(&self, row: f64, col: f64) -> [f64; 2] {
        let c = &self.0;
        [c[0] + col * c[1] + row * c[2], c[3] + col * c[4] + row * c[5]]
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// A single reflectance band held fully in memory, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterBand {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
    pub transform: GeoTransform,
    /// Projection WKT, empty when the source carries none
    pub projection: String,
}

impl RasterBand {
    pub fn new(width: usize, height: usize, data: Vec<f32>, transform: GeoTransform) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            width,
            height,
            data,
            transform,
            projection: String::new(),
        }
    }

    pub fn with_projection(mut self, projection: impl Into<String>) -> Self {
        self.projection = projection.into();
        self
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.width + col]
    }
}

/// Per-pixel vegetation index values, same grid as the red band.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRaster {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
    pub transform: GeoTransform,
}

impl IndexRaster {
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.width + col]
    }

    /// Finite values only; NaN and infinite cells are treated as no data.
    pub fn valid_values(&self) -> Vec<f32> {
        self.data.iter().copied().filter(|v| v.is_finite()).collect()
    }

    pub fn mask_where<F>(&self, predicate: F) -> Mask
    where
        F: Fn(f32) -> bool,
    {
        Mask {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| predicate(v)).collect(),
        }
    }
}

/// Boolean raster derived from an [`IndexRaster`].
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    pub width: usize,
    pub height: usize,
    pub data: Vec<bool>,
}

impl Mask {
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.data[row * self.width + col]
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }
}

/// Closed boundary in raster space; `points` are `[row, col]` pairs and the
/// first point is repeated at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourRing {
    pub points: Vec<[f64; 2]>,
}

impl ContourRing {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// World-space polygon exterior. The closing edge is implicit: the last
/// vertex is not a repeat of the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    vertices: Vec<[f64; 2]>,
}

impl Polygon {
    pub const MIN_VERTICES: usize = 4;

    /// Returns `None` when fewer than [`Self::MIN_VERTICES`] distinct vertices remain
    /// after dropping an explicit closing vertex.
    pub fn new(mut vertices: Vec<[f64; 2]>) -> Option<Self> {
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        (vertices.len() >= Self::MIN_VERTICES).then_some(Self { vertices })
    }

    pub fn vertices(&self) -> &[[f64; 2]] {
        &self.vertices
    }

    pub fn to_geo_polygon(&self) -> geo_types::Polygon<f64> {
        let coords: Vec<Coord<f64>> = self
            .vertices
            .iter()
            .map(|&[x, y]| Coord { x, y })
            .collect();
        geo_types::Polygon::new(LineString::new(coords), vec![])
    }

    /// Unsigned enclosed area in world units.
    pub fn area(&self) -> f64 {
        use geo::Area;
        self.to_geo_polygon().unsigned_area()
    }

    /// Closed coordinate ring, first vertex repeated at the end.
    pub fn closed_ring(&self) -> Vec<Vec<f64>> {
        self.vertices
            .iter()
            .chain(self.vertices.first())
            .map(|&[x, y]| vec![x, y])
            .collect()
    }

    pub fn bounding_box(&self) -> ([f64; 2], [f64; 2]) {
        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        for &[x, y] in &self.vertices {
            min = [min[0].min(x), min[1].min(y)];
            max = [max[0].max(x), max[1].max(y)];
        }
        (min, max)
    }
}

/// One quantile band of the index distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// 1-based quantile bin, ascending with index value
    pub level: u32,
    pub range: (f64, f64),
    pub polygon: Polygon,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ZonationResult {
    pub boundary: Option<Polygon>,
    pub zones: Vec<Zone>,
}
