// src/processing/contour.rs
//! Boundary tracing on binary masks and mapping of the traced rings into
//! world coordinates.
//!
//! Tracing runs marching squares at isovalue 0.5 over the 0/1 mask. The mask
//! is treated as if surrounded by one pixel of background, so regions touching
//! the raster edge still produce closed rings. Because the mask is binary every
//! crossing falls exactly halfway between two pixel centers and no
//! interpolation is needed.
//!
//! Ring coordinates are `[row, col]` in the corner-based raster space used by
//! [`GeoTransform`]: pixel `(r, c)` has its center at `(r + 0.5, c + 0.5)`.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::types::{ContourRing, GeoTransform, Mask, Polygon};

/// Rings with fewer points than this (closing point included) are discarded.
pub const MIN_RING_POINTS: usize = 4;

/// Crossing point on a cell edge, addressed in the padded node grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EdgeKey {
    /// Between nodes `(r, c)` and `(r, c + 1)`
    Horizontal(usize, usize),
    /// Between nodes `(r, c)` and `(r + 1, c)`
    Vertical(usize, usize),
}

impl EdgeKey {
    /// Position in padded node space.
    fn padded_point(self) -> (f64, f64) {
        match self {
            EdgeKey::Horizontal(r, c) => (r as f64, c as f64 + 0.5),
            EdgeKey::Vertical(r, c) => (r as f64 + 0.5, c as f64),
        }
    }

    /// Position in corner-based raster space. Padded node `(r, c)` is the
    /// center of pixel `(r - 1, c - 1)`, i.e. `(r - 0.5, c - 0.5)`.
    fn raster_point(self) -> [f64; 2] {
        let (r, c) = self.padded_point();
        [r - 0.5, c - 0.5]
    }
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    start: EdgeKey,
    end: EdgeKey,
}

/// Which corner of a cell a segment is oriented against.
#[derive(Debug, Clone, Copy)]
enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

struct Cell {
    row: usize,
    col: usize,
    tl: bool,
    tr: bool,
    br: bool,
    bl: bool,
}

impl Cell {
    fn case(&self) -> u8 {
        (self.tl as u8) << 3 | (self.tr as u8) << 2 | (self.br as u8) << 1 | self.bl as u8
    }

    fn corner(&self, corner: Corner) -> ((f64, f64), bool) {
        let (r, c) = (self.row as f64, self.col as f64);
        match corner {
            Corner::TopLeft => ((r, c), self.tl),
            Corner::TopRight => ((r, c + 1.0), self.tr),
            Corner::BottomRight => ((r + 1.0, c + 1.0), self.br),
            Corner::BottomLeft => ((r + 1.0, c), self.bl),
        }
    }

    /// Orient `a -> b` so that foreground always lies on the same side; this
    /// makes every crossing point the start of exactly one segment.
    fn oriented(&self, a: EdgeKey, b: EdgeKey, reference: Corner) -> Segment {
        let ((cr, cc), inside) = self.corner(reference);
        let (ar, ac) = a.padded_point();
        let (br, bc) = b.padded_point();
        // x = col, y = row
        let cross = (bc - ac) * (cr - ar) - (br - ar) * (cc - ac);
        if (cross < 0.0) == inside {
            Segment { start: a, end: b }
        } else {
            Segment { start: b, end: a }
        }
    }

    fn segments(&self, out: &mut Vec<Segment>) {
        let (r, c) = (self.row, self.col);
        let top = EdgeKey::Horizontal(r, c);
        let bottom = EdgeKey::Horizontal(r + 1, c);
        let left = EdgeKey::Vertical(r, c);
        let right = EdgeKey::Vertical(r, c + 1);

        // Saddles (5, 10) cut each foreground corner off on its own, keeping
        // diagonal neighbours in separate regions.
        match self.case() {
            0 | 15 => {}
            1 | 14 => out.push(self.oriented(left, bottom, Corner::BottomLeft)),
            2 | 13 => out.push(self.oriented(bottom, right, Corner::BottomRight)),
            3 | 12 => out.push(self.oriented(left, right, Corner::TopLeft)),
            4 | 11 => out.push(self.oriented(top, right, Corner::TopRight)),
            5 => {
                out.push(self.oriented(top, right, Corner::TopRight));
                out.push(self.oriented(left, bottom, Corner::BottomLeft));
            }
            6 | 9 => out.push(self.oriented(top, bottom, Corner::TopLeft)),
            7 | 8 => out.push(self.oriented(left, top, Corner::TopLeft)),
            10 => {
                out.push(self.oriented(left, top, Corner::TopLeft));
                out.push(self.oriented(bottom, right, Corner::BottomRight));
            }
            _ => unreachable!("marching squares case is a 4-bit value"),
        }
    }
}

/// Trace every closed boundary of `mask` at isovalue 0.5.
///
/// Rings come back in row-major order of the cell where they were first met.
/// Each ring repeats its first point at the end.
pub fn trace(mask: &Mask) -> Vec<ContourRing> {
    if mask.width == 0 || mask.height == 0 {
        return Vec::new();
    }

    // Padded node lookup: nodes outside the mask are background
    let node = |r: usize, c: usize| -> bool {
        r >= 1 && c >= 1 && r <= mask.height && c <= mask.width && mask.get(r - 1, c - 1)
    };

    let mut segments = Vec::new();
    for row in 0..=mask.height {
        for col in 0..=mask.width {
            let cell = Cell {
                row,
                col,
                tl: node(row, col),
                tr: node(row, col + 1),
                br: node(row + 1, col + 1),
                bl: node(row + 1, col),
            };
            cell.segments(&mut segments);
        }
    }

    let starts: HashMap<EdgeKey, usize> = segments
        .iter()
        .enumerate()
        .map(|(i, seg)| (seg.start, i))
        .collect();

    let mut used = vec![false; segments.len()];
    let mut rings = Vec::new();

    for first in 0..segments.len() {
        if used[first] {
            continue;
        }

        let mut points = Vec::new();
        let mut current = first;
        let closed = loop {
            used[current] = true;
            let segment = segments[current];
            points.push(segment.start.raster_point());

            match starts.get(&segment.end) {
                Some(&next) if next == first => break true,
                Some(&next) if !used[next] => current = next,
                _ => break false,
            }
        };

        if !closed {
            // Cannot happen with a padded mask; keep going rather than emit a broken ring
            warn!(points = points.len(), "Dropping unclosed contour");
            continue;
        }

        points.push(points[0]);
        rings.push(ContourRing { points });
    }

    debug!(
        segments = segments.len(),
        rings = rings.len(),
        "Traced mask contours"
    );
    rings
}

/// Apply `transform` to every `[row, col]` point of `ring`, giving `[x, y]`.
pub fn map_to_world(ring: &ContourRing, transform: &GeoTransform) -> Vec<[f64; 2]> {
    ring.points
        .iter()
        .map(|&[row, col]| transform.apply(row, col))
        .collect()
}

/// Map rings to world polygons, discarding degenerate ones.
pub fn rings_to_polygons(rings: &[ContourRing], transform: &GeoTransform) -> Vec<Polygon> {
    rings
        .iter()
        .filter(|ring| ring.len() >= MIN_RING_POINTS)
        .filter_map(|ring| Polygon::new(map_to_world(ring, transform)))
        .collect()
}

/// Polygon with the largest area; on ties the earliest one wins.
pub fn largest_polygon(polygons: Vec<Polygon>) -> Option<Polygon> {
    polygons
        .into_iter()
        .fold(None, |best: Option<(f64, Polygon)>, polygon| {
            let area = polygon.area();
            match best {
                Some((best_area, _)) if best_area >= area => best,
                _ => Some((area, polygon)),
            }
        })
        .map(|(_, polygon)| polygon)
}

/// Trace `mask`, map it through `transform` and keep the largest polygon.
pub fn extract_largest_polygon(mask: &Mask, transform: &GeoTransform) -> Option<Polygon> {
    let rings = trace(mask);
    largest_polygon(rings_to_polygons(&rings, transform))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(rows: &[&[u8]]) -> Mask {
        Mask {
            width: rows[0].len(),
            height: rows.len(),
            data: rows.iter().flat_map(|r| r.iter().map(|&v| v == 1)).collect(),
        }
    }

    fn shoelace(points: &[[f64; 2]]) -> f64 {
        points
            .windows(2)
            .map(|w| w[0][0] * w[1][1] - w[1][0] * w[0][1])
            .sum::<f64>()
            / 2.0
    }

    #[test]
    fn test_empty_mask_has_no_rings() {
        assert!(trace(&mask(&[&[0, 0], &[0, 0]])).is_empty());
    }

    #[test]
    fn test_single_pixel_is_a_diamond() {
        let rings = trace(&mask(&[&[0, 0, 0], &[0, 1, 0], &[0, 0, 0]]));
        assert_eq!(rings.len(), 1);
        let ring = &rings[0];
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.points.first(), ring.points.last());
        for p in &ring.points {
            assert!(p[0] >= 1.0 && p[0] <= 2.0 && p[1] >= 1.0 && p[1] <= 2.0);
        }
        assert!((shoelace(&ring.points).abs() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_full_mask_spans_raster_extent() {
        let rings = trace(&mask(&[&[1, 1], &[1, 1]]));
        assert_eq!(rings.len(), 1);
        let rows: Vec<f64> = rings[0].points.iter().map(|p| p[0]).collect();
        let cols: Vec<f64> = rings[0].points.iter().map(|p| p[1]).collect();
        assert_eq!(rows.iter().cloned().fold(f64::INFINITY, f64::min), 0.0);
        assert_eq!(rows.iter().cloned().fold(f64::NEG_INFINITY, f64::max), 2.0);
        assert_eq!(cols.iter().cloned().fold(f64::INFINITY, f64::min), 0.0);
        assert_eq!(cols.iter().cloned().fold(f64::NEG_INFINITY, f64::max), 2.0);
        // 2x2 square minus four chamfered corners
        assert!((shoelace(&rings[0].points).abs() - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_diagonal_pixels_stay_separate() {
        let rings = trace(&mask(&[&[1, 0], &[0, 1]]));
        assert_eq!(rings.len(), 2);
        assert!(rings.iter().all(|r| r.len() == 5));
    }

    #[test]
    fn test_hole_produces_inner_ring() {
        let rings = trace(&mask(&[&[1, 1, 1], &[1, 0, 1], &[1, 1, 1]]));
        assert_eq!(rings.len(), 2);
        let areas: Vec<f64> = rings.iter().map(|r| shoelace(&r.points)).collect();
        // Outer and inner rings wind in opposite directions
        assert!(areas[0].signum() != areas[1].signum());
    }

    #[test]
    fn test_rings_follow_scan_order() {
        let rings = trace(&mask(&[&[1, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 1, 1]]));
        assert_eq!(rings.len(), 2);
        assert!(rings[0].points[0][0] < rings[1].points[0][0]);
    }

    #[test]
    fn test_identity_mapping_round_trip() {
        let ring = ContourRing {
            points: vec![[0.5, 0.0], [0.0, 0.5], [0.5, 1.0], [1.0, 0.5], [0.5, 0.0]],
        };
        let world = map_to_world(&ring, &GeoTransform::identity());
        for (p, w) in ring.points.iter().zip(&world) {
            assert_eq!(w[0], p[1]);
            assert_eq!(w[1], p[0]);
        }
    }

    #[test]
    fn test_geo_mapping_applies_pixel_size_and_origin() {
        let transform = GeoTransform([500000.0, 10.0, 0.0, 4200000.0, 0.0, -10.0]);
        let ring = ContourRing {
            points: vec![[0.0, 0.0], [0.0, 2.0], [2.0, 2.0], [2.0, 0.0], [0.0, 0.0]],
        };
        let world = map_to_world(&ring, &transform);
        assert_eq!(world[1], [500020.0, 4200000.0]);
        assert_eq!(world[2], [500020.0, 4199980.0]);
    }

    #[test]
    fn test_degenerate_rings_are_dropped() {
        let rings = vec![ContourRing {
            points: vec![[0.0, 0.0], [0.0, 1.0], [0.0, 0.0]],
        }];
        assert!(rings_to_polygons(&rings, &GeoTransform::identity()).is_empty());
    }

    #[test]
    fn test_largest_polygon_prefers_first_on_tie() {
        let square = |x: f64| {
            Polygon::new(vec![[x, 0.0], [x + 1.0, 0.0], [x + 1.0, 1.0], [x, 1.0]]).unwrap()
        };
        let best = largest_polygon(vec![square(0.0), square(5.0)]).unwrap();
        assert_eq!(best.vertices()[0], [0.0, 0.0]);
    }

    #[test]
    fn test_extract_largest_polygon_picks_bigger_region() {
        let m = mask(&[&[1, 0, 0, 0], &[0, 0, 1, 1], &[0, 0, 1, 1]]);
        let polygon = extract_largest_polygon(&m, &GeoTransform::identity()).unwrap();
        let (min, max) = polygon.bounding_box();
        assert_eq!(min, [2.0, 1.0]);
        assert_eq!(max, [4.0, 3.0]);
    }
}
