// src/processing/zones.rs
use itertools::{Itertools, MinMaxResult};
use tracing::debug;

use crate::processing::contour::extract_largest_polygon;
use crate::types::{IndexRaster, Zone};

/// Below this many finite pixels no zoning is attempted.
pub const MIN_VALID_PIXELS: usize = 10;

/// `n_zones + 1` breakpoints at evenly spaced probabilities over `[0, 1]`,
/// linearly interpolated between order statistics. The first breakpoint is
/// the minimum and the last the maximum of `values`.
pub fn quantile_breaks(values: &[f32], n_zones: u32) -> Vec<f32> {
    if values.is_empty() || n_zones == 0 {
        return Vec::new();
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f32::total_cmp);
    let last = (sorted.len() - 1) as f64;

    (0..=n_zones)
        .map(|i| {
            let pos = last * i as f64 / n_zones as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            let (a, b) = (sorted[lo] as f64, sorted[hi] as f64);
            (a + (b - a) * frac) as f32
        })
        .collect()
}

/// Split the valid index range into `n_zones` quantile bands and outline the
/// largest region of each.
///
/// Both band edges are inclusive, so a pixel sitting exactly on a breakpoint
/// belongs to both neighbouring levels. A band with no traceable region is
/// skipped and the following levels keep their numbers.
pub fn classify_zones(index: &IndexRaster, n_zones: u32) -> Vec<Zone> {
    let values = index.valid_values();
    if values.len() < MIN_VALID_PIXELS {
        debug!(valid = values.len(), "Too few valid pixels for zoning");
        return Vec::new();
    }

    let breaks = quantile_breaks(&values, n_zones);
    if let MinMaxResult::MinMax(min, max) = values.iter().minmax_by(|a, b| a.total_cmp(b)) {
        debug!(min, max, ?breaks, "Computed quantile breakpoints");
    }

    breaks
        .iter()
        .tuple_windows()
        .enumerate()
        .filter_map(|(i, (&low, &high))| {
            let level = i as u32 + 1;
            let mask = index.mask_where(|v| v >= low && v <= high);
            match extract_largest_polygon(&mask, &index.transform) {
                Some(polygon) => Some(Zone {
                    level,
                    range: (low as f64, high as f64),
                    polygon,
                }),
                None => {
                    debug!(level, low, high, "No region for zone, skipping");
                    None
                }
            }
        })
        .collect()
}
