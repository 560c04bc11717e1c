// src/utils/fixed_point.rs
/// Scale index values into `i16`; non-finite cells become `nodata_value`.
pub fn to_fixed_point(data: &[f32], scale_factor: i32, nodata_value: i16) -> Vec<i16> {
    data.iter()
        .map(|&value| {
            if !value.is_finite() {
                nodata_value
            } else {
                // Clamp to avoid overflow and scale
                let clamped = value.clamp(-0.9999, 0.9999);
                (clamped * scale_factor as f32).round() as i16
            }
        })
        .collect()
}

/// Replace non-finite cells with `nodata_value` for float output.
pub fn with_float_nodata(data: &[f32], nodata_value: f32) -> Vec<f32> {
    data.iter()
        .map(|&value| if value.is_finite() { value } else { nodata_value })
        .collect()
}
