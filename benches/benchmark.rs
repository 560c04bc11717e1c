use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndvi_zoning::processing::{
    classify_zones, compute_index, detect_boundary, resample_bilinear, zonate, ZoningParams,
};
use ndvi_zoning::types::{GeoTransform, IndexRaster, RasterBand};

const SIZE: (usize, usize) = (1024, 1024);

/// Synthetic red/nir pair with a vegetated disc in the middle
fn synthetic_bands() -> (RasterBand, RasterBand) {
    let (width, height) = SIZE;
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let radius = width as f32 / 3.0;

    let mut red = vec![0.0f32; width * height];
    let mut nir = vec![0.0f32; width * height];
    for row in 0..height {
        for col in 0..width {
            let i = row * width + col;
            let dist = ((col as f32 - cx).powi(2) + (row as f32 - cy).powi(2)).sqrt();
            red[i] = 800.0 + (i % 100) as f32;
            nir[i] = if dist < radius {
                4000.0 - dist * 4.0 + (i % 50) as f32
            } else {
                1000.0 + (i % 50) as f32
            };
        }
    }

    let transform = GeoTransform::identity();
    (
        RasterBand::new(width, height, red, transform),
        RasterBand::new(width, height, nir, transform),
    )
}

fn synthetic_index() -> IndexRaster {
    let (red, nir) = synthetic_bands();
    compute_index(&red, &nir).unwrap()
}

/// Benchmark the per-pixel index on its own
fn benchmark_index_calculation(c: &mut Criterion) {
    let (red, nir) = synthetic_bands();

    c.bench_function("ndvi_index_calculation", |b| {
        b.iter(|| compute_index(black_box(&red), black_box(&nir)))
    });
}

/// Benchmark bringing a half-resolution nir band onto the red grid
fn benchmark_resampling(c: &mut Criterion) {
    let (_, nir) = synthetic_bands();
    let coarse = resample_bilinear(&nir, SIZE.0 / 2, SIZE.1 / 2, nir.transform).unwrap();

    c.bench_function("bilinear_upsample", |b| {
        b.iter(|| resample_bilinear(black_box(&coarse), SIZE.0, SIZE.1, coarse.transform))
    });
}

fn benchmark_boundary(c: &mut Criterion) {
    let index = synthetic_index();

    c.bench_function("boundary_detection", |b| {
        b.iter(|| detect_boundary(black_box(&index), black_box(0.4)))
    });
}

fn benchmark_zones(c: &mut Criterion) {
    let index = synthetic_index();

    c.bench_function("quantile_zones", |b| {
        b.iter(|| classify_zones(black_box(&index), black_box(3)))
    });
}

/// Boundary and zones together, as the CLI runs them
fn benchmark_zonation(c: &mut Criterion) {
    let index = synthetic_index();
    let params = ZoningParams {
        threshold: 0.4,
        n_zones: 5,
    };

    c.bench_function("full_zonation", |b| {
        b.iter(|| zonate(black_box(&index), black_box(&params)))
    });
}

criterion_group!(
    benches,
    benchmark_index_calculation,
    benchmark_resampling,
    benchmark_boundary,
    benchmark_zones,
    benchmark_zonation
);
criterion_main!(benches);
