// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ndvi_zoning::batch::process_batch;
use ndvi_zoning::cli::{Cli, Commands};
use ndvi_zoning::io::{write_index_raster, LoadOptions, OutputFormat};
use ndvi_zoning::processing::{classify_zones, detect_boundary, ZoningParams, ZoningProcessor};
use ndvi_zoning::ZonationResult;

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn emit(result: &ZonationResult, output: Option<&Path>, format: OutputFormat) -> Result<()> {
    match output {
        Some(path) => {
            result
                .save(path, format)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Wrote results");
        }
        None => {
            let text = match format {
                OutputFormat::Json => result.to_json_string()?,
                OutputFormat::GeoJson => result.to_geojson_string()?,
            };
            println!("{text}");
        }
    }
    Ok(())
}

fn report_boundary(result: &ZonationResult, threshold: f32) {
    if result.boundary.is_none() {
        warn!(threshold, "No field detected above threshold");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let processor = ZoningProcessor::new(LoadOptions {
        max_pixels: cli.max_pixels,
        strict_crs: !cli.no_strict_crs,
    });
    let output = cli.output.as_deref();

    match &cli.command {
        Commands::Index {
            red,
            nir,
            float,
            scale_factor,
        } => {
            let output = output.unwrap_or_else(|| Path::new("ndvi.tif"));
            let scene = processor.index(red, nir)?;
            write_index_raster(&scene.index, &scene.projection, output, !*float, *scale_factor)?;
        }
        Commands::Boundary {
            red,
            nir,
            threshold,
            format,
        } => {
            let scene = processor.index(red, nir)?;
            let result = ZonationResult {
                boundary: detect_boundary(&scene.index, *threshold),
                zones: Vec::new(),
            };
            report_boundary(&result, *threshold);
            emit(&result, output, *format)?;
        }
        Commands::Zones {
            red,
            nir,
            zones,
            format,
        } => {
            let scene = processor.index(red, nir)?;
            let result = ZonationResult {
                boundary: None,
                zones: classify_zones(&scene.index, *zones),
            };
            if result.zones.is_empty() {
                warn!("Not enough valid pixels for zoning");
            }
            emit(&result, output, *format)?;
        }
        Commands::Zonate {
            red,
            nir,
            threshold,
            zones,
            format,
            index_output,
        } => {
            let params = ZoningParams {
                threshold: *threshold,
                n_zones: *zones,
            };
            let zoned = processor.process(red, nir, &params)?;
            report_boundary(&zoned.result, *threshold);

            if let Some(index_path) = index_output {
                let scene = &zoned.scene;
                write_index_raster(&scene.index, &scene.projection, index_path, false, 1)?;
            }
            emit(&zoned.result, output, *format)?;
        }
        Commands::Batch { config } => {
            let summary = process_batch(config)?;
            info!(jobs = summary.completed.len(), "Batch finished");
        }
    }

    Ok(())
}
