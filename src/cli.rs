// src/cli.rs
use clap::{Parser, Subcommand};
use std::ops::RangeInclusive;
use std::path::PathBuf;

use crate::error::{Result, ZoningError};
use crate::io::OutputFormat;
use crate::processing::ZoningParams;

/// Thresholds accepted from callers; the core itself takes any value
pub const THRESHOLD_RANGE: RangeInclusive<f32> = -1.0..=1.0;
/// Zone counts accepted from callers
pub const ZONES_RANGE: RangeInclusive<u32> = 1..=10;

#[derive(Parser)]
#[command(name = "ndvi-zoning")]
#[command(about = "Vegetation boundary and health-zone extraction from red/NIR rasters")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output file path (JSON results go to stdout when omitted)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Reject rasters with more pixels than this
    #[arg(long, global = true)]
    pub max_pixels: Option<usize>,

    /// Only warn when red and nir projections differ
    #[arg(long, global = true)]
    pub no_strict_crs: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the NDVI raster: (NIR-RED)/(NIR+RED)
    Index {
        /// Red band
        #[arg(short = 'r', long)]
        red: PathBuf,

        /// Near-infrared band
        #[arg(short = 'n', long)]
        nir: PathBuf,

        /// Use float32 instead of int16
        #[arg(long)]
        float: bool,

        /// Scaling factor for fixed-point
        #[arg(
            long,
            default_value = "10000",
            value_parser = clap::value_parser!(i32).range(1..)
        )]
        scale_factor: i32,
    },

    /// Outline the largest vegetated area above a threshold
    Boundary {
        /// Red band
        #[arg(short = 'r', long)]
        red: PathBuf,

        /// Near-infrared band
        #[arg(short = 'n', long)]
        nir: PathBuf,

        /// NDVI threshold in [-1, 1]
        #[arg(
            short,
            long,
            default_value = "0.4",
            allow_negative_numbers = true,
            value_parser = parse_threshold
        )]
        threshold: f32,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Split the index distribution into quantile health zones
    Zones {
        /// Red band
        #[arg(short = 'r', long)]
        red: PathBuf,

        /// Near-infrared band
        #[arg(short = 'n', long)]
        nir: PathBuf,

        /// Number of zones
        #[arg(
            short,
            long,
            default_value = "3",
            value_parser = clap::value_parser!(u32).range(1..=10)
        )]
        zones: u32,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Boundary and zones in one pass
    Zonate {
        /// Red band
        #[arg(short = 'r', long)]
        red: PathBuf,

        /// Near-infrared band
        #[arg(short = 'n', long)]
        nir: PathBuf,

        /// NDVI threshold in [-1, 1]
        #[arg(
            short,
            long,
            default_value = "0.4",
            allow_negative_numbers = true,
            value_parser = parse_threshold
        )]
        threshold: f32,

        /// Number of zones
        #[arg(
            short,
            long,
            default_value = "3",
            value_parser = clap::value_parser!(u32).range(1..=10)
        )]
        zones: u32,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Also write the NDVI raster (float32) here
        #[arg(long)]
        index_output: Option<PathBuf>,
    },

    /// Run jobs from a JSON batch file
    Batch {
        /// Batch configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn parse_threshold(s: &str) -> std::result::Result<f32, String> {
    let value: f32 = s.parse().map_err(|e| format!("{s:?} is not a number: {e}"))?;
    if THRESHOLD_RANGE.contains(&value) {
        Ok(value)
    } else {
        Err(format!(
            "threshold must be within [{}, {}]",
            THRESHOLD_RANGE.start(),
            THRESHOLD_RANGE.end()
        ))
    }
}

/// Range checks the zoning core leaves to its callers.
pub fn validate_params(params: &ZoningParams) -> Result<()> {
    if !THRESHOLD_RANGE.contains(&params.threshold) {
        return Err(ZoningError::InvalidParameter(format!(
            "threshold {} outside [{}, {}]",
            params.threshold,
            THRESHOLD_RANGE.start(),
            THRESHOLD_RANGE.end()
        )));
    }
    if !ZONES_RANGE.contains(&params.n_zones) {
        return Err(ZoningError::InvalidParameter(format!(
            "zone count {} outside [{}, {}]",
            params.n_zones,
            ZONES_RANGE.start(),
            ZONES_RANGE.end()
        )));
    }
    Ok(())
}

/// Fixed-point output divides by the scale factor, so it must be positive.
pub fn validate_scale_factor(scale_factor: i32) -> Result<()> {
    if scale_factor <= 0 {
        return Err(ZoningError::InvalidParameter(format!(
            "scale factor {scale_factor} must be positive"
        )));
    }
    Ok(())
}
