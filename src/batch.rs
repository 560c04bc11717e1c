// src/batch.rs
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use crate::cli::{validate_params, validate_scale_factor};
use crate::io::{write_index_raster, LoadOptions, OutputFormat};
use crate::processing::{ZoningParams, ZoningProcessor};
use crate::utils::cache::BandCache;

#[derive(Deserialize, Serialize, Debug)]
pub struct BatchConfig {
    #[serde(default)]
    pub global: GlobalParams,
    pub jobs: Vec<Job>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct GlobalParams {
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    #[serde(default = "default_zones")]
    pub zones: u32,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub float: bool,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: i32,
    #[serde(default)]
    pub max_pixels: Option<usize>,
    #[serde(default = "default_true")]
    pub strict_crs: bool,
    /// Worker threads, defaults to the number of CPUs
    #[serde(default)]
    pub threads: Option<usize>,
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            zones: default_zones(),
            format: OutputFormat::default(),
            float: false,
            scale_factor: default_scale_factor(),
            max_pixels: None,
            strict_crs: true,
            threads: None,
        }
    }
}

fn default_threshold() -> f32 {
    0.4
}

fn default_zones() -> u32 {
    3
}

fn default_scale_factor() -> i32 {
    10000
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize, Serialize, Debug)]
pub struct Job {
    pub red: PathBuf,
    pub nir: PathBuf,
    pub output: PathBuf,
    pub threshold: Option<f32>,
    pub zones: Option<u32>,
    pub format: Option<OutputFormat>,
    /// Also write the index raster here
    pub index_output: Option<PathBuf>,
    pub float: Option<bool>,
    pub scale_factor: Option<i32>,
}

impl Job {
    /// Job parameters with global defaults filled in
    pub fn params(&self, global: &GlobalParams) -> ZoningParams {
        ZoningParams {
            threshold: self.threshold.unwrap_or(global.threshold),
            n_zones: self.zones.unwrap_or(global.zones),
        }
    }
}

impl BatchConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read batch file {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid batch file {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: BatchConfig = serde_json::from_str(content)?;
        for (i, job) in config.jobs.iter().enumerate() {
            let scale_factor = job.scale_factor.unwrap_or(config.global.scale_factor);
            validate_params(&job.params(&config.global))
                .and_then(|_| validate_scale_factor(scale_factor))
                .with_context(|| format!("Job {} ({})", i + 1, job.output.display()))?;
        }
        Ok(config)
    }
}

/// Outcome of a single job
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub output: PathBuf,
    pub boundary: bool,
    pub zones: usize,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub completed: Vec<JobReport>,
    /// Job position (1-based) and error message
    pub failed: Vec<(usize, String)>,
}

fn run_job(processor: &ZoningProcessor, global: &GlobalParams, job: &Job) -> Result<JobReport> {
    let params = job.params(global);
    let output = processor.process(&job.red, &job.nir, &params)?;

    let format = job.format.unwrap_or(global.format);
    output
        .result
        .save(&job.output, format)
        .with_context(|| format!("Failed to write {}", job.output.display()))?;

    if let Some(index_path) = &job.index_output {
        let float = job.float.unwrap_or(global.float);
        let scale_factor = job.scale_factor.unwrap_or(global.scale_factor);
        write_index_raster(
            &output.scene.index,
            &output.scene.projection,
            index_path,
            !float,
            scale_factor,
        )?;
    }

    Ok(JobReport {
        output: job.output.clone(),
        boundary: output.result.boundary.is_some(),
        zones: output.result.zones.len(),
    })
}

/// Run every job of `config` in parallel. Bands shared between jobs are read once.
pub fn run_batch(config: &BatchConfig) -> Result<BatchSummary> {
    let threads = config.global.threads.unwrap_or_else(num_cpus::get).max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("Failed to build batch thread pool")?;

    let options = LoadOptions {
        max_pixels: config.global.max_pixels,
        strict_crs: config.global.strict_crs,
    };
    let processor = ZoningProcessor::with_cache(options, Arc::new(BandCache::new()));

    info!(jobs = config.jobs.len(), threads, "Starting batch processing");

    let (tx, rx) = flume::unbounded();
    pool.install(|| {
        config
            .jobs
            .par_iter()
            .enumerate()
            .for_each_with(tx, |tx, (i, job)| {
                let outcome = run_job(&processor, &config.global, job);
                // Receiver outlives the pool, so sending cannot fail
                let _ = tx.send((i + 1, outcome));
            });
    });

    let total = config.jobs.len();
    let mut summary = BatchSummary::default();
    for (position, outcome) in rx.iter() {
        match outcome {
            Ok(report) => {
                let output = report.output.display();
                if report.boundary {
                    info!(job = position, total, %output, zones = report.zones, "Job complete");
                } else {
                    info!(
                        job = position,
                        total,
                        %output,
                        zones = report.zones,
                        "Job complete, no field detected"
                    );
                }
                summary.completed.push(report);
            }
            Err(e) => {
                error!(job = position, total, error = %format!("{e:#}"), "Job failed");
                summary.failed.push((position, format!("{e:#}")));
            }
        }
    }
    summary.failed.sort_by_key(|(position, _)| *position);

    Ok(summary)
}

pub fn process_batch(config_path: &Path) -> Result<BatchSummary> {
    let config = BatchConfig::from_file(config_path)?;
    let summary = run_batch(&config)?;

    if !summary.failed.is_empty() {
        anyhow::bail!(
            "{} of {} batch jobs failed",
            summary.failed.len(),
            config.jobs.len()
        );
    }

    info!("Batch processing complete");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_defaults_apply() {
        let config = BatchConfig::from_json(
            r#"{"jobs": [{"red": "r.tif", "nir": "n.tif", "output": "out.json"}]}"#,
        )
        .unwrap();
        assert_eq!(config.global.threshold, 0.4);
        assert_eq!(config.global.zones, 3);
        assert!(config.global.strict_crs);
        assert_eq!(config.global.format, OutputFormat::Json);

        let params = config.jobs[0].params(&config.global);
        assert_eq!(params, ZoningParams { threshold: 0.4, n_zones: 3 });
    }

    #[test]
    fn test_job_overrides_global() {
        let config = BatchConfig::from_json(
            r#"{
                "global": {"threshold": 0.2, "zones": 4, "format": "geojson"},
                "jobs": [
                    {"red": "r.tif", "nir": "n.tif", "output": "a.json", "zones": 2},
                    {"red": "r.tif", "nir": "n.tif", "output": "b.json", "threshold": -0.5}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.global.format, OutputFormat::GeoJson);
        assert_eq!(config.jobs[0].params(&config.global).n_zones, 2);
        assert_eq!(config.jobs[1].params(&config.global).threshold, -0.5);
        assert_eq!(config.jobs[1].params(&config.global).n_zones, 4);
    }

    #[test]
    fn test_invalid_job_parameters_are_rejected() {
        let result = BatchConfig::from_json(
            r#"{"jobs": [{"red": "r.tif", "nir": "n.tif", "output": "a.json", "zones": 0}]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_non_positive_scale_factor_is_rejected() {
        let job = r#"{"red": "r.tif", "nir": "n.tif", "output": "a.json", "scale_factor": 0}"#;
        assert!(BatchConfig::from_json(&format!(r#"{{"jobs": [{job}]}}"#)).is_err());

        let global = r#"{"global": {"scale_factor": -10},
            "jobs": [{"red": "r.tif", "nir": "n.tif", "output": "a.json"}]}"#;
        assert!(BatchConfig::from_json(global).is_err());
    }

    #[test]
    fn test_missing_bands_are_reported_per_job() {
        let config = BatchConfig::from_json(
            r#"{
                "global": {"threads": 2},
                "jobs": [
                    {"red": "/nonexistent/r1.tif", "nir": "/nonexistent/n1.tif", "output": "/nonexistent/a.json"},
                    {"red": "/nonexistent/r2.tif", "nir": "/nonexistent/n2.tif", "output": "/nonexistent/b.json"}
                ]
            }"#,
        )
        .unwrap();

        let summary = run_batch(&config).unwrap();
        assert!(summary.completed.is_empty());
        assert_eq!(
            summary.failed.iter().map(|(i, _)| *i).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert!(summary.failed[0].1.contains("r1.tif"));
    }
}
