// src/batch.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::AnalysisSettings;
use crate::io::read_spectral_raster;
use crate::jobs::{DirectoryAssetStore, JobQueue, JobResult, SeverityRequest};
use crate::processing::BandMapping;

#[derive(Deserialize, Serialize, Debug)]
pub struct BatchConfig {
    #[serde(default)]
    pub global: AnalysisSettings,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    pub analyses: Vec<Analysis>,
}

fn default_output_dir() -> String {
    "output".to_string()
}

/// One fire event; unset fields fall back to the global settings.
#[derive(Deserialize, Serialize, Debug)]
pub struct Analysis {
    pub fire_event_name: String,
    pub prefire: PathBuf,
    pub postfire: PathBuf,
    pub indices: Option<Vec<String>>,
    pub band_mapping: Option<BandMapping>,
    pub severity_breaks: Option<Vec<f64>>,
    pub classification_index: Option<String>,
}

impl Analysis {
    pub fn settings(&self, global: &AnalysisSettings) -> AnalysisSettings {
        let mut settings = global.clone();
        if let Some(indices) = &self.indices {
            settings.indices = indices.clone();
        }
        if let Some(band_mapping) = &self.band_mapping {
            settings.band_mapping = band_mapping.clone();
        }
        if let Some(breaks) = &self.severity_breaks {
            settings.severity_breaks = breaks.clone();
        }
        if let Some(index) = &self.classification_index {
            settings.classification_index = index.clone();
        }
        settings
    }
}

pub fn load_batch_config(config_path: &Path) -> Result<BatchConfig> {
    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read batch config {}", config_path.display()))?;
    let config: BatchConfig = serde_json::from_str(&config_content)
        .with_context(|| format!("Invalid batch config {}", config_path.display()))?;
    Ok(config)
}

/// Load the input rasters of every analysis.
///
/// Fails on the first unreadable raster, before anything is queued.
pub fn build_requests(config: &BatchConfig) -> Result<Vec<SeverityRequest>> {
    config
        .analyses
        .iter()
        .map(|analysis| {
            Ok(SeverityRequest {
                fire_event_name: analysis.fire_event_name.clone(),
                prefire: read_spectral_raster(&analysis.prefire)?,
                postfire: read_spectral_raster(&analysis.postfire)?,
                settings: analysis.settings(&config.global),
            })
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| {
            format!(
                "Failed to load analysis inputs for {} analyses",
                config.analyses.len()
            )
        })
}

/// Run every analysis of a batch file and wait for all of them to finish.
pub async fn process_batch(config_path: &Path) -> Result<Vec<JobResult>> {
    let config = load_batch_config(config_path)?;
    let requests = build_requests(&config)?;

    let queue = JobQueue::new();
    let store = Arc::new(DirectoryAssetStore::new(&config.output_dir));
    let workers = queue.spawn_workers(config.global.workers, store);

    println!(
        "Starting batch processing with {} analyses...",
        requests.len()
    );

    let total = requests.len();
    let mut job_ids = Vec::with_capacity(total);
    let mut submit_error = None;
    for (i, request) in requests.into_iter().enumerate() {
        println!("[{}/{}] Submitting {}", i + 1, total, request.fire_event_name);
        match queue.submit(request) {
            Ok(job_id) => job_ids.push(job_id),
            Err(e) => {
                submit_error = Some(e);
                break;
            }
        }
    }

    let interval = Duration::from_millis(config.global.poll_interval_ms);
    let mut results = Vec::with_capacity(job_ids.len());
    for job_id in &job_ids {
        if let Some(result) = queue.tracker().wait_for(job_id, interval).await {
            results.push(result);
        }
    }

    // queued jobs finish before the workers are released
    drop(queue);
    for worker in workers {
        worker.await?;
    }

    if let Some(e) = submit_error {
        return Err(e.into());
    }
    if results.len() != job_ids.len() {
        return Err(anyhow!(
            "{} jobs are unknown to the tracker",
            job_ids.len() - results.len()
        ));
    }
    Ok(results)
}
