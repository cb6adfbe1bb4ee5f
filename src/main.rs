// src/main.rs
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use burn_severity::batch::process_batch;
use burn_severity::cli::{Cli, Commands};
use burn_severity::config::AnalysisSettings;
use burn_severity::io::read_spectral_raster;
use burn_severity::jobs::{DirectoryAssetStore, JobQueue, JobResult, SeverityRequest};
use burn_severity::processing::{BandMapping, IndexRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter()));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Indices => {
            let registry = IndexRegistry::new();
            let graph = registry.get_calculators_with_dependencies();
            let both = registry.get_calculators_requiring_both_periods();
            for name in registry.get_available_indices() {
                let periods = if both.contains(&name) { "pre+post" } else { "single" };
                let deps = graph.get(&name).map(|d| d.join(", ")).unwrap_or_default();
                println!("{name:<8} {periods:<9} depends on: [{deps}]");
            }
        }
        Commands::Analyze {
            fire_event,
            prefire,
            postfire,
            output,
            indices,
            nir,
            swir,
            breaks,
        } => {
            let mut settings = AnalysisSettings {
                band_mapping: BandMapping::new(nir, swir),
                ..AnalysisSettings::default()
            };
            if !indices.is_empty() {
                settings.indices = indices;
            }
            if !breaks.is_empty() {
                settings.severity_breaks = breaks;
            }
            let interval = Duration::from_millis(settings.poll_interval_ms);

            let request = SeverityRequest {
                fire_event_name: fire_event,
                prefire: read_spectral_raster(&prefire)?,
                postfire: read_spectral_raster(&postfire)?,
                settings,
            };

            let queue = JobQueue::new();
            let workers = queue.spawn_workers(1, Arc::new(DirectoryAssetStore::new(&output)));
            let job_id = queue.submit(request)?;
            let result = queue
                .tracker()
                .wait_for(&job_id, interval)
                .await
                .ok_or_else(|| anyhow!("Job {job_id} is unknown to the tracker"))?;
            drop(queue);
            for worker in workers {
                worker.await?;
            }

            report(&[result])?;
        }
        Commands::Batch { config } => {
            let results = process_batch(&config).await?;
            report(&results)?;
        }
    }

    Ok(())
}

fn report(results: &[JobResult]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(results)?);
    if let Some(failed) = results.iter().find(|r| !r.is_success()) {
        return Err(anyhow!(
            "Job {} failed: {}",
            failed.job_id,
            failed.error_message.as_deref().unwrap_or("unknown error")
        ));
    }
    Ok(())
}
