// src/jobs/worker.rs
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use flume::{Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{AssetStore, JobId, JobResult, JobStatus, JobTracker, SeverityRequest};
use crate::error::{Error, Result};
use crate::processing::{CalculationContext, IndexRegistry};
use crate::raster::IndexRaster;
use crate::severity::{SeverityBreaks, SeveritySummary};

struct QueuedJob {
    job_id: JobId,
    submitted_at: DateTime<Utc>,
    request: SeverityRequest,
}

/// Submission side of the job pipeline.
///
/// Workers spawned from a queue exit once the queue is dropped and the
/// channel has drained.
pub struct JobQueue {
    sender: Sender<QueuedJob>,
    receiver: Receiver<QueuedJob>,
    tracker: JobTracker,
}

impl JobQueue {
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self {
            sender,
            receiver,
            tracker: JobTracker::new(),
        }
    }

    pub fn tracker(&self) -> &JobTracker {
        &self.tracker
    }

    /// Record a pending job and enqueue it; returns the new job id.
    pub fn submit(&self, request: SeverityRequest) -> Result<JobId> {
        let job_id = Uuid::new_v4().to_string();
        let pending = JobResult::pending(&job_id, &request.fire_event_name);
        let submitted_at = pending.submitted_at;
        self.tracker.record(pending);

        info!(
            job_id = %job_id,
            fire_event = %request.fire_event_name,
            indices = ?request.settings.indices,
            "queued severity analysis"
        );
        self.sender
            .send(QueuedJob {
                job_id: job_id.clone(),
                submitted_at,
                request,
            })
            .map_err(|_| Error::QueueClosed)?;
        Ok(job_id)
    }

    /// Start `count` workers (at least one) on the current tokio runtime.
    pub fn spawn_workers(&self, count: usize, store: Arc<dyn AssetStore>) -> Vec<JoinHandle<()>> {
        (0..count.max(1))
            .map(|id| {
                let worker = JobWorker {
                    id,
                    receiver: self.receiver.clone(),
                    tracker: self.tracker.clone(),
                    store: Arc::clone(&store),
                };
                tokio::spawn(worker.run())
            })
            .collect()
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

pub struct JobWorker {
    id: usize,
    receiver: Receiver<QueuedJob>,
    tracker: JobTracker,
    store: Arc<dyn AssetStore>,
}

impl JobWorker {
    pub async fn run(self) {
        while let Ok(job) = self.receiver.recv_async().await {
            debug!(worker = self.id, job_id = %job.job_id, "picked up job");
            let mut result = execute(&job.job_id, &job.request, self.store.as_ref()).await;
            result.submitted_at = job.submitted_at;
            self.tracker.record(result);
        }
        debug!(worker = self.id, "job queue closed, worker exiting");
    }
}

struct AnalysisOutput {
    asset_urls: BTreeMap<String, String>,
    severity: Option<SeveritySummary>,
}

/// Run one severity analysis to completion and report its terminal state.
pub async fn execute(job_id: &str, request: &SeverityRequest, store: &dyn AssetStore) -> JobResult {
    let start = Instant::now();
    info!(
        "Starting fire severity analysis for job {}, fire event: {}",
        job_id, request.fire_event_name
    );

    let mut result = JobResult::pending(job_id, &request.fire_event_name);
    match run_analysis(job_id, request, store).await {
        Ok(output) => {
            result.status = JobStatus::Complete;
            result.asset_urls = output.asset_urls;
            result.severity = output.severity;
        }
        Err(e) => {
            error!(
                "Fire severity analysis failed for job {}: {}",
                job_id, e
            );
            result.status = JobStatus::Failed;
            result.error_message = Some(e.to_string());
        }
    }

    let elapsed = start.elapsed().as_secs_f64() * 1000.0;
    result.execution_time_ms = Some(elapsed);
    info!(
        "Fire severity analysis for job {} finished as {:?} in {:.2}ms ({} assets)",
        job_id,
        result.status,
        elapsed,
        result.asset_urls.len()
    );
    result
}

async fn run_analysis(
    job_id: &str,
    request: &SeverityRequest,
    store: &dyn AssetStore,
) -> Result<AnalysisOutput> {
    let settings = &request.settings;
    let breaks = SeverityBreaks::from_slice(&settings.severity_breaks)?;

    // one registry per job, never shared between requests
    let registry = IndexRegistry::new();
    if !registry.validate_dependencies() {
        return Err(Error::InvalidArgument(
            "index registry has unsatisfied dependencies".into(),
        ));
    }

    let context = CalculationContext::new()
        .with_band_mapping(settings.band_mapping.clone())
        .with_attribute("job_id", job_id)
        .with_attribute("fire_event_name", request.fire_event_name.as_str());

    let prefire = &request.prefire;
    let postfire = &request.postfire;
    let mut computed: Vec<(String, IndexRaster)> = Vec::new();

    for index_name in &settings.indices {
        let Some(calculator) = registry.get_calculator(index_name) else {
            warn!("Calculator for index '{}' not found, skipping", index_name);
            continue;
        };

        info!("Calculating index: {}", index_name);
        if calculator.requires_pre_and_post() {
            let raster = calculator
                .calculate(Some(prefire), Some(postfire), &context)
                .await?;
            computed.push((index_name.clone(), raster));
        } else {
            let pre = calculator.calculate(Some(prefire), None, &context).await?;
            computed.push((format!("prefire_{index_name}"), pre));
            let post = calculator.calculate(None, Some(postfire), &context).await?;
            computed.push((format!("postfire_{index_name}"), post));
        }
    }

    if computed.is_empty() {
        return Err(Error::InvalidArgument(
            "No valid indices were calculated".into(),
        ));
    }

    let mut asset_urls = BTreeMap::new();
    for (asset, raster) in &computed {
        let key = format!("{}/{}/{}", request.fire_event_name, job_id, asset);
        let url = store.put_raster(&key, asset, raster).await?;
        asset_urls.insert(asset.clone(), url);
    }

    let severity = computed
        .iter()
        .find(|(asset, _)| *asset == settings.classification_index)
        .map(|(asset, raster)| {
            SeveritySummary::from_raster(asset, raster, breaks, settings.pixel_area_ha)
        });

    Ok(AnalysisOutput {
        asset_urls,
        severity,
    })
}
