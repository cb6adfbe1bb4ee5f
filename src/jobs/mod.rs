//! Asynchronous fire severity jobs
//!
//! A job computes the requested burn indices for one fire event, hands each
//! raster to an [`AssetStore`] and records a [`JobResult`] that callers poll
//! through the [`JobTracker`]. Jobs move from `pending` to either `complete`
//! or `failed` and are never retried.

pub mod store;
pub mod tracker;
pub mod worker;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AnalysisSettings;
use crate::raster::SpectralRaster;
use crate::severity::SeveritySummary;

pub use store::{AssetStore, DirectoryAssetStore, MemoryAssetStore};
pub use tracker::JobTracker;
pub use worker::{execute, JobQueue, JobWorker};

pub type JobId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Complete,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

/// Everything needed to run one severity analysis
#[derive(Debug, Clone)]
pub struct SeverityRequest {
    pub fire_event_name: String,
    pub prefire: SpectralRaster,
    pub postfire: SpectralRaster,
    pub settings: AnalysisSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobResult {
    pub job_id: JobId,
    pub fire_event_name: String,
    pub status: JobStatus,
    pub submitted_at: DateTime<Utc>,
    /// Asset name (`dnbr`, `prefire_nbr`, ...) to stored URL
    pub asset_urls: BTreeMap<String, String>,
    pub severity: Option<SeveritySummary>,
    pub error_message: Option<String>,
    pub execution_time_ms: Option<f64>,
}

impl JobResult {
    pub fn pending(job_id: &str, fire_event_name: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            fire_event_name: fire_event_name.to_string(),
            status: JobStatus::Pending,
            submitted_at: Utc::now(),
            asset_urls: BTreeMap::new(),
            severity: None,
            error_message: None,
            execution_time_ms: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Complete
    }
}
