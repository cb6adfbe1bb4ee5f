// src/jobs/tracker.rs
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::{JobId, JobResult};

/// Shared table of job results, polled by callers while workers fill it in
#[derive(Clone, Default)]
pub struct JobTracker {
    results: Arc<Mutex<HashMap<JobId, JobResult>>>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&self, result: JobResult) {
        self.results.lock().insert(result.job_id.clone(), result);
    }

    /// Current state of a job; `None` for ids this tracker never saw.
    pub fn poll(&self, job_id: &str) -> Option<JobResult> {
        self.results.lock().get(job_id).cloned()
    }

    /// Poll every `interval` until the job leaves the pending state.
    pub async fn wait_for(&self, job_id: &str, interval: Duration) -> Option<JobResult> {
        loop {
            let result = self.poll(job_id)?;
            if result.status.is_terminal() {
                return Some(result);
            }
            tokio::time::sleep(interval).await;
        }
    }

    pub fn len(&self) -> usize {
        self.results.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.lock().is_empty()
    }
}
