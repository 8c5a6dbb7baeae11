//! Background enrichment job registry
//!
//! The core orchestrator is a plain async call; this registry is the layer
//! that chooses to run it in the background. Each spawned run gets its own
//! cancellation token and a status slot the invocation surface can poll.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::models::BatchRunReport;
use crate::services::EnrichError;

/// Lifecycle of one background run
#[derive(Debug)]
enum JobState {
    Running,
    Finished(BatchRunReport),
    Failed(String),
}

struct JobSlot {
    collection: String,
    started_at: DateTime<Utc>,
    token: CancellationToken,
    state: RwLock<JobState>,
}

/// Point-in-time snapshot of a job, serialized to the caller
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub id: Uuid,
    pub collection: String,
    /// "running", "completed", "cancelled", or "failed"
    pub state: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<BatchRunReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Registry of background enrichment runs
#[derive(Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<Uuid, Arc<JobSlot>>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a run is currently active for `collection`
    pub fn is_running(&self, collection: &str) -> bool {
        let jobs = self.jobs.read().unwrap();
        jobs.values().any(|slot| {
            slot.collection == collection
                && matches!(*slot.state.read().unwrap(), JobState::Running)
        })
    }

    /// Spawn a run in the background and return its job id.
    ///
    /// `run` receives a fresh cancellation token and produces the core
    /// orchestrator future; the registry records the terminal state when the
    /// task settles.
    pub fn spawn<F, Fut>(&self, collection: &str, run: F) -> Uuid
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: std::future::Future<Output = Result<BatchRunReport, EnrichError>> + Send + 'static,
    {
        let id = Uuid::new_v4();
        let token = CancellationToken::new();
        let slot = Arc::new(JobSlot {
            collection: collection.to_string(),
            started_at: Utc::now(),
            token: token.clone(),
            state: RwLock::new(JobState::Running),
        });

        self.jobs.write().unwrap().insert(id, slot.clone());

        let future = run(token);
        tokio::spawn(async move {
            match future.await {
                Ok(report) => {
                    tracing::info!(
                        job_id = %id,
                        collection = %slot.collection,
                        succeeded = report.succeeded,
                        failed = report.failed,
                        cancelled = report.cancelled,
                        "Background enrichment run settled"
                    );
                    *slot.state.write().unwrap() = JobState::Finished(report);
                }
                Err(e) => {
                    tracing::error!(
                        job_id = %id,
                        collection = %slot.collection,
                        error = %e,
                        "Background enrichment run failed"
                    );
                    *slot.state.write().unwrap() = JobState::Failed(e.to_string());
                }
            }
        });

        id
    }

    /// Snapshot a job's status; `None` for an unknown id
    pub fn get(&self, id: Uuid) -> Option<JobStatus> {
        let jobs = self.jobs.read().unwrap();
        let slot = jobs.get(&id)?;
        let state = slot.state.read().unwrap();

        let (label, report, error) = match &*state {
            JobState::Running => ("running", None, None),
            JobState::Finished(report) if report.cancelled => {
                ("cancelled", Some(report.clone()), None)
            }
            JobState::Finished(report) => ("completed", Some(report.clone()), None),
            JobState::Failed(message) => ("failed", None, Some(message.clone())),
        };

        Some(JobStatus {
            id,
            collection: slot.collection.clone(),
            state: label.to_string(),
            started_at: slot.started_at,
            report,
            error,
        })
    }

    /// Request cancellation of a running job.
    ///
    /// Returns `None` for an unknown id, `Some(false)` if the job had
    /// already settled, `Some(true)` if cancellation was signalled. The run
    /// itself stops at its next batch boundary.
    pub fn cancel(&self, id: Uuid) -> Option<bool> {
        let jobs = self.jobs.read().unwrap();
        let slot = jobs.get(&id)?;

        let running = matches!(*slot.state.read().unwrap(), JobState::Running);
        if running {
            slot.token.cancel();
        }
        Some(running)
    }
}
