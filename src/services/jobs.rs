use crate::domain::models::{JobState, JobStatus};
use crate::services::backend::{AnalysisBackend, BackendError};
use crate::services::demo_corpus::DEMO_ANALYSIS_ID;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

pub const DEMO_JOB_ID: &str = "demo";

#[derive(Debug, Error)]
pub enum PollError {
    #[error("{0}")]
    Failed(String),
    #[error("{0}")]
    Backend(#[from] BackendError),
    #[error("analysis still running after {0} status checks")]
    TimedOut(u32),
}

#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_polls: u32,
}

/// Last known state of a submitted analysis job.
#[derive(Debug, Clone, Serialize)]
pub struct TrackedJob {
    pub job_id: String,
    pub url: String,
    pub status: JobState,
    pub embeddings_progress: u32,
    pub gemini_progress: u32,
    pub estimated_time_remaining: Option<u32>,
    pub analysis_id: Option<String>,
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl TrackedJob {
    fn new(job_id: &str, url: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            url: url.to_string(),
            status: JobState::Pending,
            embeddings_progress: 0,
            gemini_progress: 0,
            estimated_time_remaining: None,
            analysis_id: None,
            error: None,
            updated_at: Utc::now(),
        }
    }

    /// Demo mode skips the backend; its job is finished from the start.
    pub fn demo() -> Self {
        Self {
            status: JobState::Completed,
            embeddings_progress: 100,
            gemini_progress: 100,
            analysis_id: Some(DEMO_ANALYSIS_ID.to_string()),
            ..Self::new(DEMO_JOB_ID, "")
        }
    }
}

#[derive(Clone, Default)]
pub struct JobBoard {
    jobs: Arc<RwLock<HashMap<String, TrackedJob>>>,
}

impl JobBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, job_id: &str, url: &str) {
        let mut jobs = self.jobs.write().await;
        jobs.insert(job_id.to_string(), TrackedJob::new(job_id, url));
    }

    pub async fn observe(&self, job_id: &str, status: &JobStatus) {
        let mut jobs = self.jobs.write().await;
        if let Some(job) = jobs.get_mut(job_id) {
            job.status = status.status;
            job.embeddings_progress = status.embeddings_progress;
            job.gemini_progress = status.gemini_progress;
            job.estimated_time_remaining = status.estimated_time_remaining;
            job.analysis_id = status.analysis_id.clone();
            job.error = status.error.clone();
            job.updated_at = Utc::now();
        }
    }

    pub async fn fail(&self, job_id: &str, error: String) {
        let mut jobs = self.jobs.write().await;
        if let Some(job) = jobs.get_mut(job_id) {
            job.status = JobState::Failed;
            job.error = Some(error);
            job.updated_at = Utc::now();
        }
    }

    pub async fn get(&self, job_id: &str) -> Option<TrackedJob> {
        self.jobs.read().await.get(job_id).cloned()
    }

    /// Drops finished jobs not touched for `max_age`. Returns how many went.
    pub async fn prune_finished(&self, max_age: chrono::Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| !(job.status.is_terminal() && job.updated_at < cutoff));
        before - jobs.len()
    }
}

/// Polls the backend until the job completes (returns the analysis id),
/// fails, errors, or runs out of polls. Every status seen lands on `board`.
pub async fn wait_for_analysis(
    backend: &dyn AnalysisBackend,
    board: &JobBoard,
    job_id: &str,
    settings: PollSettings,
) -> Result<String, PollError> {
    // At least one status check, whatever the budget.
    let max_polls = settings.max_polls.max(1);
    for attempt in 1..=max_polls {
        let status = backend.job_status(job_id).await?;
        board.observe(job_id, &status).await;

        match status.status {
            JobState::Completed => {
                if let Some(analysis_id) = status.analysis_id {
                    return Ok(analysis_id);
                }
                tracing::warn!("Job {} completed without an analysis id", job_id);
            }
            JobState::Failed => {
                return Err(PollError::Failed(
                    status.error.unwrap_or_else(|| "Analysis failed".to_string()),
                ));
            }
            JobState::Pending | JobState::Processing => {
                tracing::debug!(
                    "Job {} at embeddings {}% / gemini {}% (poll {})",
                    job_id,
                    status.embeddings_progress,
                    status.gemini_progress,
                    attempt
                );
            }
        }

        if attempt < max_polls {
            tokio::time::sleep(settings.interval).await;
        }
    }
    Err(PollError::TimedOut(max_polls))
}

pub fn spawn_tracking(
    backend: Arc<dyn AnalysisBackend>,
    board: JobBoard,
    job_id: String,
    settings: PollSettings,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match wait_for_analysis(backend.as_ref(), &board, &job_id, settings).await {
            Ok(analysis_id) => {
                tracing::info!("Job {} completed with analysis {}", job_id, analysis_id);
            }
            Err(e) => {
                tracing::error!("Job {} failed: {}", job_id, e);
                board.fail(&job_id, e.to_string()).await;
            }
        }
    })
}
