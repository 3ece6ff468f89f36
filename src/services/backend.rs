use crate::domain::models::{AnalyzeRequest, ChatReply, ChatRequest, JobStatus, JobTicket, Report};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend unreachable: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{detail}")]
    Status { status: u16, detail: String },
    #[error("not found")]
    NotFound,
    #[error("unexpected backend response: {0}")]
    Decode(String),
}

/// The analysis backend: job submission, status polling, stored analyses
/// and the chat proxy.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn start_analysis(&self, url: &str) -> Result<JobTicket, BackendError>;
    async fn job_status(&self, job_id: &str) -> Result<JobStatus, BackendError>;
    async fn fetch_analysis(&self, analysis_id: &str) -> Result<Report, BackendError>;
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, BackendError>;
}

#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }
}

/// Decodes a success body, or turns an error response into the backend's
/// `detail` message (falling back to `fallback`).
async fn read_json<T: DeserializeOwned>(
    resp: reqwest::Response,
    fallback: &str,
) -> Result<T, BackendError> {
    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
        return Err(BackendError::NotFound);
    }
    if !status.is_success() {
        let detail = resp
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("detail")
                    .and_then(|d| d.as_str())
                    .map(|d| d.to_string())
            })
            .unwrap_or_else(|| fallback.to_string());
        tracing::warn!("Backend returned {}: {}", status, detail);
        return Err(BackendError::Status {
            status: status.as_u16(),
            detail,
        });
    }

    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| BackendError::Decode(e.to_string()))
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    async fn start_analysis(&self, url: &str) -> Result<JobTicket, BackendError> {
        let resp = self
            .client
            .post(self.endpoint("analyze"))
            .json(&AnalyzeRequest {
                url: url.to_string(),
            })
            .send()
            .await?;
        let ticket: JobTicket = read_json(resp, "Failed to start analysis").await?;
        tracing::info!("Backend accepted analysis job {} for {}", ticket.job_id, url);
        Ok(ticket)
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatus, BackendError> {
        let resp = self
            .client
            .get(self.endpoint(&format!("status/{job_id}")))
            .send()
            .await?;
        read_json(resp, "Failed to get job status").await
    }

    async fn fetch_analysis(&self, analysis_id: &str) -> Result<Report, BackendError> {
        let resp = self
            .client
            .get(self.endpoint(&format!("analysis/{analysis_id}")))
            .send()
            .await?;
        read_json(resp, "Failed to fetch analysis").await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        tracing::debug!(
            "Chat request for analysis {} using {}",
            request.analysis_id,
            request.model.as_str()
        );
        let resp = self
            .client
            .post(self.endpoint("chat"))
            .json(request)
            .send()
            .await?;
        read_json(resp, "Failed to get chat response").await
    }
}
