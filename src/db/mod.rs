//! External datastore: waitlist and feedback inserts plus the analysis
//! history listing, served by Supabase's PostgREST API.

use crate::domain::models::{AnalysisHistory, FeedbackSubmission, WaitlistSignup};
use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Rows shown in the dashboard's recent analyses list.
pub const HISTORY_LIMIT: usize = 6;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("datastore unreachable: {0}")]
    Http(#[from] reqwest::Error),
    #[error("datastore rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

#[async_trait]
pub trait Datastore: Send + Sync {
    async fn insert_waitlist(&self, signup: &WaitlistSignup) -> Result<(), StoreError>;
    async fn insert_feedback(&self, feedback: &FeedbackSubmission) -> Result<(), StoreError>;
    async fn recent_history(&self, limit: usize) -> Result<Vec<AnalysisHistory>, StoreError>;
}

#[derive(Clone)]
pub struct SupabaseStore {
    client: reqwest::Client,
    rest_url: String,
    api_key: String,
}

impl SupabaseStore {
    pub fn new(project_url: &str, api_key: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        })
    }

    fn request(&self, method: Method, table: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.rest_url, table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn insert<T: Serialize + Sync>(&self, table: &str, row: &T) -> Result<(), StoreError> {
        let resp = self
            .request(Method::POST, table)
            .header("Prefer", "return=minimal")
            .json(&[row])
            .send()
            .await?;
        check_status(resp).await?;
        tracing::info!("Inserted row into {}", table);
        Ok(())
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    tracing::error!("Datastore returned {}: {}", status, message);
    Err(StoreError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl Datastore for SupabaseStore {
    async fn insert_waitlist(&self, signup: &WaitlistSignup) -> Result<(), StoreError> {
        self.insert("waitlist", signup).await
    }

    async fn insert_feedback(&self, feedback: &FeedbackSubmission) -> Result<(), StoreError> {
        self.insert("feedback", feedback).await
    }

    async fn recent_history(&self, limit: usize) -> Result<Vec<AnalysisHistory>, StoreError> {
        let resp = self
            .request(Method::GET, "analysis_history")
            .query(&[
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;
        let rows: Vec<AnalysisHistory> = check_status(resp).await?.json().await?;
        Ok(rows)
    }
}
