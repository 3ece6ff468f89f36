//! In-memory stand-ins for the analysis backend and the datastore, shared
//! by unit and router tests.

use crate::config::AppConfig;
use crate::db::{Datastore, StoreError};
use crate::domain::models::{
    AnalysisHistory, ChatReply, ChatRequest, FeedbackSubmission, JobState, JobStatus, JobTicket,
    Report, WaitlistSignup,
};
use crate::middleware::Limiters;
use crate::services::backend::{AnalysisBackend, BackendError};
use crate::services::demo_corpus::DemoCorpus;
use crate::services::jobs::JobBoard;
use crate::state::{AppState, SharedState};
use crate::web::session::{sign_session, SessionMode};
use async_trait::async_trait;
use axum::extract::ConnectInfo;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_SESSION_KEY: &[u8] = b"quillion-test-session-key-32byte";
pub const FAKE_JOB_ID: &str = "job-123";

pub fn status(
    state: JobState,
    embeddings: u32,
    gemini: u32,
    analysis_id: Option<&str>,
    error: Option<&str>,
) -> JobStatus {
    JobStatus {
        status: state,
        embeddings_progress: embeddings,
        gemini_progress: gemini,
        estimated_time_remaining: None,
        error: error.map(str::to_string),
        analysis_id: analysis_id.map(str::to_string),
    }
}

#[derive(Default)]
pub struct FakeBackend {
    statuses: Mutex<VecDeque<Result<JobStatus, BackendError>>>,
    status_calls: AtomicUsize,
    submitted: Mutex<Vec<String>>,
    reports: HashMap<String, Report>,
}

impl FakeBackend {
    pub fn with_statuses(statuses: Vec<Result<JobStatus, BackendError>>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            ..Self::default()
        }
    }

    pub fn with_report(mut self, analysis_id: &str, report: Report) -> Self {
        self.reports.insert(analysis_id.to_string(), report);
        self
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisBackend for FakeBackend {
    async fn start_analysis(&self, url: &str) -> Result<JobTicket, BackendError> {
        self.submitted.lock().unwrap().push(url.to_string());
        Ok(JobTicket {
            job_id: FAKE_JOB_ID.to_string(),
            status: JobState::Pending,
        })
    }

    async fn job_status(&self, _job_id: &str) -> Result<JobStatus, BackendError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::NotFound))
    }

    async fn fetch_analysis(&self, analysis_id: &str) -> Result<Report, BackendError> {
        self.reports
            .get(analysis_id)
            .cloned()
            .ok_or(BackendError::NotFound)
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        Ok(ChatReply {
            response: format!("[{}] {}", request.model.as_str(), request.message),
        })
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub waitlist: Mutex<Vec<WaitlistSignup>>,
    pub feedback: Mutex<Vec<FeedbackSubmission>>,
    pub history: Vec<AnalysisHistory>,
    pub unavailable: bool,
}

impl MemoryStore {
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Rejected {
                status: 503,
                message: "store offline".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn insert_waitlist(&self, signup: &WaitlistSignup) -> Result<(), StoreError> {
        self.check()?;
        self.waitlist.lock().unwrap().push(signup.clone());
        Ok(())
    }

    async fn insert_feedback(&self, feedback: &FeedbackSubmission) -> Result<(), StoreError> {
        self.check()?;
        self.feedback.lock().unwrap().push(feedback.clone());
        Ok(())
    }

    async fn recent_history(&self, limit: usize) -> Result<Vec<AnalysisHistory>, StoreError> {
        self.check()?;
        Ok(self.history.iter().take(limit).cloned().collect())
    }
}

pub fn history_row(id: &str) -> AnalysisHistory {
    AnalysisHistory {
        id: id.to_string(),
        url: format!("https://youtu.be/{id}"),
        platform: "youtube".to_string(),
        sentiment_score: 70,
        lead_percentage: 12,
        total_comments: 340,
        created_at: "2024-06-01T09:30:00Z".to_string(),
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        api_base_url: "http://127.0.0.1:9".to_string(),
        supabase_url: "http://127.0.0.1:9".to_string(),
        supabase_key: "anon".to_string(),
        session_key: TEST_SESSION_KEY.to_vec(),
        secure_cookies: false,
        tester_username: "tester".to_string(),
        tester_password: "s3cret".to_string(),
        demo_corpus_size: 300,
        demo_seed: Some(11),
        job_poll_interval: Duration::from_millis(0),
        job_max_polls: 3,
        http_timeout: Duration::from_secs(5),
        cors_origins: vec!["http://localhost:5173".to_string()],
        trust_proxy: false,
    }
}

pub fn test_state(backend: Arc<dyn AnalysisBackend>, store: Arc<dyn Datastore>) -> SharedState {
    test_state_with(test_config(), backend, store)
}

pub fn test_state_with(
    config: AppConfig,
    backend: Arc<dyn AnalysisBackend>,
    store: Arc<dyn Datastore>,
) -> SharedState {
    let demo = DemoCorpus::generate(config.demo_corpus_size, config.demo_seed).unwrap();
    Arc::new(AppState {
        config: Arc::new(config),
        backend,
        store,
        demo,
        jobs: JobBoard::new(),
        limiters: Limiters::new(),
    })
}

/// Request extension `axum::serve` adds when run with connect info.
pub fn peer(ip: &str) -> ConnectInfo<SocketAddr> {
    ConnectInfo(SocketAddr::new(ip.parse().unwrap(), 40000))
}

/// `Cookie` header value carrying a freshly signed session.
pub fn session_cookie(mode: SessionMode) -> String {
    let token = sign_session(mode, TEST_SESSION_KEY).unwrap();
    format!("session={token}")
}
