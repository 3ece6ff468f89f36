use crate::config::AppConfig;
use crate::db::Datastore;
use crate::middleware::Limiters;
use crate::services::backend::AnalysisBackend;
use crate::services::demo_corpus::DemoCorpus;
use crate::services::jobs::{JobBoard, PollSettings};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backend: Arc<dyn AnalysisBackend>,
    pub store: Arc<dyn Datastore>,
    pub demo: DemoCorpus,
    pub jobs: JobBoard,
    pub limiters: Limiters,
}

impl AppState {
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: self.config.job_poll_interval,
            max_polls: self.config.job_max_polls,
        }
    }
}

pub type SharedState = Arc<AppState>;
