use crate::domain::forms::{is_safe_id, validate_video_url};
use crate::domain::models::{JobState, JobTicket};
use crate::services::jobs::{spawn_tracking, TrackedJob, DEMO_JOB_ID};
use crate::state::SharedState;
use crate::web::session::SessionGate;
use crate::web::ApiError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct AnalyzePayload {
    #[serde(default)]
    pub url: String,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", post(start))
        .route("/:job_id", get(job))
        .with_state(state)
}

async fn start(
    SessionGate(session): SessionGate,
    State(state): State<SharedState>,
    Json(payload): Json<AnalyzePayload>,
) -> Result<(StatusCode, Json<JobTicket>), ApiError> {
    let url = validate_video_url(&payload.url)?;

    if session.is_demo() {
        return Ok((
            StatusCode::OK,
            Json(JobTicket {
                job_id: DEMO_JOB_ID.to_string(),
                status: JobState::Completed,
            }),
        ));
    }

    let ticket = state.backend.start_analysis(url).await?;
    if !is_safe_id(&ticket.job_id) {
        tracing::error!("Backend returned unusable job id {:?}", ticket.job_id);
        return Err(ApiError::new(
            StatusCode::BAD_GATEWAY,
            "Backend returned an invalid job id",
        ));
    }

    tracing::info!("Started analysis job {} for {}", ticket.job_id, url);
    state.jobs.register(&ticket.job_id, url).await;
    spawn_tracking(
        state.backend.clone(),
        state.jobs.clone(),
        ticket.job_id.clone(),
        state.poll_settings(),
    );

    Ok((StatusCode::ACCEPTED, Json(ticket)))
}

async fn job(
    _session: SessionGate,
    State(state): State<SharedState>,
    Path(job_id): Path<String>,
) -> Result<Json<TrackedJob>, ApiError> {
    if job_id == DEMO_JOB_ID {
        return Ok(Json(TrackedJob::demo()));
    }
    if !is_safe_id(&job_id) {
        return Err(ApiError::not_found("Job not found"));
    }
    state
        .jobs
        .get(&job_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Job not found"))
}
