use crate::domain::forms::FeedbackForm;
use crate::middleware::ClientIp;
use crate::state::SharedState;
use crate::web::ApiError;
use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};

pub fn router(state: SharedState) -> Router {
    Router::new().route("/", post(submit)).with_state(state)
}

async fn submit(
    ClientIp(ip): ClientIp,
    State(state): State<SharedState>,
    Json(form): Json<FeedbackForm>,
) -> Result<StatusCode, ApiError> {
    if !state.limiters.feedback.check(&ip).await {
        tracing::warn!("Rate limit exceeded for feedback from IP: {}", ip);
        return Err(ApiError::too_many_requests());
    }

    let feedback = form.validate()?;
    state.store.insert_feedback(&feedback).await.map_err(|e| {
        tracing::error!("Feedback insert failed: {}", e);
        ApiError::new(
            StatusCode::BAD_GATEWAY,
            "Failed to submit feedback. Please try again.",
        )
    })?;

    Ok(StatusCode::CREATED)
}
