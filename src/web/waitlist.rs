use crate::domain::forms::WaitlistForm;
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
    Router::new().route("/", post(join)).with_state(state)
}

async fn join(
    ClientIp(ip): ClientIp,
    State(state): State<SharedState>,
    Json(form): Json<WaitlistForm>,
) -> Result<StatusCode, ApiError> {
    if !state.limiters.waitlist.check(&ip).await {
        tracing::warn!("Rate limit exceeded for waitlist signup from IP: {}", ip);
        return Err(ApiError::too_many_requests());
    }

    let signup = form.validate()?;
    state.store.insert_waitlist(&signup).await.map_err(|e| {
        tracing::error!("Waitlist insert failed: {}", e);
        ApiError::new(
            StatusCode::BAD_GATEWAY,
            "Something went wrong. Please try again.",
        )
    })?;

    tracing::info!("New waitlist signup");
    Ok(StatusCode::CREATED)
}
