use crate::domain::forms::ChatForm;
use crate::domain::models::ChatReply;
use crate::state::SharedState;
use crate::web::session::SessionGate;
use crate::web::ApiError;
use axum::{extract::State, routing::post, Json, Router};

pub fn router(state: SharedState) -> Router {
    Router::new().route("/", post(chat)).with_state(state)
}

async fn chat(
    _session: SessionGate,
    State(state): State<SharedState>,
    Json(form): Json<ChatForm>,
) -> Result<Json<ChatReply>, ApiError> {
    let request = form.validate()?;
    tracing::debug!(
        "Chat about {} via {}",
        request.analysis_id,
        request.model.as_str()
    );
    let reply = state.backend.chat(&request).await?;
    Ok(Json(reply))
}
