pub mod analyze;
pub mod auth;
pub mod chat;
pub mod feedback;
pub mod history;
pub mod report;
pub mod session;
pub mod waitlist;

use crate::db::StoreError;
use crate::domain::forms::FormError;
use crate::services::backend::BackendError;
use crate::state::SharedState;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

async fn health() -> &'static str {
    "OK"
}

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth::router(state.clone()))
        .nest("/analyze", analyze::router(state.clone()))
        .nest("/report", report::router(state.clone()))
        .nest("/chat", chat::router(state.clone()))
        .nest("/history", history::router(state.clone()))
        .nest("/waitlist", waitlist::router(state.clone()))
        .nest("/feedback", feedback::router(state))
}

/// Error body every route answers with: `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Not signed in")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn too_many_requests() -> Self {
        Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests. Please wait a minute and try again.",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<FormError> for ApiError {
    fn from(err: FormError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, err.0)
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound => Self::not_found("Analysis not found"),
            other => {
                tracing::error!("Analysis backend error: {}", other);
                Self::new(StatusCode::BAD_GATEWAY, other.to_string())
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        tracing::error!("Datastore error: {}", err);
        Self::new(StatusCode::BAD_GATEWAY, "Something went wrong. Please try again.")
    }
}
