use crate::db::HISTORY_LIMIT;
use crate::domain::models::AnalysisHistory;
use crate::state::SharedState;
use crate::web::session::SessionGate;
use crate::web::ApiError;
use axum::{extract::State, routing::get, Json, Router};

pub fn router(state: SharedState) -> Router {
    Router::new().route("/", get(recent)).with_state(state)
}

async fn recent(
    _session: SessionGate,
    State(state): State<SharedState>,
) -> Result<Json<Vec<AnalysisHistory>>, ApiError> {
    let rows = state.store.recent_history(HISTORY_LIMIT).await?;
    Ok(Json(rows))
}

#[cfg(test)]
mod tests {
    use crate::testing::{history_row, session_cookie, test_state, FakeBackend, MemoryStore};
    use crate::web::routes;
    use crate::web::session::SessionMode;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_history_is_capped() {
        let store = MemoryStore {
            history: (0..9).map(|i| history_row(&format!("a{i}"))).collect(),
            ..MemoryStore::default()
        };
        let app = routes(test_state(Arc::new(FakeBackend::default()), Arc::new(store)));

        let resp = app
            .oneshot(
                Request::get("/history")
                    .header(header::COOKIE, session_cookie(SessionMode::Demo))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0]["id"], "a0");
    }

    #[tokio::test]
    async fn test_history_store_down() {
        let app = routes(test_state(
            Arc::new(FakeBackend::default()),
            Arc::new(MemoryStore::unavailable()),
        ));
        let resp = app
            .oneshot(
                Request::get("/history")
                    .header(header::COOKIE, session_cookie(SessionMode::Authenticated))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
