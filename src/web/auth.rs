use crate::middleware::ClientIp;
use crate::state::SharedState;
use crate::web::session::{self, SessionMode};
use crate::web::ApiError;
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub mode: SessionMode,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/demo", post(enter_demo))
        .route("/demo/exit", post(exit_demo))
        .with_state(state)
}

async fn login(
    ClientIp(ip): ClientIp,
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.limiters.login.check(&ip).await {
        tracing::warn!("Login rate limit exceeded for IP: {}", ip);
        return Err(ApiError::too_many_requests());
    }

    if payload.username != state.config.tester_username
        || payload.password != state.config.tester_password
    {
        tracing::info!("Rejected login for {:?}", payload.username);
        return Err(ApiError::new(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    }

    start_session(&state, SessionMode::Authenticated)
}

async fn enter_demo(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    start_session(&state, SessionMode::Demo)
}

/// Leaving demo mode drops whatever session the browser holds; a tester's
/// authenticated session is left alone.
async fn exit_demo(State(state): State<SharedState>, headers: HeaderMap) -> impl IntoResponse {
    let is_demo = session::extract_token(&headers)
        .and_then(|token| session::verify_session(&token, &state.config.session_key).ok())
        .map(|claims| claims.is_demo())
        .unwrap_or(true);

    let mut out = HeaderMap::new();
    if is_demo {
        if let Ok(value) = HeaderValue::from_str(&session::cleared_cookie(state.config.secure_cookies)) {
            out.insert(header::SET_COOKIE, value);
        }
    }
    (StatusCode::NO_CONTENT, out)
}

fn start_session(
    state: &SharedState,
    mode: SessionMode,
) -> Result<(HeaderMap, Json<SessionResponse>), ApiError> {
    let token = session::sign_session(mode, &state.config.session_key).map_err(|e| {
        tracing::error!("Failed to sign session: {}", e);
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Could not start a session")
    })?;
    let cookie = HeaderValue::from_str(&session::session_cookie(&token, state.config.secure_cookies))
        .map_err(|_| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Could not start a session"))?;

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, cookie);
    tracing::info!("Started {:?} session", mode);
    Ok((headers, Json(SessionResponse { mode })))
}

#[cfg(test)]
mod tests {
    use crate::testing::{peer, session_cookie, test_state, FakeBackend, MemoryStore};
    use crate::web::routes;
    use crate::web::session::SessionMode;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        Router,
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        routes(test_state(
            Arc::new(FakeBackend::default()),
            Arc::new(MemoryStore::default()),
        ))
    }

    fn login_request(username: &str, password: &str, ip: &str) -> Request<Body> {
        Request::post("/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .extension(peer(ip))
            .body(Body::from(format!(
                r#"{{"username":"{username}","password":"{password}"}}"#
            )))
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_sets_session_cookie() {
        let resp = app()
            .oneshot(login_request("tester", "s3cret", "10.0.0.1"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("session="));
        assert!(cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Secure"));
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password() {
        let resp = app()
            .oneshot(login_request("tester", "nope", "10.0.0.2"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_login_is_rate_limited() {
        let app = app();
        for _ in 0..5 {
            let resp = app
                .clone()
                .oneshot(login_request("tester", "nope", "10.0.0.3"))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
        let resp = app
            .oneshot(login_request("tester", "s3cret", "10.0.0.3"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_demo_exit_clears_only_demo_sessions() {
        let app = app();

        let resp = app
            .clone()
            .oneshot(
                Request::post("/auth/demo/exit")
                    .header(header::COOKIE, session_cookie(SessionMode::Demo))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        let cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));

        let resp = app
            .oneshot(
                Request::post("/auth/demo/exit")
                    .header(header::COOKIE, session_cookie(SessionMode::Authenticated))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(resp.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_demo_entry() {
        let resp = app()
            .oneshot(Request::post("/auth/demo").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key(header::SET_COOKIE));
    }
}
