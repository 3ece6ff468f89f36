use crate::state::SharedState;
use crate::web::ApiError;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const SESSION_HOURS: i64 = 24;

/// Either a tester who logged in, or a visitor who entered demo mode.
/// Both may open the dashboard and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Authenticated,
    Demo,
}

impl SessionMode {
    fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Authenticated => "authenticated",
            SessionMode::Demo => "demo",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionClaims {
    pub session_id: Uuid,
    pub mode: SessionMode,
    pub exp: i64,
}

impl SessionClaims {
    pub fn is_demo(&self) -> bool {
        self.mode == SessionMode::Demo
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid token format")]
    Invalid,
    #[error("signature mismatch")]
    Signature,
    #[error("expired")]
    Expired,
    #[error("bad mode")]
    Mode,
}

pub fn sign_session(mode: SessionMode, key: &[u8]) -> Result<String, SessionError> {
    let exp = Utc::now() + Duration::hours(SESSION_HOURS);
    sign_until(Uuid::new_v4(), mode, exp.timestamp(), key)
}

fn sign_until(
    session_id: Uuid,
    mode: SessionMode,
    exp: i64,
    key: &[u8],
) -> Result<String, SessionError> {
    let payload = format!("{}|{}|{}", session_id, mode.as_str(), exp);
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| SessionError::Invalid)?;
    mac.update(payload.as_bytes());
    let sig = mac.finalize().into_bytes();
    Ok(format!(
        "{}.{}",
        general_purpose::STANDARD.encode(payload.as_bytes()),
        general_purpose::STANDARD.encode(sig)
    ))
}

pub fn verify_session(token: &str, key: &[u8]) -> Result<SessionClaims, SessionError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 2 {
        return Err(SessionError::Invalid);
    }
    let payload_bytes = general_purpose::STANDARD
        .decode(parts[0])
        .map_err(|_| SessionError::Invalid)?;
    let sig_bytes = general_purpose::STANDARD
        .decode(parts[1])
        .map_err(|_| SessionError::Invalid)?;

    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| SessionError::Invalid)?;
    mac.update(&payload_bytes);
    mac.verify_slice(&sig_bytes)
        .map_err(|_| SessionError::Signature)?;

    let payload = String::from_utf8(payload_bytes).map_err(|_| SessionError::Invalid)?;
    let pieces: Vec<&str> = payload.split('|').collect();
    if pieces.len() != 3 {
        return Err(SessionError::Invalid);
    }
    let session_id = Uuid::parse_str(pieces[0]).map_err(|_| SessionError::Invalid)?;
    let mode = parse_mode(pieces[1])?;
    let exp: i64 = pieces[2].parse().map_err(|_| SessionError::Invalid)?;
    if Utc::now().timestamp() > exp {
        return Err(SessionError::Expired);
    }
    Ok(SessionClaims {
        session_id,
        mode,
        exp,
    })
}

fn parse_mode(raw: &str) -> Result<SessionMode, SessionError> {
    match raw {
        "authenticated" => Ok(SessionMode::Authenticated),
        "demo" => Ok(SessionMode::Demo),
        _ => Err(SessionError::Mode),
    }
}

pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth) = headers.get(axum::http::header::AUTHORIZATION) {
        if let Ok(val) = auth.to_str() {
            if let Some(bearer) = val.strip_prefix("Bearer ") {
                return Some(bearer.trim().to_string());
            }
        }
    }
    if let Some(cookie) = headers.get(axum::http::header::COOKIE) {
        if let Ok(val) = cookie.to_str() {
            for pair in val.split(';') {
                let trimmed = pair.trim();
                if let Some(rest) = trimmed.strip_prefix("session=") {
                    if !rest.is_empty() {
                        return Some(rest.to_string());
                    }
                }
            }
        }
    }
    None
}

pub fn session_cookie(token: &str, secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!(
        "session={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{secure_flag}",
        SESSION_HOURS * 3600
    )
}

pub fn cleared_cookie(secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!("session=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0{secure_flag}")
}

// ============================================
// Axum extractor guarding dashboard and report routes
// ============================================

/// Rejects the request with 401 unless it carries a valid session of
/// either mode.
pub struct SessionGate(pub SessionClaims);

#[async_trait]
impl<S> FromRequestParts<S> for SessionGate
where
    S: Send + Sync,
    SharedState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let shared_state = SharedState::from_ref(state);

        let token = extract_token(&parts.headers).ok_or_else(ApiError::unauthorized)?;

        let claims = verify_session(&token, &shared_state.config.session_key).map_err(|e| {
            tracing::warn!("Session verification failed: {}", e);
            ApiError::unauthorized()
        })?;
        tracing::debug!(
            "Session {} ({:?}) valid until {}",
            claims.session_id,
            claims.mode,
            claims.exp
        );

        Ok(SessionGate(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn test_sign_and_verify() {
        let token = sign_session(SessionMode::Demo, KEY).unwrap();
        let claims = verify_session(&token, KEY).unwrap();
        assert!(claims.is_demo());
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_rejects_foreign_key_and_tampering() {
        let token = sign_session(SessionMode::Authenticated, KEY).unwrap();
        assert!(matches!(
            verify_session(&token, b"another-key-another-key-another!"),
            Err(SessionError::Signature)
        ));

        let (_, sig) = token.split_once('.').unwrap();
        let forged_payload = general_purpose::STANDARD.encode(format!(
            "{}|authenticated|{}",
            Uuid::new_v4(),
            i64::MAX
        ));
        assert!(matches!(
            verify_session(&format!("{forged_payload}.{sig}"), KEY),
            Err(SessionError::Signature)
        ));
        assert!(matches!(
            verify_session("not-a-token", KEY),
            Err(SessionError::Invalid)
        ));
    }

    #[test]
    fn test_expired_session() {
        let past = Utc::now().timestamp() - 10;
        let token = sign_until(Uuid::new_v4(), SessionMode::Authenticated, past, KEY).unwrap();
        assert!(matches!(
            verify_session(&token, KEY),
            Err(SessionError::Expired)
        ));
    }

    #[test]
    fn test_extract_token_from_cookie_or_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            "theme=dark; session=abc.def".parse().unwrap(),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("abc.def"));

        headers.insert(
            axum::http::header::AUTHORIZATION,
            "Bearer xyz.123".parse().unwrap(),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("xyz.123"));

        let mut cleared = HeaderMap::new();
        cleared.insert(axum::http::header::COOKIE, "session=".parse().unwrap());
        assert_eq!(extract_token(&cleared), None);
    }
}
