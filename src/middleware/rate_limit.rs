//! In-memory sliding-window rate limiter for the public form endpoints.
use crate::state::SharedState;
use axum::{
    async_trait,
    extract::{ConnectInfo, FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use std::collections::{HashMap, VecDeque};
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct RateLimiter {
    hits: Arc<RwLock<HashMap<String, VecDeque<Instant>>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window_secs: u64) -> Self {
        Self {
            hits: Arc::new(RwLock::new(HashMap::new())),
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    /// Records a hit for `client` and says whether it is within budget.
    /// Rejected hits are not recorded.
    pub async fn check(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut hits = self.hits.write().await;
        let recent = hits.entry(client.to_string()).or_default();
        expire(recent, now, self.window);

        if recent.len() >= self.max_requests {
            return false;
        }
        recent.push_back(now);
        true
    }

    /// Forgets clients with no hits left in the window; returns how many.
    pub async fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut hits = self.hits.write().await;
        let before = hits.len();
        hits.retain(|_, recent| {
            expire(recent, now, self.window);
            !recent.is_empty()
        });
        before - hits.len()
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.hits.read().await.len()
    }
}

/// Hits are pushed in time order, so expired ones sit at the front.
fn expire(recent: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while recent
        .front()
        .is_some_and(|&hit| now.duration_since(hit) >= window)
    {
        recent.pop_front();
    }
}

/// One limiter per public surface.
#[derive(Clone)]
pub struct Limiters {
    pub login: RateLimiter,
    pub waitlist: RateLimiter,
    pub feedback: RateLimiter,
}

impl Limiters {
    pub fn new() -> Self {
        Self {
            login: RateLimiter::new(5, 60),
            waitlist: RateLimiter::new(10, 60),
            feedback: RateLimiter::new(10, 60),
        }
    }

    pub async fn cleanup(&self) {
        let dropped = self.login.cleanup().await
            + self.waitlist.cleanup().await
            + self.feedback.cleanup().await;
        tracing::debug!("Rate limiter cleanup: {} idle clients dropped", dropped);
    }
}

impl Default for Limiters {
    fn default() -> Self {
        Self::new()
    }
}

/// Rate limit key for a request.
///
/// The peer address is used unless `trust_proxy` is set, in which case the
/// first `x-forwarded-for` entry wins when it is a well-formed address.
pub fn client_key(headers: &HeaderMap, peer: Option<IpAddr>, trust_proxy: bool) -> String {
    let forwarded = trust_proxy
        .then(|| headers.get("x-forwarded-for"))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok());

    match forwarded.or(peer) {
        Some(ip) => ip.to_string(),
        None => "unknown".to_string(),
    }
}

/// Extracts the rate limit key; needs the server to run with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub struct ClientIp(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
    SharedState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let shared_state = SharedState::from_ref(state);
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        Ok(ClientIp(client_key(
            &parts.headers,
            peer,
            shared_state.config.trust_proxy,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(raw: &str) -> Option<IpAddr> {
        Some(raw.parse().unwrap())
    }

    #[tokio::test]
    async fn test_budget_per_client() {
        let limiter = RateLimiter::new(2, 60);

        assert!(limiter.check("198.51.100.1").await);
        assert!(limiter.check("198.51.100.1").await);
        assert!(!limiter.check("198.51.100.1").await);
        assert!(!limiter.check("198.51.100.1").await);

        assert!(limiter.check("198.51.100.2").await);
    }

    #[tokio::test]
    async fn test_window_expiry_and_cleanup() {
        let limiter = RateLimiter::new(1, 1);
        assert!(limiter.check("a").await);
        assert!(limiter.check("b").await);
        assert!(!limiter.check("a").await);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(limiter.check("a").await);

        assert_eq!(limiter.cleanup().await, 1);
        assert_eq!(limiter.tracked().await, 1);
    }

    #[test]
    fn test_forwarded_header_ignored_unless_trusted() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());

        assert_eq!(client_key(&headers, ip("192.0.2.10"), false), "192.0.2.10");
        assert_eq!(client_key(&headers, ip("192.0.2.10"), true), "203.0.113.7");
    }

    #[test]
    fn test_malformed_or_missing_header_falls_back_to_peer() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_key(&headers, ip("192.0.2.10"), true), "192.0.2.10");

        headers.insert("x-forwarded-for", "not-an-ip".parse().unwrap());
        assert_eq!(client_key(&headers, ip("2001:db8::1"), true), "2001:db8::1");

        assert_eq!(client_key(&HeaderMap::new(), None, false), "unknown");
    }
}
