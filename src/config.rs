use crate::services::demo_corpus::DEFAULT_DEMO_SIZE;
use base64::{engine::general_purpose, Engine as _};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: &str = "3000";
const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";
const DEFAULT_TESTER_USERNAME: &str = "admin";
const DEFAULT_TESTER_PASSWORD: &str = "admin123";
const MIN_SESSION_KEY_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} missing")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub api_base_url: String,
    pub supabase_url: String,
    pub supabase_key: String,
    pub session_key: Vec<u8>,
    pub secure_cookies: bool,
    pub tester_username: String,
    pub tester_password: String,
    pub demo_corpus_size: usize,
    pub demo_seed: Option<u64>,
    pub job_poll_interval: Duration,
    pub job_max_polls: u32,
    pub http_timeout: Duration,
    pub cors_origins: Vec<String>,
    /// Key rate limits on `x-forwarded-for` instead of the peer address.
    /// Only safe behind a proxy that overwrites the header.
    pub trust_proxy: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| {
            let port = get("PORT").unwrap_or_else(|| DEFAULT_PORT.to_string());
            format!("0.0.0.0:{}", port)
        });

        let session_key_b64 = get("SESSION_KEY").ok_or(ConfigError::Missing("SESSION_KEY"))?;
        let session_key = general_purpose::STANDARD
            .decode(session_key_b64.trim())
            .map_err(|e| ConfigError::Invalid {
                name: "SESSION_KEY",
                reason: e.to_string(),
            })?;
        if session_key.len() < MIN_SESSION_KEY_LEN {
            return Err(ConfigError::Invalid {
                name: "SESSION_KEY",
                reason: format!("needs at least {MIN_SESSION_KEY_LEN} bytes"),
            });
        }

        let tester_username =
            get("TESTER_USERNAME").unwrap_or_else(|| DEFAULT_TESTER_USERNAME.to_string());
        let tester_password = match get("TESTER_PASSWORD") {
            Some(password) => password,
            None => {
                tracing::warn!("TESTER_PASSWORD not set, using the built-in beta password");
                DEFAULT_TESTER_PASSWORD.to_string()
            }
        };

        let demo_corpus_size = parse_positive(&get, "DEMO_CORPUS_SIZE", DEFAULT_DEMO_SIZE)?;

        Ok(Self {
            bind_addr,
            api_base_url: get("QUILLION_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            supabase_url: get("SUPABASE_URL").ok_or(ConfigError::Missing("SUPABASE_URL"))?,
            supabase_key: get("SUPABASE_KEY").ok_or(ConfigError::Missing("SUPABASE_KEY"))?,
            session_key,
            secure_cookies: get("PRODUCTION").is_some() || get("RAILWAY_ENVIRONMENT").is_some(),
            tester_username,
            tester_password,
            demo_corpus_size,
            demo_seed: get("DEMO_SEED")
                .map(|raw| parse_value("DEMO_SEED", &raw))
                .transpose()?,
            job_poll_interval: Duration::from_secs(parse_positive(
                &get,
                "JOB_POLL_INTERVAL_SECS",
                10,
            )?),
            job_max_polls: parse_positive(&get, "JOB_MAX_POLLS", 60)?,
            http_timeout: Duration::from_secs(parse_positive(&get, "HTTP_TIMEOUT_SECS", 30)?),
            trust_proxy: parse_or(&get, "TRUST_PROXY", false)?,
            cors_origins: get("CORS_ORIGINS")
                .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
        })
    }
}

fn parse_value<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => parse_value(name, &raw),
        None => Ok(default),
    }
}

/// Counts, sizes and durations where zero would disable the feature.
fn parse_positive<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + Default + PartialEq,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    let value = parse_or(get, name, default)?;
    if value == T::default() {
        return Err(ConfigError::Invalid {
            name,
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}
