use crate::domain::models::{ChatModel, ChatRequest, FeedbackSubmission, WaitlistSignup};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

pub const MAX_CHANNELS: usize = 5;
pub const MAX_FEEDBACK_LEN: usize = 5000;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

static YOUTUBE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.)?(?:youtube\.com/watch\?v=[\w-]+|youtu\.be/[\w-]+)")
        .expect("youtube pattern")
});

/// Rejection message shown next to the offending form field.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct FormError(pub String);

impl FormError {
    fn new(msg: &str) -> Self {
        Self(msg.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct WaitlistForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub channels: Vec<String>,
}

impl WaitlistForm {
    pub fn validate(self) -> Result<WaitlistSignup, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::new("Name is required"));
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(FormError::new("Email is required"));
        }
        if !EMAIL_RE.is_match(email) {
            return Err(FormError::new("Please enter a valid email"));
        }

        let channels: Vec<String> = self
            .channels
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string())
            .collect();
        if channels.len() > MAX_CHANNELS {
            return Err(FormError(format!("At most {MAX_CHANNELS} channels")));
        }

        Ok(WaitlistSignup {
            name: name.to_string(),
            email: email.to_string(),
            channels: if channels.is_empty() {
                None
            } else {
                Some(channels)
            },
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct FeedbackForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub feedback: String,
}

impl FeedbackForm {
    pub fn validate(self) -> Result<FeedbackSubmission, FormError> {
        if self.name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.feedback.trim().is_empty()
        {
            return Err(FormError::new("Please fill in all fields"));
        }
        if self.feedback.chars().count() > MAX_FEEDBACK_LEN {
            return Err(FormError(format!(
                "Feedback is limited to {MAX_FEEDBACK_LEN} characters"
            )));
        }
        Ok(FeedbackSubmission {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            feedback: self.feedback,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, alias = "analysisId")]
    pub analysis_id: Option<String>,
}

impl ChatForm {
    pub fn validate(self) -> Result<ChatRequest, FormError> {
        let analysis_id = self
            .analysis_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| FormError::new("No analysis ID provided for chat"))?;
        if self.message.trim().is_empty() {
            return Err(FormError::new("Message is required"));
        }
        let model = ChatModel::try_from(self.model.as_str())
            .map_err(|_| FormError(format!("Unsupported model: {}", self.model)))?;
        Ok(ChatRequest {
            message: self.message,
            model,
            analysis_id,
        })
    }
}

/// Checks the URL submitted for analysis; returns it trimmed.
pub fn validate_video_url(raw: &str) -> Result<&str, FormError> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(FormError::new("Please enter a URL"));
    }
    if !YOUTUBE_RE.is_match(url) {
        return Err(FormError::new("Please enter a valid YouTube URL"));
    }
    Ok(url)
}

/// Job and analysis ids end up in backend URL paths.
pub fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
