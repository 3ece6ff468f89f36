use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One scraped comment as the dashboard receives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub username: String,
    pub text: String,
    /// -1.0 (unfavorable) ..= 1.0 (favorable). Not range checked.
    pub sentiment: f64,
    pub is_lead: bool,
    pub influence_score: u32,
    pub timestamp: DateTime<Utc>,
    pub topics: Vec<String>,
    pub engagement_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
}

/// Raw partition counts behind a [`SentimentBreakdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SentimentCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentCounts {
    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackTopic {
    pub topic: String,
    pub frequency: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Influencer {
    pub username: String,
    pub influence_score: u32,
    pub main_topic: String,
    pub engagement_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineBucket {
    /// Calendar day in UTC, `YYYY-MM-DD`.
    pub time: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub sentiment_score: u32,
    pub sentiment_breakdown: SentimentBreakdown,
    pub lead_percentage: u32,
    pub total_comments: usize,
    pub leads: Vec<Comment>,
    pub top_topics: Vec<TopicCount>,
    pub top_feedback_topics: Vec<FeedbackTopic>,
    #[serde(alias = "topInfluencers")]
    pub influencers: Vec<Influencer>,
    pub engagement_timeline: Vec<TimelineBucket>,
    /// Illustrative curve around `sentiment_score`, not history.
    pub vibe_trend: [u32; 5],
    pub creator_insights: Vec<String>,
    pub competitor_insights: Vec<String>,
}

// ============================================
// Backend wire types
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobTicket {
    pub job_id: String,
    #[serde(default = "pending_state")]
    pub status: JobState,
}

fn pending_state() -> JobState {
    JobState::Pending
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub status: JobState,
    #[serde(default)]
    pub embeddings_progress: u32,
    #[serde(default)]
    pub gemini_progress: u32,
    #[serde(default)]
    pub estimated_time_remaining: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub analysis_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadComment {
    pub username: String,
    pub text: String,
    pub timestamp: String,
    pub sentiment: f64,
}

impl From<&Comment> for LeadComment {
    fn from(c: &Comment) -> Self {
        Self {
            username: c.username.clone(),
            text: c.text.clone(),
            timestamp: c.timestamp.to_rfc3339(),
            sentiment: c.sentiment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicWithComments {
    pub topic: String,
    #[serde(alias = "frequency")]
    pub count: u64,
    #[serde(default)]
    pub comments: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Report payload the dashboard renders, whether it came from the backend
/// (`GET /api/analysis/{id}`) or from a locally analyzed corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub sentiment_score: u32,
    pub lead_percentage: u32,
    pub total_comments: u64,
    pub sentiment_breakdown: SentimentBreakdown,
    #[serde(default)]
    pub leads: Vec<LeadComment>,
    #[serde(default)]
    pub top_feedback_topics: Vec<TopicWithComments>,
    #[serde(default)]
    pub top_topics: Vec<TopicWithComments>,
    #[serde(default)]
    pub actionable_todos: Vec<String>,
    #[serde(default)]
    pub creator_insights: Vec<String>,
    #[serde(default)]
    pub competitor_insights: Vec<String>,
    #[serde(default)]
    pub engagement_timeline: Vec<TimelineBucket>,
    #[serde(default)]
    pub top_influencers: Vec<Influencer>,
    #[serde(default)]
    pub vibe_trend: Vec<i64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Report {
    pub fn from_analysis(
        analysis: &AnalysisResult,
        url: Option<String>,
        created_at: DateTime<Utc>,
        actionable_todos: Vec<String>,
    ) -> Self {
        Self {
            sentiment_score: analysis.sentiment_score,
            lead_percentage: analysis.lead_percentage,
            total_comments: analysis.total_comments as u64,
            sentiment_breakdown: analysis.sentiment_breakdown,
            leads: analysis.leads.iter().map(LeadComment::from).collect(),
            top_feedback_topics: analysis
                .top_feedback_topics
                .iter()
                .map(|t| TopicWithComments {
                    topic: t.topic.clone(),
                    count: t.frequency as u64,
                    comments: Vec::new(),
                })
                .collect(),
            top_topics: analysis
                .top_topics
                .iter()
                .map(|t| TopicWithComments {
                    topic: t.topic.clone(),
                    count: t.count as u64,
                    comments: Vec::new(),
                })
                .collect(),
            actionable_todos,
            creator_insights: analysis.creator_insights.clone(),
            competitor_insights: analysis.competitor_insights.clone(),
            engagement_timeline: analysis.engagement_timeline.clone(),
            top_influencers: analysis.influencers.clone(),
            vibe_trend: analysis.vibe_trend.iter().map(|v| i64::from(*v)).collect(),
            url,
            created_at: Some(created_at.to_rfc3339()),
        }
    }
}

// ============================================
// Chat
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatModel {
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "gemini-2.0-flash-exp")]
    Gemini2Flash,
}

impl ChatModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatModel::Gpt4o => "gpt-4o",
            ChatModel::Gemini2Flash => "gemini-2.0-flash-exp",
        }
    }
}

impl TryFrom<&str> for ChatModel {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "gpt-4o" => Ok(ChatModel::Gpt4o),
            "gemini-2.0-flash-exp" => Ok(ChatModel::Gemini2Flash),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub model: ChatModel,
    pub analysis_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

// ============================================
// Datastore records
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitlistSignup {
    pub name: String,
    pub email: String,
    pub channels: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSubmission {
    pub name: String,
    pub email: String,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisHistory {
    pub id: String,
    pub url: String,
    pub platform: String,
    pub sentiment_score: u32,
    pub lead_percentage: u32,
    pub total_comments: u32,
    pub created_at: String,
}
