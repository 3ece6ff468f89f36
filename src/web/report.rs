use crate::analytics::{top_leads, DEFAULT_LEAD_PREVIEW};
use crate::domain::forms::is_safe_id;
use crate::domain::models::{LeadComment, Report};
use crate::services::demo_corpus::{DEMO_ANALYSIS_ID, DEMO_SOURCE_URL};
use crate::state::SharedState;
use crate::web::session::{SessionClaims, SessionGate};
use crate::web::ApiError;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

const DEMO_TODOS: [&str; 3] = [
    "Implement requested features",
    "Address user concerns",
    "Engage with leads",
];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    #[serde(flatten)]
    pub report: Report,
    pub lead_preview: Vec<LeadComment>,
}

#[derive(Deserialize)]
pub struct LeadsQuery {
    pub limit: Option<usize>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/:id", get(report))
        .route("/:id/leads", get(leads))
        .with_state(state)
}

async fn report(
    SessionGate(session): SessionGate,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ReportResponse>, ApiError> {
    let report = load_report(&state, &session, &id).await?;
    let lead_preview = top_leads(&report.leads, DEFAULT_LEAD_PREVIEW);
    Ok(Json(ReportResponse {
        report,
        lead_preview,
    }))
}

async fn leads(
    SessionGate(session): SessionGate,
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<LeadsQuery>,
) -> Result<Json<Vec<LeadComment>>, ApiError> {
    let report = load_report(&state, &session, &id).await?;
    let limit = query.limit.unwrap_or(DEFAULT_LEAD_PREVIEW);
    Ok(Json(top_leads(&report.leads, limit)))
}

/// Demo sessions always see the demo corpus, whatever id they ask for.
async fn load_report(
    state: &SharedState,
    session: &SessionClaims,
    id: &str,
) -> Result<Report, ApiError> {
    if id == DEMO_ANALYSIS_ID || session.is_demo() {
        return Ok(Report::from_analysis(
            state.demo.analysis(),
            Some(DEMO_SOURCE_URL.to_string()),
            state.demo.generated_at,
            DEMO_TODOS.iter().map(|t| t.to_string()).collect(),
        ));
    }

    if !is_safe_id(id) {
        return Err(ApiError::not_found("Analysis not found"));
    }
    Ok(state.backend.fetch_analysis(id).await?)
}

#[cfg(test)]
mod tests {
    use crate::domain::models::{LeadComment, Report, SentimentBreakdown};
    use crate::testing::{session_cookie, test_state, FakeBackend, MemoryStore};
    use crate::web::routes;
    use crate::web::session::SessionMode;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn remote_report() -> Report {
        let lead = |name: &str, sentiment: f64| LeadComment {
            username: name.to_string(),
            text: "where can I buy this?".to_string(),
            timestamp: "2024-06-01T09:30:00+00:00".to_string(),
            sentiment,
        };
        Report {
            sentiment_score: 64,
            lead_percentage: 8,
            total_comments: 120,
            sentiment_breakdown: SentimentBreakdown {
                positive: 50,
                neutral: 30,
                negative: 20,
            },
            leads: vec![
                lead("a", 0.4),
                lead("b", 0.9),
                lead("c", 0.7),
                lead("d", 0.9),
            ],
            top_feedback_topics: Vec::new(),
            top_topics: Vec::new(),
            actionable_todos: vec!["Reply to pricing questions".to_string()],
            creator_insights: Vec::new(),
            competitor_insights: Vec::new(),
            engagement_timeline: Vec::new(),
            top_influencers: Vec::new(),
            vibe_trend: Vec::new(),
            url: Some("https://youtu.be/abc".to_string()),
            created_at: None,
        }
    }

    fn app() -> Router {
        let backend = FakeBackend::default().with_report("analysis-1", remote_report());
        routes(test_state(Arc::new(backend), Arc::new(MemoryStore::default())))
    }

    async fn get(app: Router, uri: &str, mode: SessionMode) -> (StatusCode, Value) {
        let resp = app
            .oneshot(
                Request::get(uri)
                    .header(header::COOKIE, session_cookie(mode))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_remote_report_with_lead_preview() {
        let (status, body) = get(app(), "/report/analysis-1", SessionMode::Authenticated).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sentimentScore"], 64);
        assert_eq!(body["totalComments"], 120);
        let preview: Vec<&str> = body["leadPreview"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["username"].as_str().unwrap())
            .collect();
        assert_eq!(preview, vec!["b", "d", "c"]);
    }

    #[tokio::test]
    async fn test_demo_report() {
        let (status, body) = get(app(), "/report/demo-analysis", SessionMode::Authenticated).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalComments"], 300);
        assert_eq!(body["url"], "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(body["actionableTodos"].as_array().unwrap().len(), 3);
        assert_eq!(body["creatorInsights"].as_array().unwrap().len(), 5);
        assert!(body["leadPreview"].as_array().unwrap().len() <= 3);
    }

    #[tokio::test]
    async fn test_demo_session_never_reaches_backend() {
        let (status, body) = get(app(), "/report/analysis-1", SessionMode::Demo).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalComments"], 300);
    }

    #[tokio::test]
    async fn test_missing_report() {
        let (status, body) = get(app(), "/report/analysis-404", SessionMode::Authenticated).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Analysis not found");
    }

    #[tokio::test]
    async fn test_leads_limit() {
        let (status, body) = get(
            app(),
            "/report/analysis-1/leads?limit=2",
            SessionMode::Authenticated,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["username"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["b", "d"]);
    }
}
