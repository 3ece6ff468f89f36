use crate::analytics::insights;
use crate::domain::models::{
    AnalysisResult, Comment, FeedbackTopic, Influencer, SentimentBreakdown, SentimentCounts,
    TimelineBucket, TopicCount,
};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Strictly above: positive.
pub const POSITIVE_THRESHOLD: f64 = 0.3;
/// Strictly below: negative. The band in between counts as neutral.
pub const NEGATIVE_THRESHOLD: f64 = -0.1;
/// Comments strictly below this feed the feedback topic ranking.
pub const FEEDBACK_THRESHOLD: f64 = 0.3;

const TOP_TOPICS: usize = 5;
const TOP_INFLUENCERS: usize = 5;
const FALLBACK_TOPIC: &str = "general";
const VIBE_OFFSETS: [i64; 5] = [-15, -10, -5, 0, 3];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Reduces a batch of comments into the full report payload.
///
/// Fails with [`AnalysisError::InvalidInput`] on an empty batch or on a
/// comment whose sentiment is NaN or infinite, since either would turn every
/// percentage into NaN.
pub fn analyze(comments: &[Comment]) -> Result<AnalysisResult, AnalysisError> {
    if comments.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "cannot analyze an empty comment list".to_string(),
        ));
    }
    if let Some(bad) = comments.iter().find(|c| !c.sentiment.is_finite()) {
        return Err(AnalysisError::InvalidInput(format!(
            "comment {} has a non-finite sentiment",
            bad.id
        )));
    }

    let total = comments.len();
    let sentiment_score = sentiment_score(comments);

    let counts = partition_sentiment(comments);
    debug_assert_eq!(counts.total(), total);
    let sentiment_breakdown = SentimentBreakdown {
        positive: percent(counts.positive, total),
        neutral: percent(counts.neutral, total),
        negative: percent(counts.negative, total),
    };

    let leads: Vec<Comment> = comments.iter().filter(|c| c.is_lead).cloned().collect();
    let lead_percentage = percent(leads.len(), total);

    let top_topics = rank_topics(comments.iter().flat_map(|c| c.topics.iter()), TOP_TOPICS)
        .into_iter()
        .map(|(topic, count)| TopicCount { topic, count })
        .collect();

    let top_feedback_topics = rank_topics(
        comments
            .iter()
            .filter(|c| c.sentiment < FEEDBACK_THRESHOLD)
            .flat_map(|c| c.topics.iter()),
        TOP_TOPICS,
    )
    .into_iter()
    .map(|(topic, frequency)| FeedbackTopic { topic, frequency })
    .collect();

    let influencers = rank_influencers(comments, TOP_INFLUENCERS);
    let engagement_timeline = engagement_timeline(comments);
    let vibe_trend = vibe_trend(sentiment_score);

    tracing::debug!(
        "Analyzed {} comments: score={}, leads={}%, {} authors ranked, {} days",
        total,
        sentiment_score,
        lead_percentage,
        influencers.len(),
        engagement_timeline.len()
    );

    Ok(AnalysisResult {
        sentiment_score,
        sentiment_breakdown,
        lead_percentage,
        total_comments: total,
        leads,
        top_topics,
        top_feedback_topics,
        influencers,
        engagement_timeline,
        vibe_trend,
        creator_insights: insights::creator_insights(),
        competitor_insights: insights::competitor_insights(),
    })
}

/// Mean sentiment remapped from -1..=1 onto 0..=100.
pub fn sentiment_score(comments: &[Comment]) -> u32 {
    if comments.is_empty() {
        return 0;
    }
    let sum: f64 = comments.iter().map(|c| c.sentiment).sum();
    let mean = sum / comments.len() as f64;
    (((mean + 1.0) / 2.0) * 100.0).round() as u32
}

pub fn partition_sentiment(comments: &[Comment]) -> SentimentCounts {
    let mut counts = SentimentCounts::default();
    for c in comments {
        if c.sentiment > POSITIVE_THRESHOLD {
            counts.positive += 1;
        } else if c.sentiment < NEGATIVE_THRESHOLD {
            counts.negative += 1;
        } else {
            counts.neutral += 1;
        }
    }
    counts
}

fn percent(part: usize, total: usize) -> u32 {
    ((part as f64 / total as f64) * 100.0).round() as u32
}

/// Occurrence counts in first-seen order.
fn tally<'a, I>(labels: I) -> Vec<(&'a str, usize)>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut slots: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(&'a str, usize)> = Vec::new();
    for label in labels {
        match slots.get(label.as_str()) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(label.as_str(), counts.len());
                counts.push((label.as_str(), 1));
            }
        }
    }
    counts
}

/// Most frequent labels first; ties keep first-seen order (stable sort).
fn rank_topics<'a, I>(labels: I, limit: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut counts = tally(labels);
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(limit)
        .map(|(topic, count)| (topic.to_string(), count))
        .collect()
}

struct AuthorRollup<'a> {
    username: &'a str,
    influence_score: u32,
    topics: Vec<&'a String>,
    engagement: u64,
}

fn rank_influencers(comments: &[Comment], limit: usize) -> Vec<Influencer> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut authors: Vec<AuthorRollup> = Vec::new();

    for c in comments {
        let slot = *slots.entry(c.username.as_str()).or_insert_with(|| {
            // First comment by an author fixes the author's influence score.
            authors.push(AuthorRollup {
                username: c.username.as_str(),
                influence_score: c.influence_score,
                topics: Vec::new(),
                engagement: 0,
            });
            authors.len() - 1
        });
        let author = &mut authors[slot];
        author.topics.extend(c.topics.iter());
        author.engagement += u64::from(c.engagement_count);
    }

    let mut influencers: Vec<Influencer> = authors
        .into_iter()
        .map(|author| {
            let main_topic = rank_topics(author.topics, 1)
                .into_iter()
                .next()
                .map(|(topic, _)| topic)
                .unwrap_or_else(|| FALLBACK_TOPIC.to_string());
            Influencer {
                username: author.username.to_string(),
                influence_score: author.influence_score,
                main_topic,
                engagement_count: author.engagement,
            }
        })
        .collect();

    influencers.sort_by(|a, b| b.influence_score.cmp(&a.influence_score));
    influencers.truncate(limit);
    influencers
}

fn engagement_timeline(comments: &[Comment]) -> Vec<TimelineBucket> {
    let mut buckets: BTreeMap<String, usize> = BTreeMap::new();
    for c in comments {
        *buckets
            .entry(c.timestamp.format("%Y-%m-%d").to_string())
            .or_insert(0) += 1;
    }
    buckets
        .into_iter()
        .map(|(time, count)| TimelineBucket { time, count })
        .collect()
}

fn vibe_trend(score: u32) -> [u32; 5] {
    VIBE_OFFSETS.map(|offset| (i64::from(score) + offset).clamp(0, 100) as u32)
}
