//! Synthetic comment corpus behind demo mode.
//!
//! The random source and the clock are passed in, so a seeded [`StdRng`]
//! reproduces a corpus exactly.

use crate::analytics::{analyze, AnalysisError};
use crate::domain::models::{AnalysisResult, Comment};
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::Arc;

pub const DEMO_ANALYSIS_ID: &str = "demo-analysis";
pub const DEMO_SOURCE_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
pub const DEFAULT_DEMO_SIZE: usize = 2000;

const LEAD_RATE: f64 = 0.12;
const POSITIVE_SHARE: f64 = 0.6;
const NEUTRAL_SHARE: f64 = 0.25;
const MAX_TOPICS: usize = 3;
const MAX_DAYS_AGO: i64 = 30;

const USERNAMES: [&str; 25] = [
    "TechGuru22", "MarketingPro", "StartupFounder", "DigitalNomad", "CodeMaster",
    "BusinessOwner", "SaaSBuilder", "ProductManager", "GrowthHacker", "DataScientist",
    "UXDesigner", "ContentCreator", "SocialMediaExpert", "EcommerceBoss", "AppDeveloper",
    "VideoEditor", "Freelancer99", "AgencyOwner", "ConsultantLife", "EntrepreneurHub",
    "InvestorMindset", "BrandStrategist", "SEOExpert", "CopywriterPro", "WebDesigner",
];

const TOPICS: [&str; 18] = [
    "features", "pricing", "UI/UX", "performance", "support", "integration",
    "security", "mobile app", "API", "documentation", "onboarding", "analytics",
    "customization", "scalability", "bugs", "updates", "alternatives", "comparison",
];

const POSITIVE_TEXTS: [&str; 10] = [
    "This is exactly what I needed! Amazing work!",
    "Love the interface, so clean and intuitive",
    "Best tool I've used for this purpose",
    "The features are incredible, worth every penny",
    "Highly recommend this to anyone looking for a solution",
    "Game changer for my workflow",
    "Customer support is top-notch",
    "The updates keep getting better",
    "So easy to use, even for beginners",
    "This solved my biggest problem",
];

const NEUTRAL_TEXTS: [&str; 10] = [
    "Interesting approach to this problem",
    "Would be nice to see more features",
    "How does this compare to alternatives?",
    "Can someone explain how this works?",
    "Is there a trial version available?",
    "Looking forward to future updates",
    "Any plans for mobile support?",
    "What's the pricing structure?",
    "Has anyone tried this with [use case]?",
    "Documentation could be more detailed",
];

const NEGATIVE_TEXTS: [&str; 10] = [
    "Not what I expected from the description",
    "Too expensive for what it offers",
    "The UI is confusing",
    "Ran into several bugs",
    "Support hasn't responded yet",
    "Missing key features I need",
    "Performance issues on my device",
    "Competitors offer better value",
    "Disappointed with the results",
    "Not worth the hype",
];

const LEAD_TEXTS: [&str; 15] = [
    "Where can I sign up for the enterprise plan?",
    "Do you offer demos for teams?",
    "I'd like to discuss integrating this into our workflow",
    "Is there a discount for annual subscriptions?",
    "Can I schedule a call to learn more?",
    "My company needs this, how do we get started?",
    "Do you have a reseller program?",
    "Interested in the API for our product",
    "Looking to purchase licenses for my team",
    "What's the implementation timeline?",
    "Can we get a custom quote?",
    "I want to buy this for my agency",
    "Does this integrate with our CRM?",
    "Need this ASAP, how fast can we onboard?",
    "Can you support our enterprise requirements?",
];

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, pool: &[&'a str]) -> &'a str {
    pool[rng.gen_range(0..pool.len())]
}

pub fn generate_demo_corpus<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    now: DateTime<Utc>,
) -> Vec<Comment> {
    (0..n).map(|index| generate_comment(rng, index, now)).collect()
}

fn generate_comment<R: Rng + ?Sized>(rng: &mut R, index: usize, now: DateTime<Utc>) -> Comment {
    let is_lead = rng.gen_bool(LEAD_RATE);

    let (sentiment, text) = if is_lead {
        (rng.gen_range(0.6..0.9), pick(rng, &LEAD_TEXTS))
    } else {
        let roll: f64 = rng.gen();
        if roll < POSITIVE_SHARE {
            (rng.gen_range(0.5..1.0), pick(rng, &POSITIVE_TEXTS))
        } else if roll < POSITIVE_SHARE + NEUTRAL_SHARE {
            (rng.gen_range(0.2..0.5), pick(rng, &NEUTRAL_TEXTS))
        } else {
            (rng.gen_range(-0.5..0.0), pick(rng, &NEGATIVE_TEXTS))
        }
    };

    // 1..=3 draws; a repeated draw is dropped rather than redrawn.
    let draws = rng.gen_range(1..=MAX_TOPICS);
    let mut topics: Vec<String> = Vec::with_capacity(draws);
    for _ in 0..draws {
        let topic = pick(rng, &TOPICS);
        if !topics.iter().any(|t| t == topic) {
            topics.push(topic.to_string());
        }
    }

    let days_ago = rng.gen_range(0..MAX_DAYS_AGO);
    let timestamp = now - Duration::days(days_ago);

    let username = format!("{}{}", pick(rng, &USERNAMES), rng.gen_range(0..1000));

    Comment {
        id: format!("comment-{index}"),
        username,
        text: text.to_string(),
        sentiment,
        is_lead,
        influence_score: rng.gen_range(0..100),
        timestamp,
        topics,
        engagement_count: rng.gen_range(0..500),
    }
}

/// One corpus per process, so every demo report shows the same data. The
/// analysis is computed once alongside it.
#[derive(Clone)]
pub struct DemoCorpus {
    comments: Arc<Vec<Comment>>,
    analysis: Arc<AnalysisResult>,
    pub generated_at: DateTime<Utc>,
}

impl DemoCorpus {
    pub fn generate(size: usize, seed: Option<u64>) -> Result<Self, AnalysisError> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let generated_at = Utc::now();
        let comments = generate_demo_corpus(&mut rng, size, generated_at);
        let analysis = analyze(&comments)?;
        tracing::info!(
            "Generated demo corpus with {} comments (score {})",
            comments.len(),
            analysis.sentiment_score
        );
        Ok(Self {
            comments: Arc::new(comments),
            analysis: Arc::new(analysis),
            generated_at,
        })
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn analysis(&self) -> &AnalysisResult {
        &self.analysis
    }
}
