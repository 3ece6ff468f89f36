use crate::domain::models::{Comment, LeadComment};

/// How many leads the lead-intent preview shows.
pub const DEFAULT_LEAD_PREVIEW: usize = 3;

/// Anything that can be ranked as a lead.
pub trait Scored {
    fn sentiment(&self) -> f64;
}

impl Scored for Comment {
    fn sentiment(&self) -> f64 {
        self.sentiment
    }
}

impl Scored for LeadComment {
    fn sentiment(&self) -> f64 {
        self.sentiment
    }
}

/// Strongest leads first. Works on a copy; equal sentiments keep their
/// original relative order.
pub fn top_leads<T: Scored + Clone>(leads: &[T], limit: usize) -> Vec<T> {
    let mut ranked = leads.to_vec();
    ranked.sort_by(|a, b| b.sentiment().total_cmp(&a.sentiment()));
    ranked.truncate(limit);
    ranked
}
