pub mod aggregator;
pub mod insights;
pub mod leads;

pub use aggregator::{analyze, AnalysisError};
pub use leads::{top_leads, DEFAULT_LEAD_PREVIEW};
