pub mod backend;
pub mod demo_corpus;
pub mod jobs;
