//! Recommendation Module
//!
//! Turns an [`crate::AnalysisResult`] into deduplicated, human-readable advice:
//! general warnings about the plan as a whole first, then one line per
//! flagged operation.

mod engine;

pub use engine::*;
