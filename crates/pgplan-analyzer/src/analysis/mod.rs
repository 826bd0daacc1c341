//! Plan Analysis Module
//!
//! Walks parsed plan trees, sums cost and timing, and flags operations that
//! match the node-type rule table. Flagged operations and row-estimate
//! warnings are collected in visitation order into an [`AnalysisResult`].

mod analyzer;
mod result;
pub mod rules;

pub use analyzer::*;
pub use result::*;
pub use rules::{NodeRule, RuleSet};
