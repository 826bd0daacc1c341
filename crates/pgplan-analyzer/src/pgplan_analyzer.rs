//! pgplan Analyzer - PostgreSQL EXPLAIN plan diagnostics
//!
//! This crate provides functionality for:
//! - Parsing `EXPLAIN (ANALYZE, BUFFERS, FORMAT JSON)` output in any of the
//!   JSON shapes PostgreSQL and its client libraries produce
//! - Walking the plan tree and flagging expensive operations
//! - Turning flagged operations into deduplicated recommendations

pub mod analysis;
mod config;
mod error;
pub mod explain;
pub mod pipeline;
pub mod recommendation;

pub use analysis::*;
pub use config::*;
pub use error::*;
pub use explain::*;
pub use pipeline::*;
pub use recommendation::*;
