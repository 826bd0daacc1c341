//! Query EXPLAIN Parser Module
//!
//! This module turns PostgreSQL `EXPLAIN (FORMAT JSON)` output into a tree of
//! [`PlanNode`]s. Several top-level layouts are accepted:
//! - a list of wrapped results (`[{"Plan": {...}}, ...]`), one per statement
//! - a single wrapped result (`{"Plan": {...}}`)
//! - a list of bare plan nodes
//! - a single bare plan node
//!
//! # Example
//!
//! ```
//! use pgplan_analyzer::explain::parse_explain;
//!
//! let json = r#"[{"Plan": {"Node Type": "Seq Scan", "Relation Name": "users", "Total Cost": 12.5}}]"#;
//! let roots = parse_explain(json).unwrap();
//! assert_eq!(roots.len(), 1);
//! assert_eq!(roots[0].node_type, "Seq Scan");
//! assert_eq!(roots[0].relation_name.as_deref(), Some("users"));
//! ```

pub mod plan;
pub mod postgres;

pub use plan::{ExplainStatement, PlanNode, PlanNodeIterator};
pub use postgres::{ExplainShape, ParsedExplain, parse_document, parse_explain, parse_statements};
