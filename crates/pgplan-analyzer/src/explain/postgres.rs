//! PostgreSQL EXPLAIN Parser
//!
//! Parses `EXPLAIN (ANALYZE, BUFFERS, FORMAT JSON)` output. Depending on how
//! the plan was fetched (multi-statement batch, a driver that unwraps the
//! outer array, older tooling that stored bare nodes) the same plan can arrive
//! in several top-level layouts. Each layout is a [`ExplainShape`] and the
//! parser tries them in a fixed order, keeping the first that decodes.
//!
//! # Examples
//!
//! ```
//! use pgplan_analyzer::explain::postgres::{ExplainShape, parse_document};
//!
//! let json_output = r#"[
//!   {
//!     "Plan": {
//!       "Node Type": "Seq Scan",
//!       "Relation Name": "users",
//!       "Startup Cost": 0.0,
//!       "Total Cost": 10.0,
//!       "Plan Rows": 100,
//!       "Plan Width": 36
//!     }
//!   }
//! ]"#;
//!
//! let parsed = parse_document(json_output).unwrap();
//! assert_eq!(parsed.shape, ExplainShape::WrappedList);
//! assert_eq!(parsed.statements[0].plan.total_cost, 10.0);
//! ```

use crate::error::{ParseResult, PlanParseError};
use crate::explain::plan::{ExplainStatement, PlanNode};
use serde::Deserialize;
use serde::de::{Error as _, Unexpected};
use serde_json::Value;

/// Top-level layouts accepted for EXPLAIN JSON output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExplainShape {
    /// `[{"Plan": {...}}, ...]`, one entry per explained statement
    WrappedList,
    /// `{"Plan": {...}}`
    Wrapped,
    /// `[{"Node Type": ...}, ...]`
    NodeList,
    /// `{"Node Type": ...}`
    Node,
}

impl ExplainShape {
    /// Returns the shape as a display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WrappedList => "list of wrapped plans",
            Self::Wrapped => "wrapped plan",
            Self::NodeList => "list of plan nodes",
            Self::Node => "plan node",
        }
    }
}

const NODE_TYPE: &str = "Node Type";

type ShapeDecoder = fn(&Value) -> serde_json::Result<Vec<ExplainStatement>>;

/// Decode attempts in priority order; the first success wins
const SHAPES: &[(ExplainShape, ShapeDecoder)] = &[
    (ExplainShape::WrappedList, decode_wrapped_list),
    (ExplainShape::Wrapped, decode_wrapped),
    (ExplainShape::NodeList, decode_node_list),
    (ExplainShape::Node, decode_node),
];

/// EXPLAIN output after shape detection
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExplain {
    /// The layout the input was recognized as
    pub shape: ExplainShape,
    /// One entry per plan root, in input order
    pub statements: Vec<ExplainStatement>,
}

impl ParsedExplain {
    /// Returns the plan roots, dropping statement-level timing
    pub fn into_plans(self) -> Vec<PlanNode> {
        self.statements.into_iter().map(|s| s.plan).collect()
    }
}

/// Parses EXPLAIN JSON output into its plan roots
///
/// Fails only if the input is not JSON or matches none of the known shapes.
pub fn parse_explain(output: &str) -> ParseResult<Vec<PlanNode>> {
    parse_document(output).map(ParsedExplain::into_plans)
}

/// Parses EXPLAIN JSON output, keeping planning/execution times when the
/// input carried them
pub fn parse_statements(output: &str) -> ParseResult<Vec<ExplainStatement>> {
    parse_document(output).map(|parsed| parsed.statements)
}

/// Parses EXPLAIN JSON output and reports which shape matched
pub fn parse_document(output: &str) -> ParseResult<ParsedExplain> {
    let value: Value =
        serde_json::from_str(output).map_err(|source| PlanParseError::InvalidJson {
            source,
            input: output.to_string(),
        })?;

    let mut attempts = Vec::with_capacity(SHAPES.len());
    for (shape, decode) in SHAPES {
        match decode(&value) {
            Ok(statements) => {
                tracing::debug!(
                    shape = shape.as_str(),
                    roots = statements.len(),
                    "parsed EXPLAIN output"
                );
                return Ok(ParsedExplain {
                    shape: *shape,
                    statements,
                });
            }
            Err(err) => {
                tracing::trace!(shape = shape.as_str(), error = %err, "shape did not match");
                attempts.push(format!("not a {}: {}", shape.as_str(), err));
            }
        }
    }

    Err(PlanParseError::UnrecognizedShape {
        attempts,
        input: output.to_string(),
    })
}

fn decode_wrapped_list(value: &Value) -> serde_json::Result<Vec<ExplainStatement>> {
    expect_array(value)?.iter().map(decode_statement).collect()
}

fn decode_wrapped(value: &Value) -> serde_json::Result<Vec<ExplainStatement>> {
    decode_statement(value).map(|statement| vec![statement])
}

fn decode_node_list(value: &Value) -> serde_json::Result<Vec<ExplainStatement>> {
    expect_array(value)?
        .iter()
        .map(|node| decode_plan_node(node).map(ExplainStatement::new))
        .collect()
}

fn decode_node(value: &Value) -> serde_json::Result<Vec<ExplainStatement>> {
    decode_plan_node(value).map(|node| vec![ExplainStatement::new(node)])
}

fn decode_statement(value: &Value) -> serde_json::Result<ExplainStatement> {
    expect_object(value)?;
    ExplainStatement::deserialize(value)
}

/// Only a top-level bare node must name its type; that key is what tells it
/// apart from a wrapped result or an unrelated object.
fn decode_plan_node(value: &Value) -> serde_json::Result<PlanNode> {
    expect_object(value)?;
    if value.get(NODE_TYPE).is_none() {
        return Err(serde_json::Error::missing_field(NODE_TYPE));
    }
    PlanNode::deserialize(value)
}

fn expect_array(value: &Value) -> serde_json::Result<&Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| serde_json::Error::invalid_type(unexpected(value), &"a JSON array"))
}

/// Serde would happily read a struct from a JSON array positionally, which
/// would let a list of nodes pass as a single wrapped plan.
fn expect_object(value: &Value) -> serde_json::Result<()> {
    if value.is_object() {
        Ok(())
    } else {
        Err(serde_json::Error::invalid_type(
            unexpected(value),
            &"a JSON object",
        ))
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}
