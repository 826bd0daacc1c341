//! Query Plan Model - Data structures for representing EXPLAIN plan trees
//!
//! Field names on the wire are PostgreSQL's own EXPLAIN JSON keys
//! (`"Node Type"`, `"Total Cost"`, `"Plans"`, ...). Keys this model does not
//! name explicitly are kept in [`PlanNode::extra`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};
use std::collections::HashMap;

/// One statement's worth of `EXPLAIN (FORMAT JSON)` output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExplainStatement {
    /// Root node of the plan tree
    #[serde(rename = "Plan")]
    pub plan: PlanNode,
    /// Planning time in milliseconds (if reported)
    #[serde(
        rename = "Planning Time",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub planning_time_ms: Option<f64>,
    /// Execution time in milliseconds (EXPLAIN ANALYZE only)
    #[serde(
        rename = "Execution Time",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub execution_time_ms: Option<f64>,
}

impl ExplainStatement {
    /// Wraps a bare plan node that came without timing information
    pub fn new(plan: PlanNode) -> Self {
        Self {
            plan,
            planning_time_ms: None,
            execution_time_ms: None,
        }
    }
}

/// A single node in the plan tree
///
/// `node_type` is kept as the planner's own string ("Seq Scan", "Hash Join",
/// ...) since the set of operators grows with every PostgreSQL release.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanNode {
    /// Operator kind, e.g. "Seq Scan" or "Nested Loop"
    #[serde(rename = "Node Type", default)]
    pub node_type: String,
    /// Relation/table name (scans only)
    #[serde(
        rename = "Relation Name",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub relation_name: Option<String>,
    /// Alias used in the query
    #[serde(rename = "Alias", default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Filter condition applied
    #[serde(rename = "Filter", default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Join type ("Inner", "Left", ...)
    #[serde(rename = "Join Type", default, skip_serializing_if = "Option::is_none")]
    pub join_type: Option<String>,
    /// Index used (index scans only)
    #[serde(rename = "Index Name", default, skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    /// Hash join condition
    #[serde(
        rename = "Hash Cond",
        alias = "Hash Condition",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub hash_condition: Option<String>,
    /// Estimated cost before the first row is returned
    #[serde(rename = "Startup Cost", default)]
    pub startup_cost: f64,
    /// Estimated cost to return all rows
    #[serde(rename = "Total Cost", default)]
    pub total_cost: f64,
    /// Estimated number of rows
    #[serde(rename = "Plan Rows", default, deserialize_with = "row_count")]
    pub plan_rows: u64,
    /// Estimated average row width in bytes
    #[serde(rename = "Plan Width", default, deserialize_with = "row_count")]
    pub plan_width: u64,
    /// Measured time to the first row, in milliseconds
    #[serde(
        rename = "Actual Startup Time",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub actual_startup_time: Option<f64>,
    /// Measured time to the last row, in milliseconds
    #[serde(
        rename = "Actual Total Time",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub actual_total_time: Option<f64>,
    /// Measured rows returned
    #[serde(
        rename = "Actual Rows",
        default,
        deserialize_with = "optional_row_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub actual_rows: Option<u64>,
    /// Number of times the node was executed
    #[serde(
        rename = "Actual Loops",
        default,
        deserialize_with = "optional_row_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub actual_loops: Option<u64>,
    /// Child nodes, in planner order
    #[serde(rename = "Plans", default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PlanNode>,
    /// Every other key the planner emitted (buffers, sort keys, ...)
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl PlanNode {
    /// Creates a new plan node with the given type
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            relation_name: None,
            alias: None,
            filter: None,
            join_type: None,
            index_name: None,
            hash_condition: None,
            startup_cost: 0.0,
            total_cost: 0.0,
            plan_rows: 0,
            plan_width: 0,
            actual_startup_time: None,
            actual_total_time: None,
            actual_rows: None,
            actual_loops: None,
            children: Vec::new(),
            extra: HashMap::new(),
        }
    }

    /// Sets the relation/table name
    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation_name = Some(relation.into());
        self
    }

    /// Sets the cost information
    pub fn with_cost(mut self, startup: f64, total: f64) -> Self {
        self.startup_cost = startup;
        self.total_cost = total;
        self
    }

    /// Sets the estimated rows
    pub fn with_rows(mut self, rows: u64) -> Self {
        self.plan_rows = rows;
        self
    }

    /// Sets the measured timing (EXPLAIN ANALYZE)
    pub fn with_actual_time(mut self, startup: f64, total: f64) -> Self {
        self.actual_startup_time = Some(startup);
        self.actual_total_time = Some(total);
        self
    }

    /// Sets the measured row count (EXPLAIN ANALYZE)
    pub fn with_actual_rows(mut self, rows: u64) -> Self {
        self.actual_rows = Some(rows);
        self
    }

    /// Adds a child node
    pub fn with_child(mut self, child: PlanNode) -> Self {
        self.children.push(child);
        self
    }

    /// Sets the index name
    pub fn with_index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }

    /// Sets the filter condition
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Returns the total number of nodes in this subtree (including self)
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Returns the maximum depth of this subtree
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }

    /// Returns true if this is a leaf node (no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns true if ANALYZE timing was recorded for this node
    pub fn has_actual_timing(&self) -> bool {
        self.actual_total_time.is_some()
    }

    /// Returns an iterator over this subtree in pre-order
    pub fn iter(&self) -> PlanNodeIterator<'_> {
        PlanNodeIterator::new(self)
    }
}

/// Iterator for traversing plan nodes depth-first, parents before children
pub struct PlanNodeIterator<'a> {
    stack: Vec<&'a PlanNode>,
}

impl<'a> PlanNodeIterator<'a> {
    fn new(root: &'a PlanNode) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for PlanNodeIterator<'a> {
    type Item = &'a PlanNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order so we visit them in order
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

/// Newer servers print averaged row counts such as `1.00`; accept any
/// non-negative JSON number and round it.
fn number_to_count(number: &Number) -> Option<u64> {
    number.as_u64().or_else(|| {
        number
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f.round() as u64)
    })
}

fn row_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Number::deserialize(deserializer)?;
    number_to_count(&number).ok_or_else(|| {
        serde::de::Error::custom(format!("expected a non-negative row count, got {number}"))
    })
}

fn optional_row_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Number>::deserialize(deserializer)? {
        Some(number) => number_to_count(&number).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!("expected a non-negative row count, got {number}"))
        }),
        None => Ok(None),
    }
}
