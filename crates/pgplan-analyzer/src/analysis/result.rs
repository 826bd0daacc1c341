//! Analysis result types

use serde::{Deserialize, Serialize};

/// Severity assigned to a flagged operation by the rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Returns the severity level as a display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A plan node that matched a rule and exceeded its cost threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblematicOperation {
    /// Node type of the flagged node
    pub node_type: String,
    /// The node's estimated total cost
    pub cost: f64,
    /// The node's measured total time in ms, if ANALYZE data was present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_time: Option<f64>,
    /// What was found
    pub description: String,
    /// What to do about it
    pub recommendation: String,
    pub severity: Severity,
}

impl ProblematicOperation {
    /// Creates a new flagged operation
    pub fn new(
        node_type: impl Into<String>,
        cost: f64,
        severity: Severity,
        description: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            node_type: node_type.into(),
            cost,
            actual_time: None,
            description: description.into(),
            recommendation: recommendation.into(),
            severity,
        }
    }

    /// Sets the measured time
    pub fn with_actual_time(mut self, actual_time: Option<f64>) -> Self {
        self.actual_time = actual_time;
        self
    }
}

/// Aggregated diagnosis of one EXPLAIN output
///
/// Built in a single pass by [`crate::PlanAnalyzer`]; callers receive it as a
/// finished value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Sum of total cost over every node in every plan tree
    pub total_cost: f64,
    /// Sum of actual total time over every node that reported one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_actual_time: Option<f64>,
    /// Flagged operations in pre-order visitation order
    #[serde(default)]
    pub problematic_operations: Vec<ProblematicOperation>,
    /// Distinct advisory strings, in insertion order
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Distinct row-estimate warnings, in insertion order
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl AnalysisResult {
    /// Returns true if any operation was flagged
    pub fn has_problems(&self) -> bool {
        !self.problematic_operations.is_empty()
    }

    /// Returns the number of flagged operations with the given severity
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.problematic_operations
            .iter()
            .filter(|op| op.severity == severity)
            .count()
    }

    /// Returns a copy of this result with `extra` appended to its
    /// recommendations, skipping any already present
    pub fn with_recommendations(mut self, extra: impl IntoIterator<Item = String>) -> Self {
        for recommendation in extra {
            push_unique(&mut self.recommendations, recommendation);
        }
        self
    }

    pub(crate) fn add_time(&mut self, ms: f64) {
        self.total_actual_time = Some(self.total_actual_time.map_or(ms, |total| total + ms));
    }

    pub(crate) fn push_recommendation(&mut self, recommendation: String) {
        push_unique(&mut self.recommendations, recommendation);
    }

    pub(crate) fn push_warning(&mut self, warning: String) {
        push_unique(&mut self.warnings, warning);
    }
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}
