//! Node-type rule table
//!
//! Each rule names the node types it applies to, the cost a node must exceed
//! to be flagged, and the text attached to the flag. Thresholds come from
//! [`AnalyzerConfig`]; everything else is fixed. Templates may use
//! `{relation}` and `{node_type}` placeholders; a node without a relation
//! name renders `{relation}` as an empty string.

use crate::analysis::result::{ProblematicOperation, Severity};
use crate::config::AnalyzerConfig;
use crate::explain::PlanNode;

/// A single diagnostic rule keyed on node type
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRule {
    /// Node types this rule applies to (exact, case-sensitive)
    pub node_types: &'static [&'static str],
    /// A node is flagged when its total cost is strictly greater than this
    pub cost_threshold: f64,
    pub severity: Severity,
    /// Template for [`ProblematicOperation::description`]
    pub description: &'static str,
    /// Text for [`ProblematicOperation::recommendation`]
    pub recommendation: &'static str,
    /// Template added to the result's recommendations when the rule fires
    pub result_recommendation: Option<&'static str>,
}

impl NodeRule {
    /// Returns true if this rule applies to the given node type
    pub fn applies_to(&self, node_type: &str) -> bool {
        self.node_types.contains(&node_type)
    }

    /// Returns true if the node is costly enough to flag
    pub fn exceeded_by(&self, node: &PlanNode) -> bool {
        node.total_cost > self.cost_threshold
    }

    /// Builds the flagged operation for a node that triggered this rule
    pub fn flag(&self, node: &PlanNode) -> ProblematicOperation {
        ProblematicOperation::new(
            node.node_type.clone(),
            node.total_cost,
            self.severity,
            render(self.description, node),
            render(self.recommendation, node),
        )
        .with_actual_time(node.actual_total_time)
    }

    /// Renders the result-level recommendation, if the rule has one
    pub fn result_recommendation(&self, node: &PlanNode) -> Option<String> {
        self.result_recommendation.map(|template| render(template, node))
    }
}

/// The ordered set of rules the analyzer applies to every node
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    rules: Vec<NodeRule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::from_config(&AnalyzerConfig::default())
    }
}

impl RuleSet {
    /// Builds the rule table with thresholds taken from `config`
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self {
            rules: vec![
                NodeRule {
                    node_types: &["Seq Scan"],
                    cost_threshold: config.seq_scan_cost_threshold,
                    severity: Severity::High,
                    description: "Sequential Scan on table {relation}",
                    recommendation: "Add an index on the fields used in the WHERE clause",
                    result_recommendation: Some("Create an index for table {relation}"),
                },
                NodeRule {
                    node_types: &["Sort"],
                    cost_threshold: config.sort_cost_threshold,
                    severity: Severity::Medium,
                    description: "Sort operation",
                    recommendation: "Use indexes to pre-sort data",
                    result_recommendation: None,
                },
                NodeRule {
                    node_types: &["Hash Join", "Nested Loop"],
                    cost_threshold: config.join_cost_threshold,
                    severity: Severity::Medium,
                    description: "Join operation {node_type}",
                    recommendation: "Check indexes on the join fields",
                    result_recommendation: None,
                },
            ],
        }
    }

    /// Returns the rule for a node type, if any
    pub fn rule_for(&self, node_type: &str) -> Option<&NodeRule> {
        self.rules.iter().find(|rule| rule.applies_to(node_type))
    }

    /// Returns the rule the node triggers: one that applies to its type and
    /// whose threshold it exceeds
    pub fn triggered_by(&self, node: &PlanNode) -> Option<&NodeRule> {
        self.rule_for(&node.node_type).filter(|rule| rule.exceeded_by(node))
    }

    /// Returns the rules in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = &NodeRule> {
        self.rules.iter()
    }
}

fn render(template: &str, node: &PlanNode) -> String {
    template
        .replace(
            "{relation}",
            node.relation_name.as_deref().unwrap_or_default(),
        )
        .replace("{node_type}", &node.node_type)
}
