//! Plan Analyzer - recursive walk over parsed plan trees
//!
//! Every node is visited before its children, and roots in input order, so
//! the flagged operations in the result follow the plan as PostgreSQL printed
//! it.

use crate::analysis::result::AnalysisResult;
use crate::analysis::rules::RuleSet;
use crate::config::AnalyzerConfig;
use crate::explain::PlanNode;

/// Walks plan trees and builds an [`AnalysisResult`]
#[derive(Debug, Clone)]
pub struct PlanAnalyzer {
    config: AnalyzerConfig,
    rules: RuleSet,
}

impl Default for PlanAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanAnalyzer {
    /// Creates a new analyzer with default config
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    /// Creates a new analyzer with custom config
    pub fn with_config(config: AnalyzerConfig) -> Self {
        let rules = RuleSet::from_config(&config);
        Self { config, rules }
    }

    /// Returns the analyzer config
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Returns the rule table built from the config
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Analyzes every root and everything beneath it
    pub fn analyze(&self, roots: &[PlanNode]) -> AnalysisResult {
        let mut result = AnalysisResult::default();

        for root in roots {
            self.visit(root, &mut result);
        }

        tracing::debug!(
            roots = roots.len(),
            total_cost = result.total_cost,
            total_actual_time = ?result.total_actual_time,
            problems = result.problematic_operations.len(),
            warnings = result.warnings.len(),
            "analyzed plan"
        );

        result
    }

    fn visit(&self, node: &PlanNode, result: &mut AnalysisResult) {
        self.inspect(node, result);

        for child in &node.children {
            self.visit(child, result);
        }
    }

    fn inspect(&self, node: &PlanNode, result: &mut AnalysisResult) {
        result.total_cost += node.total_cost;

        if let Some(ms) = node.actual_total_time {
            result.add_time(ms);
        }

        if let Some(rule) = self.rules.triggered_by(node) {
            tracing::trace!(
                node_type = %node.node_type,
                cost = node.total_cost,
                threshold = rule.cost_threshold,
                "flagged plan node"
            );
            result.problematic_operations.push(rule.flag(node));
            if let Some(recommendation) = rule.result_recommendation(node) {
                result.push_recommendation(recommendation);
            }
        }

        if let Some(warning) = self.row_estimate_warning(node) {
            result.push_warning(warning);
        }
    }

    /// Fires when the planner overestimated rows by more than the configured
    /// ratio (integer division, as PostgreSQL row counts are whole numbers)
    fn row_estimate_warning(&self, node: &PlanNode) -> Option<String> {
        let actual = node.actual_rows?;
        let planned = node.plan_rows;
        let ratio = self.config.row_estimate_ratio.max(1);

        (planned > self.config.row_estimate_min_rows && actual < planned / ratio)
            .then(|| format!("Poor row estimate: planned {planned} rows, actual {actual}"))
    }
}

#[cfg(test)]
mod tests;
