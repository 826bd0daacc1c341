//! Recommendation Engine - advice derived from an analysis result

use crate::analysis::{AnalysisResult, ProblematicOperation};
use crate::config::AnalyzerConfig;
use itertools::Itertools;

const HIGH_TOTAL_COST: &str =
    "Total query cost is very high. Consider refactoring the query or adding indexes.";

/// Advice per flagged node type; anything else gets the generic message
const OPERATION_ADVICE: &[(&str, &str)] = &[
    (
        "Seq Scan",
        "Sequential Scan detected. Add indexes on the fields used in filter conditions.",
    ),
    (
        "Sort",
        "Sort operation detected. Use indexes to pre-sort the data.",
    ),
    (
        "Hash Join",
        "Hash Join detected. Make sure both tables have indexes on the join fields.",
    ),
    (
        "Nested Loop",
        "Nested Loop detected. Consider changing the join conditions or adding indexes.",
    ),
];

/// Generates recommendations from analysis results
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    config: AnalyzerConfig,
}

impl RecommendationEngine {
    /// Creates a new engine with default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new engine with custom thresholds
    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Returns the engine config
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Returns general advice followed by per-operation advice, each string
    /// once, in first-seen order
    pub fn recommend(&self, result: &AnalysisResult) -> Vec<String> {
        self.general_recommendations(result)
            .into_iter()
            .chain(
                result
                    .problematic_operations
                    .iter()
                    .map(operation_recommendation),
            )
            .unique()
            .collect()
    }

    fn general_recommendations(&self, result: &AnalysisResult) -> Vec<String> {
        let mut recs = Vec::new();

        if result.total_cost > self.config.high_total_cost {
            recs.push(HIGH_TOTAL_COST.to_string());
        }

        if result
            .total_actual_time
            .is_some_and(|ms| ms > self.config.slow_execution_ms)
        {
            recs.push(format!(
                "Total execution time exceeds {}. Optimization is required.",
                describe_ms(self.config.slow_execution_ms)
            ));
        }

        recs
    }
}

/// Returns the advice for a single flagged operation
pub fn operation_recommendation(operation: &ProblematicOperation) -> String {
    OPERATION_ADVICE
        .iter()
        .find(|(node_type, _)| *node_type == operation.node_type)
        .map(|(_, advice)| advice.to_string())
        .unwrap_or_else(|| {
            format!(
                "Operation {} has high cost. Consider optimizing.",
                operation.node_type
            )
        })
}

fn describe_ms(ms: f64) -> String {
    if ms >= 1000.0 && ms % 1000.0 == 0.0 {
        let seconds = ms / 1000.0;
        if seconds == 1.0 {
            "1 second".to_string()
        } else {
            format!("{seconds} seconds")
        }
    } else {
        format!("{ms} ms")
    }
}
