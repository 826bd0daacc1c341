//! Diagnosis pipeline
//!
//! Composes parsing, analysis and recommendations into single calls, and
//! defines the seam through which a database-backed component supplies raw
//! EXPLAIN output. Everything here except [`PlanDiagnostics::diagnose_query`]
//! is synchronous and free of I/O.

use crate::analysis::{AnalysisResult, PlanAnalyzer};
use crate::config::AnalyzerConfig;
use crate::error::{DiagnoseError, ParseResult, SourceError};
use crate::explain::parse_explain;
use crate::recommendation::RecommendationEngine;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// EXPLAIN options used to produce the input this crate expects
pub const EXPLAIN_OPTIONS: &str = "ANALYZE, BUFFERS, FORMAT JSON";

/// Builds the EXPLAIN statement for a query
///
/// ANALYZE executes the query, so callers must only pass statements that are
/// safe to run.
pub fn explain_statement(query: &str) -> String {
    format!("EXPLAIN ({EXPLAIN_OPTIONS}) {}", query.trim())
}

/// Something that can run EXPLAIN and hand back its raw JSON text
///
/// Implemented outside this crate by whatever owns the database connection.
#[async_trait]
pub trait ExplainSource: Send + Sync {
    /// Runs `statement` (as built by [`explain_statement`]) and returns the
    /// single JSON value PostgreSQL produced
    async fn explain(&self, statement: &str) -> Result<String, SourceError>;
}

/// Parses, analyzes and recommends with one shared configuration
#[derive(Debug, Clone, Default)]
pub struct PlanDiagnostics {
    analyzer: PlanAnalyzer,
    engine: RecommendationEngine,
}

impl PlanDiagnostics {
    /// Creates a pipeline with default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pipeline with custom thresholds
    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self {
            analyzer: PlanAnalyzer::with_config(config.clone()),
            engine: RecommendationEngine::with_config(config),
        }
    }

    /// Returns the shared config
    pub fn config(&self) -> &AnalyzerConfig {
        self.analyzer.config()
    }

    /// Returns the analyzer stage
    pub fn analyzer(&self) -> &PlanAnalyzer {
        &self.analyzer
    }

    /// Returns the recommendation stage
    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    /// Parses and analyzes EXPLAIN JSON without the recommendation stage
    pub fn analyze_json(&self, raw: &str) -> ParseResult<AnalysisResult> {
        let roots = parse_explain(raw)?;
        Ok(self.analyzer.analyze(&roots))
    }

    /// Parses and analyzes EXPLAIN JSON, then appends the engine's advice
    /// after the analyzer's own recommendations
    pub fn diagnose(&self, raw: &str) -> ParseResult<AnalysisResult> {
        let analysis = self.analyze_json(raw)?;
        let advice = self.engine.recommend(&analysis);
        Ok(analysis.with_recommendations(advice))
    }

    /// Runs EXPLAIN for `query` through `source`, then diagnoses the output
    pub async fn diagnose_query(
        &self,
        source: &dyn ExplainSource,
        query: &str,
    ) -> Result<AnalysisResult, DiagnoseError> {
        if query.trim().is_empty() {
            return Err(DiagnoseError::EmptyQuery);
        }

        let statement = explain_statement(query);
        tracing::debug!(statement = %statement, "running EXPLAIN");
        let raw = source.explain(&statement).await?;

        Ok(self.diagnose(&raw)?)
    }
}

/// Response envelope for callers that report success and failure in one shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<AnalysisResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResponse {
    /// Wraps a successful analysis
    pub fn ok(result: AnalysisResult) -> Self {
        Self {
            success: true,
            data: Some(result),
            error: None,
        }
    }

    /// Wraps a failure, keeping only its message
    pub fn failure(error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
        }
    }
}

impl<E: std::fmt::Display> From<Result<AnalysisResult, E>> for AnalysisResponse {
    fn from(result: Result<AnalysisResult, E>) -> Self {
        match result {
            Ok(analysis) => Self::ok(analysis),
            Err(err) => Self::failure(err),
        }
    }
}
