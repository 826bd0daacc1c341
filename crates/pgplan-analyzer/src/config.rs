//! Analyzer configuration
//!
//! Every threshold the analyzer and the recommendation engine use lives here
//! so deployments can tune them without code changes. Configs are plain
//! serde structs; missing keys fall back to the defaults below.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Thresholds for plan diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// "Seq Scan" nodes costing more than this are flagged
    pub seq_scan_cost_threshold: f64,
    /// "Sort" nodes costing more than this are flagged
    pub sort_cost_threshold: f64,
    /// "Hash Join" and "Nested Loop" nodes costing more than this are flagged
    pub join_cost_threshold: f64,
    /// Row-estimate warnings only fire above this many planned rows
    pub row_estimate_min_rows: u64,
    /// Planned/actual ratio above which a row-estimate warning fires
    pub row_estimate_ratio: u64,
    /// Plans whose summed cost exceeds this get a general warning
    pub high_total_cost: f64,
    /// Plans whose summed actual time (ms) exceeds this get a general warning
    pub slow_execution_ms: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            seq_scan_cost_threshold: 1.0,
            sort_cost_threshold: 0.5,
            join_cost_threshold: 2.0,
            row_estimate_min_rows: 1_000,
            row_estimate_ratio: 10,
            high_total_cost: 10_000.0,
            slow_execution_ms: 1_000.0,
        }
    }
}

impl AnalyzerConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a config from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Loads a config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded analyzer config");
        Ok(config)
    }

    /// Sets the sequential scan cost threshold
    pub fn with_seq_scan_cost_threshold(mut self, threshold: f64) -> Self {
        self.seq_scan_cost_threshold = threshold;
        self
    }

    /// Sets the sort cost threshold
    pub fn with_sort_cost_threshold(mut self, threshold: f64) -> Self {
        self.sort_cost_threshold = threshold;
        self
    }

    /// Sets the join cost threshold
    pub fn with_join_cost_threshold(mut self, threshold: f64) -> Self {
        self.join_cost_threshold = threshold;
        self
    }

    /// Sets the minimum planned rows for row-estimate warnings
    pub fn with_row_estimate_min_rows(mut self, rows: u64) -> Self {
        self.row_estimate_min_rows = rows;
        self
    }

    /// Sets the planned/actual ratio for row-estimate warnings (at least 1)
    pub fn with_row_estimate_ratio(mut self, ratio: u64) -> Self {
        self.row_estimate_ratio = ratio.max(1);
        self
    }

    /// Sets the total cost above which a general warning is emitted
    pub fn with_high_total_cost(mut self, cost: f64) -> Self {
        self.high_total_cost = cost;
        self
    }

    /// Sets the execution time (ms) above which a general warning is emitted
    pub fn with_slow_execution_ms(mut self, ms: f64) -> Self {
        self.slow_execution_ms = ms;
        self
    }
}
