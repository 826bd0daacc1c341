//! Error types for pgplan

use thiserror::Error;

/// Errors that can occur when parsing EXPLAIN output
///
/// Both variants keep the original input so the caller can show what was
/// actually received.
#[derive(Debug, Error)]
pub enum PlanParseError {
    #[error("Invalid JSON in EXPLAIN output: {source}; input: {input}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
        input: String,
    },

    #[error("Unrecognized EXPLAIN output ({}); input: {input}", .attempts.join("; "))]
    UnrecognizedShape {
        /// Why each known shape was rejected, in the order tried
        attempts: Vec<String>,
        input: String,
    },
}

impl PlanParseError {
    /// Returns the raw input that failed to parse
    pub fn input(&self) -> &str {
        match self {
            Self::InvalidJson { input, .. } | Self::UnrecognizedShape { input, .. } => input,
        }
    }
}

/// Errors that can occur when loading an analyzer configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Failures reported by the component that runs EXPLAIN against a database
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("EXPLAIN execution failed: {0}")]
    Execution(String),
}

/// Errors from the full query-to-diagnosis pipeline
///
/// Source failures and parse failures stay separate: the first means the
/// query or connection needs fixing, the second means the EXPLAIN output was
/// not in a recognized format.
#[derive(Debug, Error)]
pub enum DiagnoseError {
    #[error("No SQL statement to explain")]
    EmptyQuery,

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Failed to parse plan: {0}")]
    Parse(#[from] PlanParseError),
}

/// Result type alias for EXPLAIN parsing
pub type ParseResult<T> = std::result::Result<T, PlanParseError>;
