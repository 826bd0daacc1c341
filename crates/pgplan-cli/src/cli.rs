//! pgplan - diagnose PostgreSQL EXPLAIN plans from the command line
//!
//! Reads `EXPLAIN (ANALYZE, BUFFERS, FORMAT JSON)` output from a file or
//! stdin and prints the analysis as JSON. Nothing here talks to a database;
//! `pgplan statement` prints the EXPLAIN to run with psql or any other client.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pgplan_analyzer::{
    AnalysisResponse, AnalysisResult, AnalyzerConfig, PlanDiagnostics, RuleSet,
    explain_statement,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pgplan", version, about = "Diagnose PostgreSQL EXPLAIN plans")]
struct Cli {
    /// Enable debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze EXPLAIN JSON read from FILE, or stdin when omitted
    Analyze {
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// TOML file with analyzer thresholds
        #[arg(short, long, value_name = "FILE", env = "PGPLAN_CONFIG")]
        config: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Wrap the output in a {success, data, error} envelope; parse
        /// failures are then reported in the envelope instead of the exit code
        #[arg(long)]
        envelope: bool,

        /// Skip the general and per-operation advice
        #[arg(long)]
        no_engine: bool,
    },

    /// Print the active rule table
    Rules {
        #[arg(short, long, value_name = "FILE", env = "PGPLAN_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Print the EXPLAIN statement to run for QUERY
    Statement {
        #[arg(value_name = "QUERY")]
        query: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Analyze {
            file,
            config,
            pretty,
            envelope,
            no_engine,
        } => {
            let diagnostics = PlanDiagnostics::with_config(load_config(config.as_deref())?);
            let input = read_input(file.as_deref())?;
            let result = if no_engine {
                diagnostics.analyze_json(&input)
            } else {
                diagnostics.diagnose(&input)
            };

            let output = if envelope {
                render(&AnalysisResponse::from(result), pretty)?
            } else {
                render::<AnalysisResult>(&result.context("Failed to analyze EXPLAIN output")?, pretty)?
            };
            println!("{output}");
        }
        Command::Rules { config } => {
            let rules = RuleSet::from_config(&load_config(config.as_deref())?);
            print!("{}", describe_rules(&rules));
        }
        Command::Statement { query } => {
            anyhow::ensure!(!query.trim().is_empty(), "No SQL statement to explain");
            println!("{}", explain_statement(&query));
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig> {
    match path {
        Some(path) => AnalyzerConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(AnalyzerConfig::default()),
    }
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read EXPLAIN output from stdin")?;
            Ok(input)
        }
    }
}

fn render<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

fn describe_rules(rules: &RuleSet) -> String {
    rules
        .iter()
        .map(|rule| {
            format!(
                "{:<24} cost > {:<10} {:<7} {}\n",
                rule.node_types.join(", "),
                rule.cost_threshold,
                rule.severity.as_str(),
                rule.recommendation
            )
        })
        .collect()
}

#[cfg(test)]
mod tests;
