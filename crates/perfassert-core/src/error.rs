//! Error types for every stage of a perfassert run.
//!
//! Each stage owns its own enum so callers can match on the failure they care
//! about; [`PerfAssertError`] wraps them for the end-to-end pipeline.

use crate::assertion::ThresholdViolation;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while preparing or executing the benchmark runner
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error(
        "a benchmark pattern is required (e.g.: --bench ., --bench BenchmarkDBInsert, --bench 'BenchmarkDB*')"
    )]
    EmptyPattern,
    #[error("invalid benchtime '{value}': expected a duration like 1s or an iteration count like 100x")]
    InvalidBenchtime { value: String },
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("error running benchmarks ({}):\n{output}", describe_exit(.exit_code))]
    Failed {
        exit_code: Option<i32>,
        output: String,
    },
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Structural failure while scanning a benchmark report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("benchmark result pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),
}

/// Failures while loading or validating threshold configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("error reading config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error unmarshalling config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("error unmarshalling config file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("benchmark {benchmark} is assigned to group '{group}' which has no thresholds configured")]
    UnknownGroup { benchmark: String, group: String },
}

/// Rejected command-line threshold override
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OverrideError {
    #[error("{flag} must be a non-negative number, got {value}")]
    Negative { flag: &'static str, value: String },
    #[error("{flag} must be a finite number, got {value}")]
    NotFinite { flag: &'static str, value: String },
}

/// Outcome of a failed threshold check
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssertionError {
    #[error(transparent)]
    Violation(#[from] ThresholdViolation),
    #[error("benchmark {benchmark} is assigned to group '{group}' which has no thresholds configured")]
    UnknownGroup { benchmark: String, group: String },
}

/// Any error that terminates a perfassert run
#[derive(Error, Debug)]
pub enum PerfAssertError {
    #[error(transparent)]
    Runner(#[from] RunnerError),
    #[error("error parsing benchmark output: {0}")]
    Report(#[from] ReportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("error handling command line thresholds: {0}")]
    Override(#[from] OverrideError),
    #[error(transparent)]
    Assertion(#[from] AssertionError),
}

impl PerfAssertError {
    /// True when the run completed but a benchmark broke its budget
    pub fn is_violation(&self) -> bool {
        matches!(
            self,
            PerfAssertError::Assertion(AssertionError::Violation(_))
        )
    }
}
