//! # perfassert
//!
//! A performance gate for Go benchmarks. It runs `go test -bench`, parses the
//! result lines, and fails when a benchmark exceeds the ns/op, B/op or
//! allocs/op budget of its group.
//!
//! ## Components
//!
//! - **Report Parser**: typed records from raw `go test -bench` output
//! - **Threshold Model**: budgets per group, loaded from YAML or JSON
//! - **Resolver**: default grouping and command-line overrides
//! - **Assertion**: fail-fast or collect-all threshold checks
//! - **Runner / Gate**: subprocess execution and the end-to-end pipeline
//!
//! ## Usage
//!
//! ```rust
//! use perfassert_core::{ThresholdConfigs, ThresholdOverrides, assert_thresholds, parse_report, resolve};
//!
//! let records = parse_report("BenchmarkFoo-4  1000  95.4 ns/op  16 B/op  1 allocs/op\n").unwrap();
//! let overrides = ThresholdOverrides { max_ns_per_op: 100.0, ..Default::default() };
//!
//! let effective = resolve(ThresholdConfigs::default(), &records, &overrides).unwrap();
//! assert!(assert_thresholds(&effective, &records).is_ok());
//! ```

/// Threshold checks against parsed records
pub mod assertion;
/// Error types for each stage
pub mod error;
/// End-to-end gate pipeline
pub mod gate;
/// `go test -bench` output parser
pub mod report;
/// Effective configuration resolution
pub mod resolver;
/// Benchmark harness execution
pub mod runner;
/// Threshold configuration model
pub mod thresholds;

pub use assertion::{ThresholdViolation, assert_thresholds, checked_count, collect_violations};
pub use error::{
    AssertionError, ConfigError, OverrideError, PerfAssertError, ReportError, RunnerError,
};
pub use gate::{GateConfig, GateReport, PerfGate};
pub use report::{BenchmarkRecord, parse_report};
pub use resolver::{ThresholdOverrides, apply_overrides, resolve, validate_groups};
pub use runner::{BenchFlags, BenchmarkRunner, GoTestRunner, RunOutput, validate_benchtime};
pub use thresholds::{ConfigFormat, GLOBAL_GROUP, GroupLookup, Metric, Threshold, ThresholdConfigs};
