//! # Performance Gate
//!
//! One end-to-end run: execute benchmarks, parse the report, load and resolve
//! thresholds, then assert. Every stage's error ends the run.

use crate::assertion::{assert_thresholds, checked_count, collect_violations};
use crate::error::{PerfAssertError, RunnerError};
use crate::report::{BenchmarkRecord, parse_report};
use crate::resolver::{ThresholdOverrides, resolve};
use crate::runner::{BenchFlags, BenchmarkRunner};
use crate::thresholds::ThresholdConfigs;
use std::path::PathBuf;

/// Everything a single gate run needs besides the runner
#[derive(Debug, Clone, Default)]
pub struct GateConfig {
    /// Benchmark name pattern handed to the harness
    pub pattern: String,
    pub flags: BenchFlags,
    /// YAML or JSON threshold file
    pub config_path: Option<PathBuf>,
    pub overrides: ThresholdOverrides,
    /// Log every violation instead of only the first
    pub report_all: bool,
}

/// Summary of a passing run
#[derive(Debug, Clone)]
pub struct GateReport {
    pub records: Vec<BenchmarkRecord>,
    /// Configuration after default grouping and overrides
    pub effective: ThresholdConfigs,
    /// Records that had a budget and were checked
    pub checked: usize,
}

pub struct PerfGate<R> {
    runner: R,
    config: GateConfig,
}

impl<R: BenchmarkRunner> PerfGate<R> {
    pub fn new(runner: R, config: GateConfig) -> Self {
        Self { runner, config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Run the benchmarks and evaluate their output
    pub fn run(&self) -> Result<GateReport, PerfAssertError> {
        if self.config.pattern.trim().is_empty() {
            return Err(RunnerError::EmptyPattern.into());
        }
        let flags = self.config.flags.to_args()?;

        let run = self.runner.run(&self.config.pattern, &flags)?;
        if !run.success() {
            return Err(RunnerError::Failed {
                exit_code: run.exit_code,
                output: run.output,
            }
            .into());
        }
        tracing::info!("{}", run.output);

        self.evaluate(&run.output)
    }

    /// Evaluate an already captured benchmark report
    pub fn evaluate(&self, output: &str) -> Result<GateReport, PerfAssertError> {
        let records = parse_report(output)?;
        if records.is_empty() {
            tracing::warn!(pattern = %self.config.pattern, "no benchmark results found in output");
        }

        let configs = match &self.config.config_path {
            Some(path) => ThresholdConfigs::load_from_file(path)?,
            None => ThresholdConfigs::default(),
        };

        let effective = resolve(configs, &records, &self.config.overrides)?;

        if self.config.report_all {
            let violations = collect_violations(&effective, &records)?;
            for violation in &violations {
                tracing::warn!(
                    benchmark = %violation.benchmark,
                    group = %violation.group,
                    metric = %violation.metric,
                    observed = %violation.observed,
                    budget = %violation.budget,
                    "threshold exceeded"
                );
            }
            if let Some(first) = violations.into_iter().next() {
                return Err(PerfAssertError::Assertion(first.into()));
            }
        } else {
            assert_thresholds(&effective, &records)?;
        }

        let checked = checked_count(&effective, &records);
        tracing::info!(
            checked,
            parsed = records.len(),
            "threshold checks passed"
        );

        Ok(GateReport {
            records,
            effective,
            checked,
        })
    }
}
