pub use perfassert_core::{assertion, error, gate, report, resolver, runner, thresholds};

pub use assertion::{ThresholdViolation, assert_thresholds, checked_count, collect_violations};
pub use error::{
    AssertionError, ConfigError, OverrideError, PerfAssertError, ReportError, RunnerError,
};
pub use gate::{GateConfig, GateReport, PerfGate};
pub use report::{BenchmarkRecord, parse_report};
pub use resolver::{ThresholdOverrides, apply_overrides, resolve, validate_groups};
pub use runner::{BenchFlags, BenchmarkRunner, GoTestRunner, RunOutput};
pub use thresholds::{GLOBAL_GROUP, Metric, Threshold, ThresholdConfigs};
