//! # Performance Gate Integration Tests
//!
//! Drives the full pipeline (runner → parser → config → resolver →
//! assertion) with scripted `go test -bench` output, the way a CI job would
//! see it.

use perfassert_workspace::{
    AssertionError, BenchFlags, BenchmarkRunner, ConfigError, GLOBAL_GROUP, GateConfig, Metric,
    PerfAssertError, PerfGate, RunOutput, RunnerError, Threshold, ThresholdOverrides,
};
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const GO_BENCH_OUTPUT: &str = "\
goos: linux
goarch: amd64
pkg: example.com/store
cpu: Intel(R) Xeon(R) CPU @ 2.20GHz
BenchmarkDBInsert-8   \t  412098\t      2873 ns/op\t     512 B/op\t       7 allocs/op
BenchmarkDBSelect-8   \t 1000000\t      1052 ns/op\t     128 B/op\t       2 allocs/op
BenchmarkDBSelectParallel-8 \t 4000000\t       301.7 ns/op\t     128 B/op\t       2 allocs/op
BenchmarkEncodeJSON-8 \t  250000\t      4711 ns/op\t 217.39 MB/s\t    1024 B/op\t       1 allocs/op
PASS
ok  \texample.com/store\t6.118s
";

const YAML_CONFIG: &str = r#"
thresholds:
  db:
    max_ns_per_op: 3000
    max_bytes_per_op: 512
    max_allocs_per_op: 8
  encoding:
    max_ns_per_op: 5000.0
    max_bytes_per_op: 2048
    max_allocs_per_op: 1
benchmarks:
  BenchmarkDBInsert: db
  BenchmarkDBSelect: db
  BenchmarkEncodeJSON: encoding
"#;

const JSON_CONFIG: &str = r#"{
    "thresholds": {
        "db": {"max_ns_per_op": 3000, "max_bytes_per_op": 512, "max_allocs_per_op": 8},
        "encoding": {"max_ns_per_op": 5000.0, "max_bytes_per_op": 2048, "max_allocs_per_op": 1}
    },
    "benchmarks": {
        "BenchmarkDBInsert": "db",
        "BenchmarkDBSelect": "db",
        "BenchmarkEncodeJSON": "encoding"
    }
}"#;

/// Stands in for `go test` by replaying a fixed report
struct CannedRunner {
    output: String,
    exit_code: Option<i32>,
}

impl CannedRunner {
    fn new(output: &str) -> Self {
        Self {
            output: output.to_string(),
            exit_code: Some(0),
        }
    }
}

impl BenchmarkRunner for CannedRunner {
    fn run(&self, _pattern: &str, _flags: &[String]) -> Result<RunOutput, RunnerError> {
        Ok(RunOutput {
            output: self.output.clone(),
            exit_code: self.exit_code,
        })
    }
}

fn write_config(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("Failed to write config file");
    path
}

fn gate_config(config_path: Option<PathBuf>, overrides: ThresholdOverrides) -> GateConfig {
    GateConfig {
        pattern: "BenchmarkDB*".to_string(),
        flags: BenchFlags {
            benchmem: true,
            benchtime: None,
        },
        config_path,
        overrides,
        report_all: false,
    }
}

#[test]
fn test_yaml_config_passes() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = write_config(&dir, "perf.yaml", YAML_CONFIG);

    let gate = PerfGate::new(
        CannedRunner::new(GO_BENCH_OUTPUT),
        gate_config(Some(path), ThresholdOverrides::default()),
    );
    let report = gate.run().expect("All budgets should hold");

    assert_eq!(report.records.len(), 4);
    // BenchmarkDBSelectParallel has no group assignment
    assert_eq!(report.checked, 3);
}

#[rstest]
#[case("perf.yaml", YAML_CONFIG)]
#[case("perf.yml", YAML_CONFIG)]
#[case("perf.json", JSON_CONFIG)]
fn test_config_formats_resolve_identically(#[case] file_name: &str, #[case] contents: &str) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = write_config(&dir, file_name, contents);

    let report = PerfGate::new(
        CannedRunner::new(GO_BENCH_OUTPUT),
        gate_config(Some(path), ThresholdOverrides::default()),
    )
    .run()
    .expect("Config run should pass");

    assert_eq!(report.checked, 3);
    assert_eq!(
        report.effective.thresholds["db"],
        Threshold {
            max_ns_per_op: Some(3000.0),
            max_bytes_per_op: Some(512),
            max_allocs_per_op: Some(8),
        }
    );
    assert_eq!(report.effective.benchmarks["BenchmarkEncodeJSON"], "encoding");
}

#[test]
fn test_override_tightens_every_group() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = write_config(&dir, "perf.yaml", YAML_CONFIG);

    let gate = PerfGate::new(
        CannedRunner::new(GO_BENCH_OUTPUT),
        gate_config(
            Some(path),
            ThresholdOverrides {
                max_allocs_per_op: 5,
                ..Default::default()
            },
        ),
    );
    let err = gate.run().expect_err("BenchmarkDBInsert makes 7 allocs");

    assert!(err.is_violation());
    assert_eq!(
        err.to_string(),
        "benchmark BenchmarkDBInsert exceeded allocs/op threshold: got 7, wanted 5"
    );
}

#[test]
fn test_override_preserves_other_fields() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = write_config(&dir, "perf.yaml", YAML_CONFIG);

    let gate = PerfGate::new(
        CannedRunner::new(GO_BENCH_OUTPUT),
        gate_config(
            Some(path),
            ThresholdOverrides {
                max_ns_per_op: 10_000.0,
                ..Default::default()
            },
        ),
    );
    let report = gate.run().expect("Looser ns budget should pass");

    assert_eq!(
        report.effective.thresholds["db"],
        Threshold {
            max_ns_per_op: Some(10_000.0),
            max_bytes_per_op: Some(512),
            max_allocs_per_op: Some(8),
        }
    );
    assert_eq!(
        report.effective.thresholds["encoding"],
        Threshold {
            max_ns_per_op: Some(10_000.0),
            max_bytes_per_op: Some(2048),
            max_allocs_per_op: Some(1),
        }
    );
}

#[test]
fn test_negative_override_is_rejected() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = write_config(&dir, "perf.yaml", YAML_CONFIG);

    let gate = PerfGate::new(
        CannedRunner::new(GO_BENCH_OUTPUT),
        gate_config(
            Some(path),
            ThresholdOverrides {
                max_ns_per_op: -1.0,
                ..Default::default()
            },
        ),
    );
    let err = gate.run().expect_err("Negative budgets are invalid");

    assert!(matches!(err, PerfAssertError::Override(_)));
    assert!(err.to_string().contains("maxns must be a non-negative number"));
}

#[test]
fn test_thresholds_only_config_groups_everything_globally() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = write_config(
        &dir,
        "perf.yaml",
        "thresholds:\n  global:\n    max_ns_per_op: 5000\n    max_bytes_per_op: 1024\n    max_allocs_per_op: 7\n",
    );

    let gate = PerfGate::new(
        CannedRunner::new(GO_BENCH_OUTPUT),
        gate_config(Some(path), ThresholdOverrides::default()),
    );
    let report = gate.run().expect("Global budget covers every benchmark");

    assert_eq!(report.checked, 4);
    assert!(
        report
            .effective
            .benchmarks
            .values()
            .all(|group| group == GLOBAL_GROUP)
    );
}

#[test]
fn test_undeclared_group_fails_before_assertion() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = write_config(
        &dir,
        "perf.yaml",
        "thresholds:\n  db:\n    max_ns_per_op: 5000\nbenchmarks:\n  BenchmarkDBInsert: database\n",
    );

    let gate = PerfGate::new(
        CannedRunner::new(GO_BENCH_OUTPUT),
        gate_config(Some(path), ThresholdOverrides::default()),
    );
    let err = gate.run().expect_err("Typo in group name must not pass silently");

    assert!(matches!(
        err,
        PerfAssertError::Config(ConfigError::UnknownGroup { ref group, .. }) if group == "database"
    ));
}

#[test]
fn test_unrecognized_extension_is_ignored() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = write_config(&dir, "perf.toml", "this is not read");

    let gate = PerfGate::new(
        CannedRunner::new(GO_BENCH_OUTPUT),
        gate_config(
            Some(path),
            ThresholdOverrides {
                max_ns_per_op: 5000.0,
                max_bytes_per_op: 2048,
                max_allocs_per_op: 10,
            },
        ),
    );
    let report = gate.run().expect("Overrides alone should pass");

    assert_eq!(report.effective.thresholds.len(), 1);
    assert_eq!(report.checked, 4);
}

#[test]
fn test_malformed_config_fails() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = write_config(&dir, "perf.json", "{\"thresholds\": [}");

    let gate = PerfGate::new(
        CannedRunner::new(GO_BENCH_OUTPUT),
        gate_config(Some(path), ThresholdOverrides::default()),
    );
    let err = gate.run().expect_err("Broken JSON must fail");

    assert!(matches!(err, PerfAssertError::Config(ConfigError::Json(_))));
}

#[test]
fn test_runner_failure_stops_pipeline() {
    let runner = CannedRunner {
        output: "--- FAIL: BenchmarkDBInsert\npanic: boom\n".to_string(),
        exit_code: Some(1),
    };

    let gate = PerfGate::new(runner, gate_config(None, ThresholdOverrides::default()));
    let err = gate.run().expect_err("Non-zero exit must fail");

    assert!(matches!(
        err,
        PerfAssertError::Runner(RunnerError::Failed { .. })
    ));
    assert!(err.to_string().contains("panic: boom"));
}

#[test]
fn test_maxns_only_run_passes() {
    let gate = PerfGate::new(
        CannedRunner::new("BenchmarkFoo-4  1000  95.4 ns/op  16 B/op  1 allocs/op\n"),
        GateConfig {
            pattern: ".".to_string(),
            overrides: ThresholdOverrides {
                max_ns_per_op: 100.0,
                ..Default::default()
            },
            ..Default::default()
        },
    );

    let report = gate.run().expect("95.4 ns/op is within 100");

    assert_eq!(report.effective.benchmarks["BenchmarkFoo"], GLOBAL_GROUP);
    assert_eq!(
        report.effective.thresholds[GLOBAL_GROUP],
        Threshold {
            max_ns_per_op: Some(100.0),
            max_bytes_per_op: None,
            max_allocs_per_op: None,
        }
    );
}

#[test]
fn test_collect_all_mode_reports_first_in_order() {
    let gate = PerfGate::new(
        CannedRunner::new(GO_BENCH_OUTPUT),
        GateConfig {
            pattern: ".".to_string(),
            overrides: ThresholdOverrides {
                max_ns_per_op: 1000.0,
                max_bytes_per_op: 256,
                max_allocs_per_op: 10,
            },
            report_all: true,
            ..Default::default()
        },
    );

    let err = gate.run().expect_err("Several benchmarks exceed 1000 ns/op");
    let violation = match err {
        PerfAssertError::Assertion(AssertionError::Violation(violation)) => violation,
        other => panic!("expected a violation, got {other:?}"),
    };

    assert_eq!(violation.benchmark, "BenchmarkDBInsert");
    assert_eq!(violation.metric, Metric::NsPerOp);
}
