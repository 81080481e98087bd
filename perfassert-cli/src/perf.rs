//! Performance gate command

use crate::Cli;
use perfassert_core::{
    BenchFlags, GateConfig, GateReport, GoTestRunner, PerfAssertError, PerfGate,
    ThresholdOverrides,
};
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_ENV: &str = "PERFASSERT_CONFIG";
const GO_ENV: &str = "PERFASSERT_GO";

/// Environment fallbacks, captured once at startup
#[derive(Debug, Clone, Default)]
pub struct PerfEnv {
    /// Threshold file used when `--config` is absent
    pub config: Option<String>,
    /// `go` binary to run instead of the one on `PATH`
    pub go: Option<String>,
}

impl PerfEnv {
    pub fn from_process() -> Self {
        let non_empty = |key: &str| env::var(key).ok().filter(|v| !v.is_empty());
        Self {
            config: non_empty(CONFIG_ENV),
            go: non_empty(GO_ENV),
        }
    }
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("error reading benchmark report {}: {source}", .path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Gate(#[from] PerfAssertError),
}

/// Translate parsed arguments into a gate configuration, with the
/// environment filling in anything the flags left out
fn gate_config(cli: &Cli, env_config: Option<&str>) -> GateConfig {
    GateConfig {
        pattern: cli.bench.clone(),
        flags: BenchFlags {
            benchmem: cli.benchmem,
            benchtime: cli.benchtime.clone(),
        },
        config_path: cli
            .config
            .clone()
            .or_else(|| env_config.filter(|p| !p.is_empty()).map(PathBuf::from)),
        overrides: ThresholdOverrides {
            max_ns_per_op: cli.maxns,
            max_bytes_per_op: cli.maxbytes,
            max_allocs_per_op: cli.maxallocs,
        },
        report_all: cli.all_violations,
    }
}

fn create_runner(cli: &Cli, go: Option<&str>) -> GoTestRunner {
    let mut runner = GoTestRunner::new();

    if let Some(program) = go
        && !program.is_empty()
    {
        runner = runner.with_program(program);
    }

    if let Some(dir) = &cli.dir {
        runner = runner.in_dir(dir);
    }

    runner
}

fn read_report(path: &Path) -> Result<String, CliError> {
    let to_err = |source| CliError::Report {
        path: path.to_path_buf(),
        source,
    };

    if path == Path::new("-") {
        let mut output = String::new();
        io::stdin().read_to_string(&mut output).map_err(to_err)?;
        Ok(output)
    } else {
        fs::read_to_string(path).map_err(to_err)
    }
}

pub fn run_perf_assert(cli: &Cli, perf_env: &PerfEnv) -> Result<GateReport, CliError> {
    let config = gate_config(cli, perf_env.config.as_deref());
    let gate = PerfGate::new(create_runner(cli, perf_env.go.as_deref()), config);

    let report = match &cli.report {
        Some(path) => gate.evaluate(&read_report(path)?)?,
        None => gate.run()?,
    };

    tracing::info!("Threshold checks passed. Exiting perfassert...");
    Ok(report)
}
