//! # Benchmark Runner
//!
//! Executes `go test -bench` and captures what it printed. The runner is a
//! trait so the pipeline can be driven from captured reports or scripted
//! output in tests.

use crate::error::RunnerError;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Flags forwarded to the benchmark harness
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BenchFlags {
    /// Report allocations (`-benchmem`)
    pub benchmem: bool,
    /// Run time per benchmark (`-benchtime`), e.g. `2s` or `500x`
    pub benchtime: Option<String>,
}

impl BenchFlags {
    /// Validate and render the flags in the order the harness expects
    pub fn to_args(&self) -> Result<Vec<String>, RunnerError> {
        let mut args = Vec::new();
        if self.benchmem {
            args.push("-benchmem".to_string());
        }
        if let Some(benchtime) = self.benchtime.as_deref().filter(|t| !t.is_empty()) {
            validate_benchtime(benchtime)?;
            args.push("-benchtime".to_string());
            args.push(benchtime.to_string());
        }
        Ok(args)
    }
}

/// Accepts iteration counts (`100x`) and durations (`1s`, `250ms`, `1m30s`)
pub fn validate_benchtime(value: &str) -> Result<(), RunnerError> {
    let invalid = || RunnerError::InvalidBenchtime {
        value: value.to_string(),
    };

    if let Some(count) = value.strip_suffix('x') {
        return match count.parse::<u64>() {
            Ok(n) if n > 0 => Ok(()),
            _ => Err(invalid()),
        };
    }

    humantime::parse_duration(value).map(|_| ()).map_err(|_| invalid())
}

/// Captured result of one harness invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    /// Standard output followed by standard error
    pub output: String,
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Something that can execute benchmarks matching a pattern
pub trait BenchmarkRunner {
    fn run(&self, pattern: &str, flags: &[String]) -> Result<RunOutput, RunnerError>;
}

impl<T: BenchmarkRunner + ?Sized> BenchmarkRunner for &T {
    fn run(&self, pattern: &str, flags: &[String]) -> Result<RunOutput, RunnerError> {
        (**self).run(pattern, flags)
    }
}

/// Runs benchmarks through the Go toolchain
#[derive(Debug, Clone)]
pub struct GoTestRunner {
    program: String,
    working_dir: Option<PathBuf>,
}

impl GoTestRunner {
    pub fn new() -> Self {
        Self {
            program: "go".to_string(),
            working_dir: None,
        }
    }

    /// Use a specific `go` binary
    pub fn with_program<S: Into<String>>(mut self, program: S) -> Self {
        self.program = program.into();
        self
    }

    /// Run from a package directory instead of the current one
    pub fn in_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command_args(pattern: &str, flags: &[String]) -> Vec<String> {
        let mut args = vec!["test".to_string(), "-bench".to_string(), pattern.to_string()];
        args.extend(flags.iter().cloned());
        args
    }
}

impl Default for GoTestRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl BenchmarkRunner for GoTestRunner {
    fn run(&self, pattern: &str, flags: &[String]) -> Result<RunOutput, RunnerError> {
        let args = Self::command_args(pattern, flags);
        let mut cmd = Command::new(&self.program);
        cmd.args(&args);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null());

        tracing::info!(program = %self.program, ?args, "running benchmarks");
        let output = cmd.output().map_err(|source| RunnerError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(RunOutput {
            output: text,
            exit_code: output.status.code(),
        })
    }
}
