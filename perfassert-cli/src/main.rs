use clap::{Parser, ValueEnum};
use std::path::PathBuf;

mod perf;

use perf::{PerfEnv, run_perf_assert};

#[derive(Parser, Debug)]
#[command(name = "perfassert", version)]
#[command(about = "Run Go benchmarks and fail when they exceed their performance thresholds")]
struct Cli {
    /// Pattern to pass to 'go test -bench' (e.g. ., BenchmarkDBInsert, 'BenchmarkDB*')
    #[arg(long)]
    bench: String,
    /// Enable memory allocation statistics
    #[arg(long)]
    benchmem: bool,
    /// Run enough iterations of each benchmark to take t (default 1s), or Nx
    #[arg(long)]
    benchtime: Option<String>,
    /// Path to a YAML or JSON threshold file [env: PERFASSERT_CONFIG]
    #[arg(long)]
    config: Option<PathBuf>,
    /// Threshold for ns/op
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    maxns: f64,
    /// Threshold for B/op
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    maxbytes: i64,
    /// Threshold for allocs/op
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    maxallocs: i64,
    /// Package directory to run the benchmarks in
    #[arg(long)]
    dir: Option<PathBuf>,
    /// Check a captured benchmark report instead of running 'go test' ('-' reads stdin)
    #[arg(long)]
    report: Option<PathBuf>,
    /// Log every threshold violation before failing
    #[arg(long)]
    all_violations: bool,
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_logging(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.with_target(false).try_init(),
    };
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    if let Err(err) = run_perf_assert(&cli, &PerfEnv::from_process()) {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}
