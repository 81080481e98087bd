//! # Benchmark Report Parser
//!
//! Extracts result lines from the combined output of `go test -bench`.
//! Build output, log lines and the trailing `PASS`/`ok` summary are ignored;
//! only lines matching the runner's fixed result grammar become records:
//!
//! ```text
//! BenchmarkFoo-8   	 1000000	      1052 ns/op	  12.50 MB/s	     256 B/op	       3 allocs/op
//! ```

use crate::error::ReportError;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// `<name>-<cores> <ops> <ns> ns/op [<mb> MB/s] [<bytes> B/op <allocs> allocs/op]`
const RESULT_LINE_PATTERN: &str = r"(\w+)-(\d+)[ \t]+(\d+)[ \t]+(\d+(?:\.\d+)?)[ \t]+ns/op(?:[ \t]+(\d+(?:\.\d+)?)[ \t]+MB/s)?(?:[ \t]+(\d+)[ \t]+B/op[ \t]+(\d+)[ \t]+allocs/op)?";

static RESULT_LINE: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(RESULT_LINE_PATTERN));

/// One parsed benchmark result line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub name: String,
    /// GOMAXPROCS the benchmark ran with
    pub cores: u32,
    pub total_ops: u64,
    pub ns_per_op: f64,
    /// Zero unless the runner was asked for memory statistics
    pub bytes_per_op: i64,
    /// Zero unless the runner was asked for memory statistics
    pub allocs_per_op: i64,
    /// Only reported by benchmarks that call `b.SetBytes`
    pub mb_per_sec: Option<f64>,
}

/// Parse every benchmark result in `output`, in document order.
///
/// Unmatched text is skipped and a field that fails to decode falls back to
/// zero, so this only errors if the result pattern itself cannot be built.
pub fn parse_report(output: &str) -> Result<Vec<BenchmarkRecord>, ReportError> {
    let pattern = RESULT_LINE
        .as_ref()
        .map_err(|e| ReportError::Pattern(e.clone()))?;

    let records: Vec<BenchmarkRecord> = pattern
        .captures_iter(output)
        .map(|caps| BenchmarkRecord {
            name: caps[1].to_string(),
            cores: field(&caps, 2),
            total_ops: field(&caps, 3),
            ns_per_op: field(&caps, 4),
            mb_per_sec: caps.get(5).and_then(|m| m.as_str().parse().ok()),
            bytes_per_op: field(&caps, 6),
            allocs_per_op: field(&caps, 7),
        })
        .collect();

    tracing::debug!(count = records.len(), "parsed benchmark results");
    Ok(records)
}

fn field<T: FromStr + Default>(caps: &Captures<'_>, index: usize) -> T {
    caps.get(index)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or_default()
}
