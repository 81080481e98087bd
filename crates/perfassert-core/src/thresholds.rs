//! # Threshold Model
//!
//! Budgets per named group and the mapping that assigns benchmarks to
//! groups, loaded from a YAML or JSON file:
//!
//! ```yaml
//! thresholds:
//!   fast:
//!     max_ns_per_op: 250.0
//!     max_bytes_per_op: 64
//!     max_allocs_per_op: 1
//! benchmarks:
//!   BenchmarkDBSelect: fast
//! ```

use crate::error::ConfigError;
use crate::report::BenchmarkRecord;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Group used when nothing more specific is configured
pub const GLOBAL_GROUP: &str = "global";

/// Upper bounds for a single group.
///
/// `None` places no budget on that metric. `Some(0)` is a real budget: the
/// metric must measure exactly zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Threshold {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_ns_per_op: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bytes_per_op: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_allocs_per_op: Option<i64>,
}

/// A measured metric that can carry a budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    NsPerOp,
    BytesPerOp,
    AllocsPerOp,
}

impl Metric {
    /// Check order used by the assertion engine
    pub const ALL: [Metric; 3] = [Metric::NsPerOp, Metric::BytesPerOp, Metric::AllocsPerOp];

    /// Name of the command-line flag that overrides this metric's budget
    pub fn flag(self) -> &'static str {
        match self {
            Metric::NsPerOp => "maxns",
            Metric::BytesPerOp => "maxbytes",
            Metric::AllocsPerOp => "maxallocs",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Metric::NsPerOp => "ns/op",
            Metric::BytesPerOp => "bytes/op",
            Metric::AllocsPerOp => "allocs/op",
        })
    }
}

/// Serialization format of a threshold file, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    /// Accepted without decoding; yields an empty configuration
    Unrecognized,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Unrecognized,
        }
    }
}

/// Where a benchmark's budget comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroupLookup<'a> {
    /// No group assignment: the benchmark is not checked
    Exempt,
    /// Assigned to a group that declares no thresholds
    Missing { group: &'a str },
    Found {
        group: &'a str,
        threshold: &'a Threshold,
    },
}

/// Thresholds per group plus benchmark-to-group assignments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfigs {
    #[serde(deserialize_with = "null_as_default")]
    pub thresholds: BTreeMap<String, Threshold>,
    #[serde(deserialize_with = "null_as_default")]
    pub benchmarks: BTreeMap<String, String>,
}

/// `thresholds: null` and an empty `benchmarks:` section decode as empty maps
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ThresholdConfigs {
    /// Read and decode a threshold file, picking the format from its extension
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let configs = Self::load_from_bytes(&data, ConfigFormat::from_path(path))?;
        tracing::info!(
            path = %path.display(),
            groups = configs.thresholds.len(),
            benchmarks = configs.benchmarks.len(),
            "loaded threshold config"
        );
        Ok(configs)
    }

    pub fn load_from_bytes(data: &[u8], format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Yaml => Ok(serde_yaml::from_slice(data)?),
            ConfigFormat::Json => Ok(serde_json::from_slice(data)?),
            ConfigFormat::Unrecognized => {
                tracing::warn!(
                    "config file has no .yaml, .yml or .json extension; ignoring its contents"
                );
                Ok(Self::default())
            }
        }
    }

    /// Assign every not-yet-mapped benchmark in `records` to the global group
    pub fn derive_default_grouping(&mut self, records: &[BenchmarkRecord]) {
        for record in records {
            self.benchmarks
                .entry(record.name.clone())
                .or_insert_with(|| GLOBAL_GROUP.to_string());
        }
    }

    pub fn threshold_for(&self, benchmark: &str) -> GroupLookup<'_> {
        let Some(group) = self
            .benchmarks
            .get(benchmark)
            .map(String::as_str)
            .filter(|g| !g.is_empty())
        else {
            return GroupLookup::Exempt;
        };

        match self.thresholds.get(group) {
            Some(threshold) => GroupLookup::Found { group, threshold },
            None => GroupLookup::Missing { group },
        }
    }
}
