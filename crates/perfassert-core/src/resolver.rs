//! # Threshold Resolution
//!
//! Turns whatever came out of the config file into the effective
//! configuration used for assertion: default grouping for files without a
//! `benchmarks` section, command-line overrides, and a final check that every
//! assigned group actually has thresholds.

use crate::error::{ConfigError, OverrideError, PerfAssertError};
use crate::report::BenchmarkRecord;
use crate::thresholds::{GLOBAL_GROUP, Metric, Threshold, ThresholdConfigs};

/// Budgets supplied on the command line. Zero means "not supplied".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThresholdOverrides {
    pub max_ns_per_op: f64,
    pub max_bytes_per_op: i64,
    pub max_allocs_per_op: i64,
}

impl ThresholdOverrides {
    pub fn is_empty(&self) -> bool {
        self.ns_per_op().is_none() && self.bytes_per_op().is_none() && self.allocs_per_op().is_none()
    }

    pub fn ns_per_op(&self) -> Option<f64> {
        (self.max_ns_per_op != 0.0).then_some(self.max_ns_per_op)
    }

    pub fn bytes_per_op(&self) -> Option<i64> {
        (self.max_bytes_per_op != 0).then_some(self.max_bytes_per_op)
    }

    pub fn allocs_per_op(&self) -> Option<i64> {
        (self.max_allocs_per_op != 0).then_some(self.max_allocs_per_op)
    }

    /// A NaN or infinite ns/op budget can never be exceeded
    fn check_finite(&self) -> Result<(), OverrideError> {
        if self.max_ns_per_op.is_finite() {
            return Ok(());
        }
        Err(OverrideError::NotFinite {
            flag: Metric::NsPerOp.flag(),
            value: self.max_ns_per_op.to_string(),
        })
    }

    fn validate(&self) -> Result<(), OverrideError> {
        let negative = |metric: Metric, value: String| OverrideError::Negative {
            flag: metric.flag(),
            value,
        };

        if self.max_ns_per_op < 0.0 {
            return Err(negative(Metric::NsPerOp, self.max_ns_per_op.to_string()));
        }
        if self.max_bytes_per_op < 0 {
            return Err(negative(
                Metric::BytesPerOp,
                self.max_bytes_per_op.to_string(),
            ));
        }
        if self.max_allocs_per_op < 0 {
            return Err(negative(
                Metric::AllocsPerOp,
                self.max_allocs_per_op.to_string(),
            ));
        }
        Ok(())
    }
}

impl From<ThresholdOverrides> for Threshold {
    fn from(overrides: ThresholdOverrides) -> Self {
        Threshold {
            max_ns_per_op: overrides.ns_per_op(),
            max_bytes_per_op: overrides.bytes_per_op(),
            max_allocs_per_op: overrides.allocs_per_op(),
        }
    }
}

/// Apply command-line budgets on top of `configs`.
///
/// With declared groups, each supplied value replaces that one field in every
/// group; all values are validated first so a rejected override changes
/// nothing. Without declared groups a single `global` group is created from
/// the supplied values as given, with no budget on the rest.
pub fn apply_overrides(
    configs: &mut ThresholdConfigs,
    overrides: &ThresholdOverrides,
) -> Result<(), OverrideError> {
    overrides.check_finite()?;

    if configs.thresholds.is_empty() {
        tracing::info!(?overrides, "using command line thresholds for the global group");
        configs
            .thresholds
            .insert(GLOBAL_GROUP.to_string(), Threshold::from(*overrides));
        return Ok(());
    }

    overrides.validate()?;

    for (group, threshold) in configs.thresholds.iter_mut() {
        if let Some(ns) = overrides.ns_per_op() {
            threshold.max_ns_per_op = Some(ns);
        }
        if let Some(bytes) = overrides.bytes_per_op() {
            threshold.max_bytes_per_op = Some(bytes);
        }
        if let Some(allocs) = overrides.allocs_per_op() {
            threshold.max_allocs_per_op = Some(allocs);
        }
        tracing::debug!(group = %group, ?threshold, "applied command line thresholds");
    }

    Ok(())
}

/// Ensure every benchmark assignment points at a declared group
pub fn validate_groups(configs: &ThresholdConfigs) -> Result<(), ConfigError> {
    match configs
        .benchmarks
        .iter()
        .find(|(_, group)| !group.is_empty() && !configs.thresholds.contains_key(*group))
    {
        Some((benchmark, group)) => Err(ConfigError::UnknownGroup {
            benchmark: benchmark.clone(),
            group: group.clone(),
        }),
        None => Ok(()),
    }
}

/// Build the effective configuration for one run
pub fn resolve(
    mut configs: ThresholdConfigs,
    records: &[BenchmarkRecord],
    overrides: &ThresholdOverrides,
) -> Result<ThresholdConfigs, PerfAssertError> {
    if configs.benchmarks.is_empty() {
        configs.derive_default_grouping(records);
    }

    if !overrides.is_empty() {
        apply_overrides(&mut configs, overrides)?;
    }

    validate_groups(&configs)?;
    Ok(configs)
}
