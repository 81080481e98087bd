//! # Threshold Assertion
//!
//! Checks parsed benchmark records against the effective configuration.
//! Records are visited in report order and each record's metrics in the
//! order ns/op, bytes/op, allocs/op. Benchmarks without a group assignment
//! are never checked.

use crate::error::AssertionError;
use crate::report::BenchmarkRecord;
use crate::thresholds::{GroupLookup, Metric, Threshold, ThresholdConfigs};
use thiserror::Error;

/// A benchmark metric that went over its group's budget
#[derive(Error, Debug, Clone, PartialEq)]
#[error("benchmark {benchmark} exceeded {metric} threshold: got {observed}, wanted {budget}")]
pub struct ThresholdViolation {
    pub benchmark: String,
    pub group: String,
    pub metric: Metric,
    pub observed: String,
    pub budget: String,
}

/// Fail on the first violation found
pub fn assert_thresholds(
    configs: &ThresholdConfigs,
    records: &[BenchmarkRecord],
) -> Result<(), AssertionError> {
    for record in records {
        if let Some((group, threshold)) = checked_group(configs, record)?
            && let Some(violation) = violations(record, group, threshold).next()
        {
            return Err(violation.into());
        }
    }
    Ok(())
}

/// Every violation in the report, in the same order [`assert_thresholds`] would find them
pub fn collect_violations(
    configs: &ThresholdConfigs,
    records: &[BenchmarkRecord],
) -> Result<Vec<ThresholdViolation>, AssertionError> {
    let mut found = Vec::new();
    for record in records {
        if let Some((group, threshold)) = checked_group(configs, record)? {
            found.extend(violations(record, group, threshold));
        }
    }
    Ok(found)
}

/// Number of records that have a budget and will be checked
pub fn checked_count(configs: &ThresholdConfigs, records: &[BenchmarkRecord]) -> usize {
    records
        .iter()
        .filter(|r| matches!(configs.threshold_for(&r.name), GroupLookup::Found { .. }))
        .count()
}

fn checked_group<'a>(
    configs: &'a ThresholdConfigs,
    record: &BenchmarkRecord,
) -> Result<Option<(&'a str, &'a Threshold)>, AssertionError> {
    match configs.threshold_for(&record.name) {
        GroupLookup::Exempt => Ok(None),
        GroupLookup::Missing { group } => Err(AssertionError::UnknownGroup {
            benchmark: record.name.clone(),
            group: group.to_string(),
        }),
        GroupLookup::Found { group, threshold } => {
            tracing::debug!(benchmark = %record.name, group, "checking thresholds");
            Ok(Some((group, threshold)))
        }
    }
}

fn violations<'a>(
    record: &'a BenchmarkRecord,
    group: &'a str,
    threshold: &'a Threshold,
) -> impl Iterator<Item = ThresholdViolation> + 'a {
    Metric::ALL.into_iter().filter_map(move |metric| {
        let (observed, budget) = match metric {
            Metric::NsPerOp => threshold
                .max_ns_per_op
                .filter(|max| record.ns_per_op > *max)
                .map(|max| (record.ns_per_op.to_string(), max.to_string()))?,
            Metric::BytesPerOp => threshold
                .max_bytes_per_op
                .filter(|max| record.bytes_per_op > *max)
                .map(|max| (record.bytes_per_op.to_string(), max.to_string()))?,
            Metric::AllocsPerOp => threshold
                .max_allocs_per_op
                .filter(|max| record.allocs_per_op > *max)
                .map(|max| (record.allocs_per_op.to_string(), max.to_string()))?,
        };

        Some(ThresholdViolation {
            benchmark: record.name.clone(),
            group: group.to_string(),
            metric,
            observed,
            budget,
        })
    })
}
