//! Distribution Analyzer
//!
//! Reduces the records of a finished batch into a `DistributionSnapshot`.
//!
//! Statistics are taken over the partitions that actually received messages,
//! not the configured partition count: a sparse batch may never reach every
//! partition, and an unreached partition has no observation to average.
//!
//! ```text
//! [RoutingRecord] ──► counts per partition ──► mean / stdDev / CV
//!        │                     │
//!        │                     └──► collision rate, min / max / ratio
//!        ▼
//!   durations ──► average ──► theoretical throughput
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use keyroute_core::PartitionIndex;
use serde::Serialize;
use tracing::debug;

use crate::error::DistributionError;
use crate::numeric::{average_duration, min_max, population_std_dev};
use crate::record::RoutingRecord;

/// Relative deviation from the mean above which a partition counts as a collision
pub const COLLISION_THRESHOLD: f64 = 0.05;

/// Aggregate statistics of one routed batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSnapshot {
    /// Messages per observed partition
    pub counts: BTreeMap<PartitionIndex, u64>,
    pub total_sent: u64,
    /// Partitions that received at least one message
    pub observed_partitions: usize,
    pub mean: f64,
    /// Population standard deviation of the counts
    pub std_dev: f64,
    pub coefficient_of_variation: f64,
    /// Percentage of partitions deviating from the mean by more than the threshold
    pub collision_rate: f64,
    pub min_count: u64,
    pub max_count: u64,
    pub min_max_diff: u64,
    /// `max / min`, `None` when the min count is zero
    pub max_min_ratio: Option<f64>,
    pub average_duration: Duration,
    /// Messages per second implied by `average_duration`, zero when it is zero
    pub theoretical_throughput: f64,
    /// Threshold used for `collision_rate` and the partition reports
    pub threshold: f64,
}

impl DistributionSnapshot {
    /// Snapshot of a batch with no records
    pub fn empty() -> Self {
        Self::empty_with_threshold(COLLISION_THRESHOLD)
    }

    fn empty_with_threshold(threshold: f64) -> Self {
        Self {
            counts: BTreeMap::new(),
            total_sent: 0,
            observed_partitions: 0,
            mean: 0.0,
            std_dev: 0.0,
            coefficient_of_variation: 0.0,
            collision_rate: 0.0,
            min_count: 0,
            max_count: 0,
            min_max_diff: 0,
            max_min_ratio: None,
            average_duration: Duration::ZERO,
            theoretical_throughput: 0.0,
            threshold,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_sent == 0
    }

    /// `max / min` over the observed partitions
    pub fn ratio(&self) -> Result<f64, DistributionError> {
        self.max_min_ratio
            .ok_or(DistributionError::DegenerateDistribution {
                min: self.min_count,
                max: self.max_count,
            })
    }

    /// Per-partition breakdown in partition order
    pub fn partition_reports(&self) -> Vec<PartitionReport> {
        self.counts
            .iter()
            .map(|(&partition, &count)| {
                let deviation = count as f64 - self.mean;
                let deviation_percent = deviation / self.mean * 100.0;
                PartitionReport {
                    partition,
                    count,
                    share_percent: count as f64 / self.total_sent as f64 * 100.0,
                    deviation,
                    deviation_percent,
                    exceeds_threshold: deviation_percent.abs() > self.threshold * 100.0,
                }
            })
            .collect()
    }
}

/// One partition's row in the breakdown
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PartitionReport {
    pub partition: PartitionIndex,
    pub count: u64,
    /// Share of all sent messages, in percent
    pub share_percent: f64,
    /// `count - mean`
    pub deviation: f64,
    pub deviation_percent: f64,
    pub exceeds_threshold: bool,
}

/// Computes distribution snapshots
#[derive(Debug, Clone, Copy)]
pub struct DistributionAnalyzer {
    threshold: f64,
}

impl DistributionAnalyzer {
    /// Create with the default 5% collision threshold
    pub fn new() -> Self {
        Self {
            threshold: COLLISION_THRESHOLD,
        }
    }

    /// Create with a custom collision threshold (fraction of the mean)
    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Reduce a finished batch into a snapshot
    pub fn analyze(&self, records: &[RoutingRecord]) -> DistributionSnapshot {
        if records.is_empty() {
            return DistributionSnapshot::empty_with_threshold(self.threshold);
        }

        let mut counts: BTreeMap<PartitionIndex, u64> = BTreeMap::new();
        for record in records {
            *counts.entry(record.partition).or_insert(0) += 1;
        }

        let total_sent = records.len() as u64;
        let observed_partitions = counts.len();
        let mean = total_sent as f64 / observed_partitions as f64;

        let values: Vec<u64> = counts.values().copied().collect();
        let std_dev = population_std_dev(&values, mean);
        let coefficient_of_variation = std_dev / mean;

        let collisions = values
            .iter()
            .filter(|&&count| (count as f64 - mean).abs() / mean > self.threshold)
            .count();
        let collision_rate = collisions as f64 / observed_partitions as f64 * 100.0;

        let (min_count, max_count) = min_max(values.iter().copied()).unwrap_or((0, 0));
        let max_min_ratio = (min_count > 0).then(|| max_count as f64 / min_count as f64);

        let durations: Vec<Duration> = records.iter().map(|r| r.compute_duration).collect();
        let average_duration = average_duration(&durations);
        let theoretical_throughput = if average_duration.is_zero() {
            0.0
        } else {
            1.0 / average_duration.as_secs_f64()
        };

        debug!(
            total_sent,
            observed_partitions,
            mean,
            std_dev,
            collision_rate,
            "Distribution analyzed"
        );

        DistributionSnapshot {
            counts,
            total_sent,
            observed_partitions,
            mean,
            std_dev,
            coefficient_of_variation,
            collision_rate,
            min_count,
            max_count,
            min_max_diff: max_count - min_count,
            max_min_ratio,
            average_duration,
            theoretical_throughput,
            threshold: self.threshold,
        }
    }
}

impl Default for DistributionAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Analyze a finished batch with the default threshold
pub fn analyze_distribution(records: &[RoutingRecord]) -> DistributionSnapshot {
    DistributionAnalyzer::new().analyze(records)
}
