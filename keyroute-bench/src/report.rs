//! Structured log output of a finished batch

use keyroute_stats::{DistributionError, DistributionSnapshot};
use tracing::{info, warn};

use crate::driver::BatchOutcome;

/// Log batch throughput and delivery success
pub fn log_outcome(strategy: &str, outcome: &BatchOutcome) {
    info!(
        strategy,
        sent = outcome.sent(),
        attempted = outcome.attempted,
        failed = outcome.failed,
        elapsed_ms = outcome.elapsed.as_millis() as u64,
        rate = format_args!("{:.0} msg/s", outcome.send_rate()),
        success = format_args!("{:.2}%", outcome.success_rate()),
        "Batch summary"
    );
}

/// Log timing, balance and the per-partition breakdown of a snapshot
pub fn log_snapshot(snapshot: &DistributionSnapshot) {
    if snapshot.is_empty() {
        warn!("No messages were routed, distribution is empty");
        return;
    }

    info!(
        average_ns = snapshot.average_duration.as_nanos() as u64,
        throughput = format_args!("{:.0} msg/s", snapshot.theoretical_throughput),
        "Partition selection cost"
    );

    info!(
        partitions = snapshot.observed_partitions,
        mean = format_args!("{:.2}", snapshot.mean),
        std_dev = format_args!("{:.2}", snapshot.std_dev),
        cv = format_args!("{:.4}", snapshot.coefficient_of_variation),
        collision_rate = format_args!("{:.2}%", snapshot.collision_rate),
        "Distribution"
    );

    for report in snapshot.partition_reports() {
        if report.exceeds_threshold {
            warn!(
                partition = report.partition,
                count = report.count,
                share = format_args!("{:.2}%", report.share_percent),
                deviation = format_args!("{:+.2} ({:+.2}%)", report.deviation, report.deviation_percent),
                "Partition skewed"
            );
        } else {
            info!(
                partition = report.partition,
                count = report.count,
                share = format_args!("{:.2}%", report.share_percent),
                deviation = format_args!("{:+.2} ({:+.2}%)", report.deviation, report.deviation_percent),
                "Partition"
            );
        }
    }

    match snapshot.ratio() {
        Ok(ratio) => info!(
            min = snapshot.min_count,
            max = snapshot.max_count,
            diff = snapshot.min_max_diff,
            ratio = format_args!("{:.2}x", ratio),
            "Spread"
        ),
        Err(DistributionError::DegenerateDistribution { min, max }) => warn!(
            min,
            max,
            diff = snapshot.min_max_diff,
            "Spread ratio undefined"
        ),
    }
}
