//! Batch driver
//!
//! Splits a batch across routing workers. Each worker generates keys, times
//! the partition choice, hands the message to the sink and keeps its records
//! in a local list that is merged into the shared collector when it is done.
//!
//! ```text
//!             ┌──► worker 0 ──┐
//! BatchDriver ├──► worker 1 ──┼──► RecordCollector ──► BatchOutcome
//!             └──► worker N ──┘
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use keyroute_core::{PartitionCount, PartitionError, PartitionSelector, StrategyRegistry};
use keyroute_stats::{RecordCollector, RoutingRecord};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{BenchConfig, ConfigError};
use crate::message::{new_key, Payload};
use crate::sink::{MessageSink, SinkError};

const PROGRESS_INTERVAL: usize = 10_000;

/// Driver error types
#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Partition(#[from] PartitionError),

    #[error("Routing worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Result of a routed batch
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// One record per successfully sent message
    pub records: Vec<RoutingRecord>,
    /// Messages the driver tried to send
    pub attempted: usize,
    /// Messages the sink rejected
    pub failed: usize,
    /// Wall-clock time of the whole batch
    pub elapsed: Duration,
}

impl BatchOutcome {
    pub fn sent(&self) -> usize {
        self.records.len()
    }

    /// Sent over attempted, in percent
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            return 0.0;
        }
        self.sent() as f64 / self.attempted as f64 * 100.0
    }

    /// Attempted messages per second of wall-clock time
    pub fn send_rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.attempted as f64 / secs
    }
}

/// Everything a worker needs, cloned per task
#[derive(Clone)]
struct WorkerContext {
    selector: Arc<dyn PartitionSelector>,
    sink: Arc<dyn MessageSink>,
    collector: RecordCollector,
    topic: Arc<str>,
    partitions: PartitionCount,
    keyless: bool,
}

/// Routes one batch through a single strategy
pub struct BatchDriver {
    config: BenchConfig,
    partitions: PartitionCount,
    selector: Arc<dyn PartitionSelector>,
    sink: Arc<dyn MessageSink>,
}

impl BatchDriver {
    /// Validate the config and resolve the strategy once for the whole batch
    pub fn new(
        config: BenchConfig,
        registry: &StrategyRegistry,
        sink: Arc<dyn MessageSink>,
    ) -> Result<Self, DriverError> {
        let partitions = config.validate()?;
        let selector = registry.resolve(&config.algorithm)?;

        info!(
            strategy = selector.name(),
            consistent = selector.requires_consistency(),
            partitions = %partitions,
            "Strategy resolved"
        );

        Ok(Self {
            config,
            partitions,
            selector,
            sink,
        })
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    pub fn strategy_name(&self) -> &'static str {
        self.selector.name()
    }

    /// Route the whole batch and collect its records
    pub async fn run(&self) -> Result<BatchOutcome, DriverError> {
        let start = Instant::now();
        let collector = RecordCollector::with_capacity(self.config.num_messages);

        let ctx = WorkerContext {
            selector: self.selector.clone(),
            sink: self.sink.clone(),
            collector: collector.clone(),
            topic: Arc::from(self.config.broker.topic.as_str()),
            partitions: self.partitions,
            keyless: self.config.keyless,
        };

        info!(
            messages = self.config.num_messages,
            workers = self.config.workers,
            topic = %ctx.topic,
            broker = %self.config.broker.address,
            strategy = self.selector.name(),
            "Starting batch"
        );

        let handles: Vec<_> = worker_shares(self.config.num_messages, self.config.workers)
            .into_iter()
            .enumerate()
            .map(|(worker, share)| {
                let ctx = ctx.clone();
                let rng = match self.config.rng_seed {
                    Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(worker as u64)),
                    None => StdRng::from_entropy(),
                };
                tokio::spawn(run_worker(worker, share, ctx, rng))
            })
            .collect();

        let mut failed = 0;
        for result in join_all(handles).await {
            failed += result?;
        }

        let outcome = BatchOutcome {
            records: collector.finish(),
            attempted: self.config.num_messages,
            failed,
            elapsed: start.elapsed(),
        };

        info!(
            sent = outcome.sent(),
            failed = outcome.failed,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "Batch finished"
        );

        Ok(outcome)
    }
}

/// Split `total` messages over `workers`, spreading the remainder
fn worker_shares(total: usize, workers: usize) -> Vec<usize> {
    let base = total / workers;
    let extra = total % workers;
    (0..workers)
        .map(|worker| base + usize::from(worker < extra))
        .filter(|&share| share > 0)
        .collect()
}

/// Route `share` messages; returns the number of failed sends
async fn run_worker(worker: usize, share: usize, ctx: WorkerContext, mut rng: StdRng) -> usize {
    let mut records = Vec::with_capacity(share);
    let mut failed = 0;

    for i in 0..share {
        let key = (!ctx.keyless).then(new_key);

        let start = Instant::now();
        let partition = ctx
            .selector
            .select(key.as_deref().map(str::as_bytes), ctx.partitions, &mut rng);
        let compute_duration = start.elapsed();

        let sent = match Payload::now().encode() {
            Ok(payload) => ctx.sink.send(&ctx.topic, partition, payload).await,
            Err(e) => Err(SinkError::from(e)),
        };

        match sent {
            Ok(landed) => records.push(RoutingRecord::new(landed, compute_duration)),
            Err(e) => {
                warn!(worker, partition, error = %e, "Failed to send message");
                failed += 1;
            }
        }

        if (i + 1) % PROGRESS_INTERVAL == 0 {
            debug!(worker, sent = i + 1, "Progress");
        }
    }

    ctx.collector.append(records);
    failed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_shares() {
        assert_eq!(worker_shares(10, 3), vec![4, 3, 3]);
        assert_eq!(worker_shares(8, 4), vec![2, 2, 2, 2]);
        // More workers than messages: idle workers are dropped
        assert_eq!(worker_shares(2, 5), vec![1, 1]);
        assert_eq!(worker_shares(100, 3).iter().sum::<usize>(), 100);
    }

    #[test]
    fn test_outcome_rates() {
        let outcome = BatchOutcome {
            records: vec![RoutingRecord::new(0, Duration::ZERO); 3],
            attempted: 4,
            failed: 1,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(outcome.sent(), 3);
        assert_eq!(outcome.success_rate(), 75.0);
        assert_eq!(outcome.send_rate(), 2.0);
    }

    #[test]
    fn test_outcome_rates_empty() {
        let outcome = BatchOutcome {
            records: vec![],
            attempted: 0,
            failed: 0,
            elapsed: Duration::ZERO,
        };
        assert_eq!(outcome.success_rate(), 0.0);
        assert_eq!(outcome.send_rate(), 0.0);
    }
}
