//! Keyroute Bench - Main entry point

use std::sync::Arc;

use keyroute_bench::{install_broker_defaults, report, BatchDriver, BenchConfig, InMemoryBroker};
use keyroute_core::StrategyRegistry;
use keyroute_stats::analyze_distribution;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration from environment
    let config = BenchConfig::from_env();
    let partitions = config.validate()?;

    // Built-in strategies plus the broker client defaults
    let mut registry = StrategyRegistry::new();
    install_broker_defaults(&mut registry);

    let broker = Arc::new(
        InMemoryBroker::new(config.broker.address.clone(), partitions)
            .with_topic(config.broker.topic.clone()),
    );

    let driver = BatchDriver::new(config, &registry, broker)?;
    let outcome = driver.run().await?;

    let snapshot = analyze_distribution(&outcome.records);
    report::log_outcome(driver.strategy_name(), &outcome);
    report::log_snapshot(&snapshot);

    Ok(())
}
