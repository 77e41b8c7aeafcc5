//! Keyroute Bench - partition strategy benchmark
//!
//! Routes a batch of keyed messages through one strategy, hands each message
//! to a `MessageSink`, and analyzes how evenly and how fast the strategy
//! spread the keys.

pub mod config;
pub mod driver;
pub mod message;
pub mod partitioners;
pub mod report;
pub mod sink;

pub use config::{BenchConfig, BrokerConfig, ConfigError};
pub use driver::{BatchDriver, BatchOutcome, DriverError};
pub use partitioners::{install_broker_defaults, HashPartitioner, RandomPartitioner, RoundRobinPartitioner};
pub use sink::{InMemoryBroker, MessageSink, PartitionLog, SinkError};
