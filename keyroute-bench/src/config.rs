//! Configuration for a benchmark batch

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use keyroute_core::PartitionCount;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Batch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Strategy name, resolved through the registry
    pub algorithm: String,

    /// Messages to route
    pub num_messages: usize,

    /// Concurrent routing workers
    pub workers: usize,

    /// Send messages without keys
    pub keyless: bool,

    /// Seed for the workers' random sources (entropy when unset)
    pub rng_seed: Option<u64>,

    /// Broker configuration
    pub broker: BrokerConfig,
}

/// Broker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Broker address
    pub address: String,

    /// Target topic
    pub topic: String,

    /// Partitions of the target topic
    pub partitions: i64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            algorithm: "crc32".to_string(),
            num_messages: 100_000,
            workers: 4,
            keyless: false,
            rng_seed: None,
            broker: BrokerConfig::default(),
        }
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            address: "localhost:9092".to_string(),
            topic: "create-10".to_string(),
            partitions: 10,
        }
    }
}

/// Parse an env var, keeping `current` when unset or unparseable
fn parse_env<T: std::str::FromStr>(name: &str, current: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(var = name, value = %raw, "Ignoring unparseable environment variable");
                current
            }
        },
        Err(_) => current,
    }
}

impl BenchConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = BenchConfig::default();

        // Strategy
        if let Ok(algorithm) = std::env::var("ALGORITHM") {
            config.algorithm = algorithm.trim().to_string();
        }

        config.num_messages = parse_env("NUM_MESSAGES", config.num_messages);
        config.workers = parse_env("WORKERS", config.workers);
        config.keyless = parse_env("KEYLESS", config.keyless);

        if let Ok(raw) = std::env::var("RNG_SEED") {
            match raw.trim().parse() {
                Ok(seed) => config.rng_seed = Some(seed),
                Err(_) => warn!(value = %raw, "Ignoring unparseable RNG_SEED"),
            }
        }

        // Broker
        if let Ok(address) = std::env::var("BROKER") {
            config.broker.address = address.trim().to_string();
        }
        if let Ok(topic) = std::env::var("TOPIC") {
            config.broker.topic = topic.trim().to_string();
        }
        config.broker.partitions = parse_env("PARTITIONS", config.broker.partitions);

        config
    }

    /// Reject settings that cannot produce a batch
    pub fn validate(&self) -> Result<PartitionCount, ConfigError> {
        if self.num_messages == 0 {
            return Err(ConfigError::Invalid("NUM_MESSAGES must be positive".to_string()));
        }
        if self.workers == 0 {
            return Err(ConfigError::Invalid("WORKERS must be positive".to_string()));
        }
        if self.broker.topic.is_empty() {
            return Err(ConfigError::Invalid("TOPIC must not be empty".to_string()));
        }
        PartitionCount::new(self.broker.partitions)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BenchConfig::default();
        assert_eq!(config.algorithm, "crc32");
        assert_eq!(config.num_messages, 100_000);
        assert_eq!(config.broker.address, "localhost:9092");
        assert_eq!(config.broker.topic, "create-10");
        assert_eq!(config.validate().unwrap().get(), 10);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = BenchConfig::default();
        config.broker.partitions = 0;
        assert!(config.validate().is_err());

        let mut config = BenchConfig::default();
        config.workers = 0;
        assert!(config.validate().is_err());

        let mut config = BenchConfig::default();
        config.num_messages = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_env_fallback() {
        // Unset variable keeps the current value
        assert_eq!(parse_env("KEYROUTE_TEST_UNSET_VAR", 7usize), 7);
    }
}
