//! Strategy Registry
//!
//! Maps strategy names to `PartitionSelector` implementations. A driver
//! resolves its strategy once per batch and then calls it directly, instead of
//! branching on the name for every message.
//!
//! # Name Resolution
//!
//! ```text
//! strategy name
//!        │
//!        ▼
//! Known name? ──No──► UnknownStrategy
//!        │
//!       Yes
//!        │
//!        ▼
//! Registered? ──No──► DelegatedStrategy (broker client default)
//!        │
//!       Yes
//!        ▼
//! Arc<dyn PartitionSelector>
//! ```

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::PartitionError;
use crate::strategy::{
    ConsistentRandomStrategy, Crc32Strategy, Fnv1aRandomStrategy, Fnv1aStrategy,
    Murmur2RandomStrategy, Murmur2Strategy, PartitionSelector,
};
use crate::types::{PartitionCount, PartitionIndex};

/// Recognized strategy names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyName {
    #[serde(rename = "crc32")]
    Crc32,
    #[serde(rename = "consistent_random")]
    ConsistentRandom,
    #[serde(rename = "murmur2")]
    Murmur2,
    #[serde(rename = "murmur2_random")]
    Murmur2Random,
    #[serde(rename = "fnv1a")]
    Fnv1a,
    #[serde(rename = "fnv1a_random")]
    Fnv1aRandom,
    /// Broker client hash partitioner
    #[serde(rename = "hash")]
    Hash,
    /// Broker client reference-compatible hash partitioner
    #[serde(rename = "hash-ref")]
    HashRef,
    /// Broker client random partitioner
    #[serde(rename = "random")]
    Random,
    /// Broker client round-robin partitioner
    #[serde(rename = "round-robin")]
    RoundRobin,
}

impl StrategyName {
    /// Strategies implemented by this crate
    pub const BUILTIN: [StrategyName; 6] = [
        StrategyName::Crc32,
        StrategyName::ConsistentRandom,
        StrategyName::Murmur2,
        StrategyName::Murmur2Random,
        StrategyName::Fnv1a,
        StrategyName::Fnv1aRandom,
    ];

    /// Names handed through to the broker client's own partitioners
    pub const DELEGATED: [StrategyName; 4] = [
        StrategyName::Hash,
        StrategyName::HashRef,
        StrategyName::Random,
        StrategyName::RoundRobin,
    ];

    /// Wire name, as accepted by `FromStr`
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyName::Crc32 => "crc32",
            StrategyName::ConsistentRandom => "consistent_random",
            StrategyName::Murmur2 => "murmur2",
            StrategyName::Murmur2Random => "murmur2_random",
            StrategyName::Fnv1a => "fnv1a",
            StrategyName::Fnv1aRandom => "fnv1a_random",
            StrategyName::Hash => "hash",
            StrategyName::HashRef => "hash-ref",
            StrategyName::Random => "random",
            StrategyName::RoundRobin => "round-robin",
        }
    }

    /// Whether the name belongs to the broker client rather than this crate
    pub fn is_delegated(&self) -> bool {
        Self::DELEGATED.contains(self)
    }

    /// Built-in implementation, `None` for delegated names
    pub fn builtin(&self) -> Option<Arc<dyn PartitionSelector>> {
        let selector: Arc<dyn PartitionSelector> = match self {
            StrategyName::Crc32 => Arc::new(Crc32Strategy),
            StrategyName::ConsistentRandom => Arc::new(ConsistentRandomStrategy::new()),
            StrategyName::Murmur2 => Arc::new(Murmur2Strategy),
            StrategyName::Murmur2Random => Arc::new(Murmur2RandomStrategy),
            StrategyName::Fnv1a => Arc::new(Fnv1aStrategy),
            StrategyName::Fnv1aRandom => Arc::new(Fnv1aRandomStrategy),
            StrategyName::Hash
            | StrategyName::HashRef
            | StrategyName::Random
            | StrategyName::RoundRobin => return None,
        };
        Some(selector)
    }
}

impl FromStr for StrategyName {
    type Err = PartitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::BUILTIN
            .iter()
            .chain(Self::DELEGATED.iter())
            .find(|name| name.as_str() == s)
            .copied()
            .ok_or_else(|| PartitionError::UnknownStrategy(s.to_string()))
    }
}

impl std::fmt::Display for StrategyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registry of partition selectors by name
#[derive(Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<StrategyName, Arc<dyn PartitionSelector>>,
}

impl StrategyRegistry {
    /// Create a registry holding the six built-in strategies
    pub fn new() -> Self {
        let strategies = StrategyName::BUILTIN
            .iter()
            .filter_map(|name| name.builtin().map(|selector| (*name, selector)))
            .collect();
        Self { strategies }
    }

    /// Create a registry with nothing registered
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Register (or replace) the selector behind `name`
    pub fn register(&mut self, name: StrategyName, selector: Arc<dyn PartitionSelector>) {
        self.strategies.insert(name, selector);
    }

    /// Whether `name` resolves to a selector
    pub fn contains(&self, name: StrategyName) -> bool {
        self.strategies.contains_key(&name)
    }

    /// Registered names
    pub fn names(&self) -> Vec<StrategyName> {
        let mut names: Vec<_> = self.strategies.keys().copied().collect();
        names.sort_by_key(|name| name.as_str());
        names
    }

    /// Resolve a selector by typed name
    pub fn get(&self, name: StrategyName) -> Result<Arc<dyn PartitionSelector>, PartitionError> {
        match self.strategies.get(&name) {
            Some(selector) => Ok(selector.clone()),
            None if name.is_delegated() => {
                Err(PartitionError::DelegatedStrategy(name.as_str().to_string()))
            }
            None => Err(PartitionError::UnknownStrategy(name.as_str().to_string())),
        }
    }

    /// Resolve a selector by its string name
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn PartitionSelector>, PartitionError> {
        self.get(name.parse()?)
    }

    /// Validate the count, resolve the strategy and select a partition
    ///
    /// The count is checked before anything is hashed.
    pub fn select(
        &self,
        name: &str,
        key: Option<&[u8]>,
        num_partitions: i64,
        rng: &mut dyn RngCore,
    ) -> Result<PartitionIndex, PartitionError> {
        let partitions = PartitionCount::new(num_partitions)?;
        let selector = self.resolve(name)?;
        Ok(selector.select(key, partitions, rng))
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("strategies", &self.names())
            .finish()
    }
}

/// Select a partition with one of the built-in strategies
///
/// Fails for unknown names, for names delegated to the broker client and
/// for non-positive partition counts. Key-less messages draw from the
/// thread-local generator.
pub fn select_partition(
    strategy_name: &str,
    key: Option<&[u8]>,
    num_partitions: i64,
) -> Result<PartitionIndex, PartitionError> {
    let partitions = PartitionCount::new(num_partitions)?;
    let name: StrategyName = strategy_name.parse()?;
    let selector = name
        .builtin()
        .ok_or_else(|| PartitionError::DelegatedStrategy(strategy_name.to_string()))?;

    Ok(selector.select(key, partitions, &mut rand::thread_rng()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_parse_all_names() {
        for name in StrategyName::BUILTIN.iter().chain(StrategyName::DELEGATED.iter()) {
            assert_eq!(name.as_str().parse::<StrategyName>().unwrap(), *name);
        }
    }

    #[test]
    fn test_parse_unknown() {
        let result = "sha256".parse::<StrategyName>();
        assert_eq!(result, Err(PartitionError::UnknownStrategy("sha256".to_string())));
    }

    #[test]
    fn test_builtin_names_match_selectors() {
        for name in StrategyName::BUILTIN {
            let selector = name.builtin().unwrap();
            assert_eq!(selector.name(), name.as_str());
        }
        for name in StrategyName::DELEGATED {
            assert!(name.builtin().is_none());
            assert!(name.is_delegated());
        }
    }

    #[test]
    fn test_registry_delegated_until_registered() {
        let mut registry = StrategyRegistry::new();
        assert!(matches!(
            registry.get(StrategyName::RoundRobin),
            Err(PartitionError::DelegatedStrategy(_))
        ));

        registry.register(StrategyName::RoundRobin, Arc::new(Crc32Strategy));
        assert!(registry.contains(StrategyName::RoundRobin));
        assert!(registry.get(StrategyName::RoundRobin).is_ok());
    }

    #[test]
    fn test_empty_registry_unknown_builtin() {
        let registry = StrategyRegistry::empty();
        assert!(matches!(
            registry.get(StrategyName::Crc32),
            Err(PartitionError::UnknownStrategy(_))
        ));
    }

    #[test]
    fn test_registry_select_validates_count_first() {
        let registry = StrategyRegistry::new();
        let mut rng = StdRng::seed_from_u64(5);

        assert_eq!(
            registry.select("nope", Some(b"k"), 0, &mut rng),
            Err(PartitionError::InvalidPartitionCount(0))
        );
        assert_eq!(
            registry.select("nope", Some(b"k"), 4, &mut rng),
            Err(PartitionError::UnknownStrategy("nope".to_string()))
        );
        assert_eq!(registry.select("crc32", Some(b"user-42"), 8, &mut rng), Ok(3));
    }

    #[test]
    fn test_select_partition_errors() {
        assert_eq!(
            select_partition("crc32", Some(b"k"), -1),
            Err(PartitionError::InvalidPartitionCount(-1))
        );
        assert_eq!(
            select_partition("md5", Some(b"k"), 3),
            Err(PartitionError::UnknownStrategy("md5".to_string()))
        );
        assert_eq!(
            select_partition("hash-ref", Some(b"k"), 3),
            Err(PartitionError::DelegatedStrategy("hash-ref".to_string()))
        );
    }

    #[test]
    fn test_registry_names_sorted() {
        let names = StrategyRegistry::new().names();
        assert_eq!(names.len(), 6);
        assert_eq!(names[0], StrategyName::ConsistentRandom);
    }
}
