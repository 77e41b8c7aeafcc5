//! Broker client default partitioners
//!
//! The core leaves `hash`, `hash-ref`, `random` and `round-robin` to the
//! broker client. These are the in-process equivalents of those defaults,
//! installed into the registry under the delegated names.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use keyroute_core::hash::fnv1a_32;
use keyroute_core::{
    random_partition, PartitionCount, PartitionIndex, PartitionSelector, StrategyName,
    StrategyRegistry, SIGN_MASK,
};
use rand::RngCore;
use tracing::trace;

/// FNV-1a hash partitioner
///
/// Default mode: `int32(hash) % N`, negated when negative.
/// Reference mode: `(int32(hash) & 0x7fffffff) % N`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashPartitioner {
    reference: bool,
}

impl HashPartitioner {
    pub fn new() -> Self {
        Self { reference: false }
    }

    /// Reference-compatible variant (`hash-ref`)
    pub fn reference() -> Self {
        Self { reference: true }
    }
}

impl PartitionSelector for HashPartitioner {
    fn select(
        &self,
        key: Option<&[u8]>,
        partitions: PartitionCount,
        rng: &mut dyn RngCore,
    ) -> PartitionIndex {
        let Some(key) = key else {
            return random_partition(partitions, rng);
        };

        let hash = fnv1a_32(key) as i32;
        let partition = if self.reference {
            (hash & SIGN_MASK) as u32 % partitions.get()
        } else {
            // Count is capped at i32::MAX, so the remainder fits
            (hash % partitions.get() as i32).unsigned_abs()
        };
        trace!(hash = %hash, partition = %partition, reference = self.reference, "hash lookup");
        partition
    }

    fn name(&self) -> &'static str {
        if self.reference {
            "hash-ref"
        } else {
            "hash"
        }
    }
}

/// Uniform random partitioner, ignores keys
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPartitioner;

impl PartitionSelector for RandomPartitioner {
    fn select(
        &self,
        _key: Option<&[u8]>,
        partitions: PartitionCount,
        rng: &mut dyn RngCore,
    ) -> PartitionIndex {
        random_partition(partitions, rng)
    }

    fn name(&self) -> &'static str {
        "random"
    }

    fn requires_consistency(&self) -> bool {
        false
    }
}

/// Round-robin partitioner, ignores keys
#[derive(Debug, Default)]
pub struct RoundRobinPartitioner {
    last_partition: AtomicUsize,
}

impl RoundRobinPartitioner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PartitionSelector for RoundRobinPartitioner {
    fn select(
        &self,
        _key: Option<&[u8]>,
        partitions: PartitionCount,
        _rng: &mut dyn RngCore,
    ) -> PartitionIndex {
        let next = self.last_partition.fetch_add(1, Ordering::Relaxed);
        (next % partitions.get() as usize) as PartitionIndex
    }

    fn name(&self) -> &'static str {
        "round-robin"
    }

    fn requires_consistency(&self) -> bool {
        false
    }
}

/// Register the broker client defaults under their delegated names
pub fn install_broker_defaults(registry: &mut StrategyRegistry) {
    registry.register(StrategyName::Hash, Arc::new(HashPartitioner::new()));
    registry.register(StrategyName::HashRef, Arc::new(HashPartitioner::reference()));
    registry.register(StrategyName::Random, Arc::new(RandomPartitioner));
    registry.register(StrategyName::RoundRobin, Arc::new(RoundRobinPartitioner::new()));
}
