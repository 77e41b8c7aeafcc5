//! Partition Strategies
//!
//! Two families of keyed strategies:
//!
//! - Direct-modulo (`direct`): hash the key, reduce the hash mod N
//!   - `Crc32Strategy`, `Murmur2Strategy`, `Fnv1aStrategy`
//! - Seeded-random (`seeded`): hash the key, seed a PRNG with the hash and
//!   draw one uniform sample in `[0, N)`
//!   - `ConsistentRandomStrategy`, `Murmur2RandomStrategy`, `Fnv1aRandomStrategy`
//!
//! # Selection Flow
//!
//! ```text
//! (key, N)
//!     │
//!     ▼
//! Key present? ──No──► uniform draw from injected rng
//!     │
//!    Yes
//!     │
//!     ▼
//! ┌─────────────────────────┐
//! │   hash(key)             │  crc32 / murmur2 / fnv1a
//! └───────────┬─────────────┘
//!             │
//!      ┌──────┴───────┐
//!      ▼              ▼
//!  hash mod N    seeded PRNG draw
//! ```

mod direct;
mod seeded;

pub use direct::{Crc32Strategy, Fnv1aStrategy, Murmur2Strategy};
pub use seeded::{ConsistentRandomStrategy, Fnv1aRandomStrategy, Murmur2RandomStrategy, SeedHash};

use rand::{Rng, RngCore};

use crate::types::{PartitionCount, PartitionIndex};

/// Trait for partition selection strategies
pub trait PartitionSelector: Send + Sync {
    /// Select a partition for `key` out of `partitions`
    ///
    /// `rng` is only drawn from for key-less messages and by strategies
    /// that do not promise key affinity.
    fn select(
        &self,
        key: Option<&[u8]>,
        partitions: PartitionCount,
        rng: &mut dyn RngCore,
    ) -> PartitionIndex;

    /// Strategy name for logging
    fn name(&self) -> &'static str;

    /// Whether the same key always maps to the same partition
    fn requires_consistency(&self) -> bool {
        true
    }
}

/// Uniform draw used for key-less messages
pub fn random_partition(partitions: PartitionCount, rng: &mut dyn RngCore) -> PartitionIndex {
    rng.gen_range(0..partitions.get())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_partition_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let partitions = PartitionCount::new(5).unwrap();

        for _ in 0..1000 {
            assert!(random_partition(partitions, &mut rng) < 5);
        }
    }

    #[test]
    fn test_random_partition_single() {
        let mut rng = StdRng::seed_from_u64(7);
        let partitions = PartitionCount::new(1).unwrap();
        assert_eq!(random_partition(partitions, &mut rng), 0);
    }
}
