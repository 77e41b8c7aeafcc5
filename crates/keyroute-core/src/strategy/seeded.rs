//! Seeded-random strategies
//!
//! The key hash only seeds a fresh PRNG; the partition is one uniform draw
//! from it. Balance then follows the PRNG rather than `hash mod N`, which
//! helps when the key space is structured (sequential ids and the like).
//!
//! Each call builds its own `ChaCha8Rng` from the seed bytes, so there is no
//! shared generator to contend on. ChaCha output is value-stable across
//! releases and the reduction to `[0, N)` is done here, so a key keeps its
//! partition across restarts and dependency upgrades.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{random_partition, PartitionSelector};
use crate::hash::{crc32, fnv1a_32, murmur2, to_positive};
use crate::types::{PartitionCount, PartitionIndex};

/// One uniform draw in `[0, N)` from a generator seeded with `seed`
///
/// The generator key is `seed` little-endian followed by zero bytes. The
/// first 64-bit output is scaled with a widening multiply; with `N < 2^31`
/// the bias is below `2^-33`.
#[inline]
fn seeded_draw(seed: u32, partitions: PartitionCount) -> PartitionIndex {
    let mut key = [0u8; 32];
    key[..4].copy_from_slice(&seed.to_le_bytes());
    let mut rng = ChaCha8Rng::from_seed(key);
    ((u128::from(rng.next_u64()) * u128::from(partitions.get())) >> 64) as PartitionIndex
}

/// Hash used to derive the seed of `ConsistentRandomStrategy`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedHash {
    /// 32-bit FNV-1a
    #[default]
    Fnv1a,
    /// IEEE CRC-32
    Crc32,
}

impl SeedHash {
    fn seed(self, key: &[u8]) -> u32 {
        match self {
            SeedHash::Fnv1a => fnv1a_32(key),
            SeedHash::Crc32 => crc32(key),
        }
    }
}

/// Seeded-random strategy with a configurable seed hash (FNV-1a by default)
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsistentRandomStrategy {
    seed_hash: SeedHash,
}

impl ConsistentRandomStrategy {
    /// Create with the default FNV-1a seed
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a custom seed hash
    pub fn with_seed_hash(seed_hash: SeedHash) -> Self {
        Self { seed_hash }
    }

    /// Hash that derives the seed from the key
    pub fn seed_hash(&self) -> SeedHash {
        self.seed_hash
    }
}

impl PartitionSelector for ConsistentRandomStrategy {
    fn select(
        &self,
        key: Option<&[u8]>,
        partitions: PartitionCount,
        rng: &mut dyn RngCore,
    ) -> PartitionIndex {
        let Some(key) = key else {
            return random_partition(partitions, rng);
        };

        let seed = self.seed_hash.seed(key);
        let partition = seeded_draw(seed, partitions);
        trace!(seed = %seed, seed_hash = ?self.seed_hash, partition = %partition, "consistent random draw");
        partition
    }

    fn name(&self) -> &'static str {
        "consistent_random"
    }
}

/// Seeded-random strategy seeded with `toPositive(murmur2(key))`
#[derive(Debug, Clone, Copy, Default)]
pub struct Murmur2RandomStrategy;

impl PartitionSelector for Murmur2RandomStrategy {
    fn select(
        &self,
        key: Option<&[u8]>,
        partitions: PartitionCount,
        rng: &mut dyn RngCore,
    ) -> PartitionIndex {
        let Some(key) = key else {
            return random_partition(partitions, rng);
        };

        let seed = to_positive(murmur2(key)) as u32;
        let partition = seeded_draw(seed, partitions);
        trace!(seed = %seed, partition = %partition, "murmur2 random draw");
        partition
    }

    fn name(&self) -> &'static str {
        "murmur2_random"
    }
}

/// Seeded-random strategy seeded with FNV-1a
#[derive(Debug, Clone, Copy, Default)]
pub struct Fnv1aRandomStrategy;

impl PartitionSelector for Fnv1aRandomStrategy {
    fn select(
        &self,
        key: Option<&[u8]>,
        partitions: PartitionCount,
        rng: &mut dyn RngCore,
    ) -> PartitionIndex {
        let Some(key) = key else {
            return random_partition(partitions, rng);
        };

        let seed = fnv1a_32(key);
        let partition = seeded_draw(seed, partitions);
        trace!(seed = %seed, partition = %partition, "fnv1a random draw");
        partition
    }

    fn name(&self) -> &'static str {
        "fnv1a_random"
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;

    use super::*;

    fn partitions(n: i64) -> PartitionCount {
        PartitionCount::new(n).unwrap()
    }

    #[test]
    fn test_seeded_draw_reproducible() {
        for seed in [0, 1, 42, u32::MAX] {
            assert_eq!(seeded_draw(seed, partitions(16)), seeded_draw(seed, partitions(16)));
        }
    }

    #[test]
    fn test_seeded_draw_known_values() {
        assert_eq!(seeded_draw(0, partitions(16)), 13);
        assert_eq!(seeded_draw(u32::MAX, partitions(16)), 0);
        assert_eq!(seeded_draw(fnv1a_32(b""), partitions(10)), 1);
    }

    #[test]
    fn test_seeded_strategies_known_partitions() {
        // Pinned outputs: any change here remaps existing keys
        let mut rng = StdRng::seed_from_u64(3);
        let by_fnv = ConsistentRandomStrategy::new();
        let by_crc = ConsistentRandomStrategy::with_seed_hash(SeedHash::Crc32);
        let cases: [(&dyn PartitionSelector, [PartitionIndex; 8]); 4] = [
            (&Fnv1aRandomStrategy, [1, 0, 4, 4, 8, 0, 9, 6]),
            (&by_fnv, [1, 0, 4, 4, 8, 0, 9, 6]),
            (&Murmur2RandomStrategy, [5, 8, 0, 6, 1, 5, 8, 1]),
            (&by_crc, [0, 6, 5, 3, 5, 3, 7, 1]),
        ];

        for (strategy, expected) in cases {
            for (i, &partition) in expected.iter().enumerate() {
                let key = format!("user-{}", i);
                assert_eq!(
                    strategy.select(Some(key.as_bytes()), partitions(10), &mut rng),
                    partition,
                    "{} remapped {}",
                    strategy.name(),
                    key
                );
            }
        }

        assert_eq!(Fnv1aRandomStrategy.select(Some(b"order-1001"), partitions(10), &mut rng), 3);
        assert_eq!(Murmur2RandomStrategy.select(Some(b"21"), partitions(8), &mut rng), 2);
        assert_eq!(by_crc.select(Some(b"user-42"), partitions(8), &mut rng), 5);
    }

    #[test]
    fn test_seeded_strategies_deterministic() {
        let mut rng = StdRng::seed_from_u64(3);
        let by_fnv = ConsistentRandomStrategy::new();
        let by_crc = ConsistentRandomStrategy::with_seed_hash(SeedHash::Crc32);
        let strategies: [&dyn PartitionSelector; 4] = [
            &by_fnv,
            &by_crc,
            &Murmur2RandomStrategy,
            &Fnv1aRandomStrategy,
        ];

        for strategy in strategies {
            let first = strategy.select(Some(b"order-1001"), partitions(10), &mut rng);
            for _ in 0..100 {
                assert_eq!(strategy.select(Some(b"order-1001"), partitions(10), &mut rng), first);
            }
        }
    }

    #[test]
    fn test_consistent_random_default_matches_fnv1a_random() {
        let mut rng = StdRng::seed_from_u64(3);
        let consistent = ConsistentRandomStrategy::new();

        for i in 0..200 {
            let key = format!("user-{}", i);
            assert_eq!(
                consistent.select(Some(key.as_bytes()), partitions(10), &mut rng),
                Fnv1aRandomStrategy.select(Some(key.as_bytes()), partitions(10), &mut rng),
            );
        }
    }

    #[test]
    fn test_consistent_random_crc32_seed() {
        let mut rng = StdRng::seed_from_u64(3);
        let strategy = ConsistentRandomStrategy::with_seed_hash(SeedHash::Crc32);
        assert_eq!(strategy.seed_hash(), SeedHash::Crc32);

        let expected = seeded_draw(crc32(b"user-42"), partitions(8));
        assert_eq!(strategy.select(Some(b"user-42"), partitions(8), &mut rng), expected);
    }

    #[test]
    fn test_sequential_keys_spread() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut counts = [0u32; 4];

        for i in 0..4000u32 {
            let key = i.to_be_bytes();
            let p = Murmur2RandomStrategy.select(Some(&key[..]), partitions(4), &mut rng);
            counts[p as usize] += 1;
        }

        for count in counts {
            assert!(count > 700 && count < 1300, "count={} is outside expected range", count);
        }
    }
}
