//! Direct-modulo strategies
//!
//! The key hash is reduced straight to a partition index. `murmur2` matches the
//! Kafka Java default partitioner; `crc32` and `fnv1a` take the absolute value
//! of the hash read as a signed 32-bit integer.

use rand::RngCore;
use tracing::trace;

use super::{random_partition, PartitionSelector};
use crate::hash::{crc32, fnv1a_32, murmur2, to_positive};
use crate::types::{PartitionCount, PartitionIndex};

/// `|int32(hash)| mod N`
///
/// `unsigned_abs` keeps `i32::MIN` at 2^31 instead of overflowing into a
/// negative remainder.
#[inline]
fn abs_mod(hash: u32, partitions: PartitionCount) -> PartitionIndex {
    (hash as i32).unsigned_abs() % partitions.get()
}

/// IEEE CRC-32, `|int32(hash)| mod N`
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32Strategy;

impl PartitionSelector for Crc32Strategy {
    fn select(
        &self,
        key: Option<&[u8]>,
        partitions: PartitionCount,
        rng: &mut dyn RngCore,
    ) -> PartitionIndex {
        let Some(key) = key else {
            return random_partition(partitions, rng);
        };

        let hash = crc32(key);
        let partition = abs_mod(hash, partitions);
        trace!(hash = %hash, partition = %partition, "crc32 lookup");
        partition
    }

    fn name(&self) -> &'static str {
        "crc32"
    }
}

/// Kafka murmur2, `toPositive(hash) mod N`
#[derive(Debug, Clone, Copy, Default)]
pub struct Murmur2Strategy;

impl PartitionSelector for Murmur2Strategy {
    fn select(
        &self,
        key: Option<&[u8]>,
        partitions: PartitionCount,
        rng: &mut dyn RngCore,
    ) -> PartitionIndex {
        let Some(key) = key else {
            return random_partition(partitions, rng);
        };

        let hash = murmur2(key);
        let partition = to_positive(hash) as u32 % partitions.get();
        trace!(hash = %hash, partition = %partition, "murmur2 lookup");
        partition
    }

    fn name(&self) -> &'static str {
        "murmur2"
    }
}

/// 32-bit FNV-1a, `|int32(hash)| mod N`
#[derive(Debug, Clone, Copy, Default)]
pub struct Fnv1aStrategy;

impl PartitionSelector for Fnv1aStrategy {
    fn select(
        &self,
        key: Option<&[u8]>,
        partitions: PartitionCount,
        rng: &mut dyn RngCore,
    ) -> PartitionIndex {
        let Some(key) = key else {
            return random_partition(partitions, rng);
        };

        let hash = fnv1a_32(key);
        let partition = abs_mod(hash, partitions);
        trace!(hash = %hash, partition = %partition, "fnv1a lookup");
        partition
    }

    fn name(&self) -> &'static str {
        "fnv1a"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn partitions(n: i64) -> PartitionCount {
        PartitionCount::new(n).unwrap()
    }

    #[test]
    fn test_abs_mod_handles_int32_min() {
        // 0x8000_0000 reads as i32::MIN; |i32::MIN| = 2^31
        assert_eq!(abs_mod(0x8000_0000, partitions(3)), (1u32 << 31) % 3);
        assert_eq!(abs_mod(0x8000_0000, partitions(10)), 8);
    }

    #[test]
    fn test_abs_mod_negative_hash() {
        // crc32("21") = 4252452532 = -42514764 as i32
        assert_eq!(abs_mod(4_252_452_532, partitions(8)), 42_514_764 % 8);
    }

    #[test]
    fn test_crc32_known_partition() {
        let mut rng = StdRng::seed_from_u64(1);
        // crc32("user-42") = 2097592435
        assert_eq!(Crc32Strategy.select(Some(b"user-42"), partitions(8), &mut rng), 3);
    }

    #[test]
    fn test_murmur2_matches_kafka_default_partitioner() {
        let mut rng = StdRng::seed_from_u64(1);
        // toPositive(murmur2("21")) = 1173551340
        assert_eq!(
            Murmur2Strategy.select(Some(b"21"), partitions(8), &mut rng),
            1_173_551_340 % 8
        );
        // toPositive(murmur2("foobar")) = 1357151166
        assert_eq!(
            Murmur2Strategy.select(Some(b"foobar"), partitions(100), &mut rng),
            1_357_151_166 % 100
        );
    }

    #[test]
    fn test_fnv1a_known_partition() {
        let mut rng = StdRng::seed_from_u64(1);
        // fnv1a("foobar") = 3214735720 = -1080231576 as i32
        assert_eq!(
            Fnv1aStrategy.select(Some(b"foobar"), partitions(7), &mut rng),
            1_080_231_576 % 7
        );
    }

    #[test]
    fn test_deterministic() {
        let mut rng = StdRng::seed_from_u64(1);
        let strategies: [&dyn PartitionSelector; 3] = [&Crc32Strategy, &Murmur2Strategy, &Fnv1aStrategy];

        for strategy in strategies {
            let p1 = strategy.select(Some(b"account:alice"), partitions(12), &mut rng);
            let p2 = strategy.select(Some(b"account:alice"), partitions(12), &mut rng);
            assert_eq!(p1, p2, "{} should be deterministic", strategy.name());
        }
    }

    #[test]
    fn test_keyless_in_range() {
        let mut rng = StdRng::seed_from_u64(99);

        for _ in 0..500 {
            assert!(Crc32Strategy.select(None, partitions(6), &mut rng) < 6);
            assert!(Murmur2Strategy.select(None, partitions(6), &mut rng) < 6);
            assert!(Fnv1aStrategy.select(None, partitions(6), &mut rng) < 6);
        }
    }

    #[test]
    fn test_distribution() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut counts = [0u32; 6];

        for i in 0..6000 {
            let key = format!("resource:{}", i);
            let p = Murmur2Strategy.select(Some(key.as_bytes()), partitions(6), &mut rng);
            counts[p as usize] += 1;
        }

        for count in counts {
            assert!(count > 600 && count < 1400, "count={} is outside expected range", count);
        }
    }
}
