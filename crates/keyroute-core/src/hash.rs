//! Hash primitives used by the partition strategies
//!
//! `murmur2` and `to_positive` reproduce the Kafka Java client's
//! `Utils.murmur2` / `Utils.toPositive` bit for bit, so keys hashed here land
//! on the same partitions as keys produced by the default Kafka partitioner.

use crate::types::SIGN_MASK;

const MURMUR2_SEED: u32 = 0x9747_b28c;
const MURMUR2_M: u32 = 0x5bd1_e995;
const MURMUR2_R: u32 = 24;

const FNV32_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;

/// IEEE CRC-32 of `data`
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// 32-bit FNV-1a of `data`
pub fn fnv1a_32(data: &[u8]) -> u32 {
    data.iter().fold(FNV32_OFFSET_BASIS, |hash, &byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV32_PRIME)
    })
}

/// Kafka-compatible murmur2, returned as the Java `int` it produces
///
/// Java wraps `int` arithmetic in two's complement, which is what the
/// `wrapping_*` ops on `u32` do. `>>>` is a plain shift on `u32`.
pub fn murmur2(data: &[u8]) -> i32 {
    let mut h = MURMUR2_SEED ^ data.len() as u32;

    let mut blocks = data.chunks_exact(4);
    for block in &mut blocks {
        let mut k = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        k = k.wrapping_mul(MURMUR2_M);
        k ^= k >> MURMUR2_R;
        k = k.wrapping_mul(MURMUR2_M);
        h = h.wrapping_mul(MURMUR2_M);
        h ^= k;
    }

    // Tail: highest remaining byte first, multiply after the last one
    let tail = blocks.remainder();
    if tail.len() >= 3 {
        h ^= u32::from(tail[2]) << 16;
    }
    if tail.len() >= 2 {
        h ^= u32::from(tail[1]) << 8;
    }
    if !tail.is_empty() {
        h ^= u32::from(tail[0]);
        h = h.wrapping_mul(MURMUR2_M);
    }

    h ^= h >> 13;
    h = h.wrapping_mul(MURMUR2_M);
    h ^= h >> 15;

    h as i32
}

/// Clear the sign bit, as Kafka's `Utils.toPositive`
///
/// Must stay a mask: `abs(i32::MIN)` overflows.
#[inline]
pub fn to_positive(value: i32) -> i32 {
    value & SIGN_MASK
}
