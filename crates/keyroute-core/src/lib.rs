//! Keyroute Core - Partition Selection
//!
//! Assigns message keys to topic partitions with deterministic, pluggable
//! hashing strategies. `murmur2` reproduces the Kafka Java client so
//! partitioning stays compatible with existing deployments.
//!
//! # Architecture
//!
//! ```text
//! (strategy name, key, N)
//!     │
//!     ▼
//! ┌─────────────────────────┐
//! │   StrategyRegistry      │  Resolves name → selector (once per batch)
//! └───────────┬─────────────┘
//!             │
//!             ▼
//! ┌─────────────────────────┐
//! │   PartitionSelector     │  Picks index in [0, N)
//! └─────────────────────────┘
//! ```
//!
//! # Strategies
//!
//! ## Direct-modulo
//! - **crc32**: IEEE CRC-32, `|int32(hash)| mod N`
//! - **murmur2**: Kafka murmur2, `toPositive(hash) mod N`
//! - **fnv1a**: FNV-1a 32, `|int32(hash)| mod N`
//!
//! ## Seeded-random
//! - **consistent_random**: FNV-1a (or CRC-32) seed, one PRNG draw
//! - **murmur2_random**: `toPositive(murmur2)` seed, one PRNG draw
//! - **fnv1a_random**: FNV-1a seed, one PRNG draw
//!
//! # Example
//!
//! ```rust
//! use keyroute_core::select_partition;
//!
//! let partition = select_partition("murmur2", Some(b"21"), 8).unwrap();
//! assert_eq!(partition, 4);
//! ```

mod error;
mod types;
mod registry;

pub mod hash;
pub mod strategy;

// Re-exports: Error types
pub use error::PartitionError;

// Re-exports: Core types
pub use types::{PartitionCount, PartitionIndex, SIGN_MASK};

// Re-exports: Strategy trait and implementations
pub use strategy::{
    // Trait
    PartitionSelector,
    // Direct-modulo strategies
    Crc32Strategy, Murmur2Strategy, Fnv1aStrategy,
    // Seeded-random strategies
    ConsistentRandomStrategy, Murmur2RandomStrategy, Fnv1aRandomStrategy, SeedHash,
    random_partition,
};

// Re-exports: Registry
pub use registry::{select_partition, StrategyName, StrategyRegistry};
