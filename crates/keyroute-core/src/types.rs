//! Common types for partition selection
//!
//! Centralizes type definitions to avoid duplication across modules.

use serde::{Deserialize, Serialize};

use crate::error::PartitionError;

/// Partition index, always in `[0, PartitionCount)`
pub type PartitionIndex = u32;

/// Mask that clears the sign bit of a 32-bit hash
pub const SIGN_MASK: i32 = 0x7fff_ffff;

/// Number of partitions of a topic, validated to be positive
///
/// Broker partition ids are 32-bit signed, so the count is capped at `i32::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct PartitionCount(u32);

impl PartitionCount {
    /// Validate a raw partition count
    pub fn new(count: i64) -> Result<Self, PartitionError> {
        if count <= 0 || count > i64::from(i32::MAX) {
            return Err(PartitionError::InvalidPartitionCount(count));
        }
        Ok(Self(count as u32))
    }

    /// Raw count
    pub fn get(self) -> u32 {
        self.0
    }

    /// Whether `index` is a valid partition for this count
    pub fn contains(self, index: PartitionIndex) -> bool {
        index < self.0
    }
}

impl TryFrom<i64> for PartitionCount {
    type Error = PartitionError;

    fn try_from(count: i64) -> Result<Self, Self::Error> {
        Self::new(count)
    }
}

impl From<PartitionCount> for u32 {
    fn from(count: PartitionCount) -> Self {
        count.0
    }
}

impl std::fmt::Display for PartitionCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
