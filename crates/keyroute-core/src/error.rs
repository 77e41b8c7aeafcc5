//! Error types for partition selection

use thiserror::Error;

/// Partition selection error types
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PartitionError {
    /// Partition count is zero, negative or does not fit a broker partition id
    #[error("Invalid partition count: {0}")]
    InvalidPartitionCount(i64),

    /// Strategy name is not recognized
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    /// Strategy is owned by the broker client and nothing was registered for it
    #[error("Strategy '{0}' is delegated to the broker client")]
    DelegatedStrategy(String),
}
