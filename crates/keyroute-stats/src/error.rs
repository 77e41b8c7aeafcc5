//! Error types for distribution analysis

use thiserror::Error;

/// Distribution analysis error types
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DistributionError {
    /// Max/min ratio requested while the least loaded partition is empty
    #[error("Ratio undefined: min count is {min} (max {max})")]
    DegenerateDistribution { min: u64, max: u64 },
}
