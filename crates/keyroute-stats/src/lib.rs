//! Keyroute Stats - Distribution Analysis
//!
//! Measures how evenly a partition strategy spreads keys, and how long each
//! selection took, from the `RoutingRecord`s of a finished batch.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use keyroute_stats::{analyze_distribution, RoutingRecord};
//!
//! let records: Vec<_> = (0..10u32)
//!     .flat_map(|p| std::iter::repeat(RoutingRecord::new(p, Duration::from_nanos(50))).take(1000))
//!     .collect();
//!
//! let snapshot = analyze_distribution(&records);
//! assert_eq!(snapshot.mean, 1000.0);
//! assert_eq!(snapshot.std_dev, 0.0);
//! assert_eq!(snapshot.ratio(), Ok(1.0));
//! ```

mod analyzer;
mod error;
mod record;

pub mod numeric;

pub use analyzer::{
    analyze_distribution, DistributionAnalyzer, DistributionSnapshot, PartitionReport,
    COLLISION_THRESHOLD,
};
pub use error::DistributionError;
pub use record::{RecordCollector, RoutingRecord};
