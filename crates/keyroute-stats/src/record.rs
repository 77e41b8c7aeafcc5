//! Routing records and their accumulation

use std::sync::Arc;
use std::time::Duration;

use keyroute_core::PartitionIndex;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// One routed message: where it went and how long the choice took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRecord {
    pub partition: PartitionIndex,
    pub compute_duration: Duration,
}

impl RoutingRecord {
    /// Record a message routed to `partition`
    pub fn new(partition: PartitionIndex, compute_duration: Duration) -> Self {
        Self {
            partition,
            compute_duration,
        }
    }
}

/// Append-only sink shared by concurrent routing workers
///
/// Workers keep a local list and `append` it once their share is done, so
/// the lock is taken once per worker rather than once per message.
#[derive(Debug, Clone, Default)]
pub struct RecordCollector {
    records: Arc<Mutex<Vec<RoutingRecord>>>,
}

impl RecordCollector {
    /// Empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with room for `capacity` records
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::with_capacity(capacity))),
        }
    }

    /// Move a worker's local records into the collector
    pub fn append(&self, mut local: Vec<RoutingRecord>) {
        self.records.lock().append(&mut local);
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Take the collected records, leaving the collector empty
    pub fn finish(&self) -> Vec<RoutingRecord> {
        std::mem::take(&mut *self.records.lock())
    }
}
