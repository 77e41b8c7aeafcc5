//! Message transmission
//!
//! `MessageSink` is the narrow seam to the broker client: hand it a topic, the
//! chosen partition and a serialized payload, get back the partition the
//! message landed on. `InMemoryBroker` implements it in-process.

use std::collections::HashMap;

use async_trait::async_trait;
use keyroute_core::{PartitionCount, PartitionIndex};
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// Sink error types
#[derive(Debug, Error)]
pub enum SinkError {
    /// Topic does not exist on the broker
    #[error("Unknown topic: {0}")]
    UnknownTopic(String),

    /// Partition index outside the topic
    #[error("Partition {partition} out of range for {partitions} partitions")]
    PartitionOutOfRange { partition: PartitionIndex, partitions: u32 },

    /// Payload could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Transmit collaborator
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Deliver `payload` to `partition` of `topic`
    async fn send(
        &self,
        topic: &str,
        partition: PartitionIndex,
        payload: Vec<u8>,
    ) -> Result<PartitionIndex, SinkError>;
}

/// Per-partition delivery counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PartitionLog {
    pub messages: u64,
    pub bytes: u64,
}

/// In-process broker keeping delivery counters per topic partition
pub struct InMemoryBroker {
    address: String,
    partitions: PartitionCount,
    topics: RwLock<HashMap<String, Vec<PartitionLog>>>,
}

impl InMemoryBroker {
    /// Create a broker whose topics all have `partitions` partitions
    pub fn new(address: impl Into<String>, partitions: PartitionCount) -> Self {
        let address = address.into();
        info!(address = %address, partitions = %partitions, "In-memory broker created");

        Self {
            address,
            partitions,
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// Builder-style topic creation
    pub fn with_topic(self, topic: impl Into<String>) -> Self {
        self.create_topic(topic);
        self
    }

    /// Create a topic, keeping it as is if it already exists
    pub fn create_topic(&self, topic: impl Into<String>) {
        let topic = topic.into();
        let mut topics = self.topics.write();
        topics
            .entry(topic.clone())
            .or_insert_with(|| vec![PartitionLog::default(); self.partitions.get() as usize]);
        debug!(topic = %topic, "Topic ready");
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn partitions(&self) -> PartitionCount {
        self.partitions
    }

    /// Delivery counters of `topic`, in partition order
    pub fn partition_logs(&self, topic: &str) -> Option<Vec<PartitionLog>> {
        self.topics.read().get(topic).cloned()
    }

    /// Messages delivered to `topic`
    pub fn total_messages(&self, topic: &str) -> u64 {
        self.topics
            .read()
            .get(topic)
            .map(|logs| logs.iter().map(|log| log.messages).sum())
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for InMemoryBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBroker")
            .field("address", &self.address)
            .field("partitions", &self.partitions)
            .finish()
    }
}

#[async_trait]
impl MessageSink for InMemoryBroker {
    async fn send(
        &self,
        topic: &str,
        partition: PartitionIndex,
        payload: Vec<u8>,
    ) -> Result<PartitionIndex, SinkError> {
        if !self.partitions.contains(partition) {
            return Err(SinkError::PartitionOutOfRange {
                partition,
                partitions: self.partitions.get(),
            });
        }

        let mut topics = self.topics.write();
        let logs = topics
            .get_mut(topic)
            .ok_or_else(|| SinkError::UnknownTopic(topic.to_string()))?;

        let log = &mut logs[partition as usize];
        log.messages += 1;
        log.bytes += payload.len() as u64;

        Ok(partition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broker() -> InMemoryBroker {
        InMemoryBroker::new("memory://test", PartitionCount::new(3).unwrap()).with_topic("orders")
    }

    #[tokio::test]
    async fn test_send_counts_delivery() {
        let broker = broker();

        assert_eq!(broker.send("orders", 2, b"abc".to_vec()).await.unwrap(), 2);
        assert_eq!(broker.send("orders", 2, b"de".to_vec()).await.unwrap(), 2);

        let logs = broker.partition_logs("orders").unwrap();
        assert_eq!(logs[2], PartitionLog { messages: 2, bytes: 5 });
        assert_eq!(broker.total_messages("orders"), 2);
    }

    #[tokio::test]
    async fn test_send_rejects_out_of_range() {
        let broker = broker();
        let result = broker.send("orders", 3, vec![]).await;
        assert!(matches!(
            result,
            Err(SinkError::PartitionOutOfRange { partition: 3, partitions: 3 })
        ));
    }

    #[tokio::test]
    async fn test_send_rejects_unknown_topic() {
        let broker = broker();
        let result = broker.send("payments", 0, vec![]).await;
        assert!(matches!(result, Err(SinkError::UnknownTopic(t)) if t == "payments"));
        assert_eq!(broker.total_messages("payments"), 0);
    }

    #[test]
    fn test_create_topic_idempotent() {
        let broker = broker();
        broker.create_topic("orders");
        assert_eq!(broker.partition_logs("orders").unwrap().len(), 3);
        assert_eq!(broker.address(), "memory://test");
    }
}
