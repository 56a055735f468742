//! MemoryPublisher - in-process client recording every publish
//!
//! Used by tests; topics can be configured to fail.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use contracts::{ContractError, PublishClient};

/// A message accepted by [`MemoryPublisher`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: Bytes,
    pub message_id: String,
}

/// Recording client
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    published: Mutex<Vec<PublishedMessage>>,
    attempts: Mutex<Vec<String>>,
    failing_topics: HashSet<String>,
    delay: Option<Duration>,
    sequence: AtomicU64,
    shut_down: AtomicBool,
}

impl MemoryPublisher {
    /// Create a client that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every publish to `topic`
    pub fn fail_topic(mut self, topic: impl Into<String>) -> Self {
        self.failing_topics.insert(topic.into());
        self
    }

    /// Wait before acknowledging each publish
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Accepted messages, in acknowledgment order
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Topics of accepted messages, in acknowledgment order
    pub fn published_topics(&self) -> Vec<String> {
        self.published().into_iter().map(|m| m.topic).collect()
    }

    /// Every topic a publish was attempted on, including failures
    pub fn attempted_topics(&self) -> Vec<String> {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether `shutdown` was called
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }
}

impl PublishClient for MemoryPublisher {
    fn name(&self) -> &str {
        "memory"
    }

    async fn publish(&self, topic: &str, payload: Bytes) -> Result<String, ContractError> {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(topic.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing_topics.contains(topic) {
            return Err(ContractError::publish(topic, "rejected by memory publisher"));
        }

        let message_id = (self.sequence.fetch_add(1, Ordering::Relaxed) + 1).to_string();
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(PublishedMessage {
                topic: topic.to_string(),
                payload,
                message_id: message_id.clone(),
            });
        Ok(message_id)
    }

    async fn shutdown(&self) {
        self.shut_down.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_messages() {
        let client = MemoryPublisher::new();
        let id = client
            .publish("alerts", Bytes::from_static(b"hello"))
            .await
            .unwrap();

        assert_eq!(id, "1");
        assert_eq!(
            client.published(),
            vec![PublishedMessage {
                topic: "alerts".to_string(),
                payload: Bytes::from_static(b"hello"),
                message_id: "1".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_failing_topic() {
        let client = MemoryPublisher::new().fail_topic("broken");
        let result = client.publish("broken", Bytes::from_static(b"x")).await;

        assert!(matches!(result, Err(ContractError::Publish { .. })));
        assert!(client.published().is_empty());
        assert_eq!(client.attempted_topics(), vec!["broken".to_string()]);
    }
}
