//! LogPublisher - logs messages via tracing instead of publishing them

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use contracts::{ContractError, PublishClient};
use tracing::{info, instrument};

/// Client that logs every publish, for dry runs and local development
pub struct LogPublisher {
    name: String,
    sequence: AtomicU64,
}

impl LogPublisher {
    /// Create a new LogPublisher with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sequence: AtomicU64::new(0),
        }
    }
}

impl PublishClient for LogPublisher {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_publisher_publish",
        skip(self, payload),
        fields(client = %self.name, bytes = payload.len())
    )]
    async fn publish(&self, topic: &str, payload: Bytes) -> Result<String, ContractError> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            client = %self.name,
            topic = %topic,
            payload = %String::from_utf8_lossy(&payload),
            "Message published"
        );
        Ok(format!("{}-{}", self.name, id))
    }

    #[instrument(name = "log_publisher_shutdown", skip(self))]
    async fn shutdown(&self) {
        info!(client = %self.name, "LogPublisher closed");
    }
}
