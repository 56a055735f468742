//! PublishClient trait - message-bus client interface
//!
//! The dispatcher only needs "publish these bytes to this topic and tell me
//! the server-assigned id". Topic administration is out of scope.

use bytes::Bytes;

use crate::ContractError;

/// Message-bus publish interface
///
/// Implementations must be safe to share read-only between tasks.
#[trait_variant::make(PublishClient: Send)]
pub trait LocalPublishClient {
    /// Client name (used for logging)
    fn name(&self) -> &str;

    /// Publish raw bytes to a topic and wait for the acknowledgment
    ///
    /// # Errors
    /// Returns the transport error for this topic only.
    async fn publish(&self, topic: &str, payload: Bytes) -> Result<String, ContractError>;

    /// Flush and release per-topic resources
    async fn shutdown(&self);
}
