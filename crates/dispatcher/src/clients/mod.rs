//! PublishClient implementations
//!
//! Contains LogPublisher, MemoryPublisher and (feature `gcp`) GcpPubSubClient.

#[cfg(feature = "gcp")]
mod gcp;
mod log;
mod memory;

#[cfg(feature = "gcp")]
pub use self::gcp::GcpPubSubClient;
pub use self::log::LogPublisher;
pub use self::memory::{MemoryPublisher, PublishedMessage};
