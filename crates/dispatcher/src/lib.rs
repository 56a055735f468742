//! # Dispatcher
//!
//! Pub/Sub 事件输出模块。
//!
//! 负责：
//! - 渲染 topic 选择器与消息模板
//! - Fan-out 到每个 topic，单个 topic 失败不影响其他 topic
//! - 按 topic 统计请求与错误
//! - 关闭时等待所有在途发送完成

pub mod clients;
pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod template;
pub mod topics;

pub use clients::{LogPublisher, MemoryPublisher, PublishedMessage};
#[cfg(feature = "gcp")]
pub use clients::GcpPubSubClient;
#[cfg(feature = "gcp")]
pub use dispatcher::create_pubsub_output;
pub use contracts::{Event, EventData, EventOutput, PublishClient};
pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherBuilder, OUTPUT_NAME};
pub use error::DispatcherError;
pub use metrics::TopicMetrics;
pub use template::{MessageFormatter, TextTemplate, TopicResolver};
pub use topics::split_topics;
