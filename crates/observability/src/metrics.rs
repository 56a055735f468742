//! Pub/Sub 输出指标模块
//!
//! 按 topic 维度记录请求数、错误数与发布延迟。

use std::collections::BTreeMap;

use metrics::{counter, histogram};

/// 发布请求计数器名称
pub const REQUESTS_COUNTER: &str = "pubsub_output_requests_total";

/// 发布错误计数器名称
pub const ERRORS_COUNTER: &str = "pubsub_output_errors_total";

/// 发布延迟直方图名称
pub const PUBLISH_LATENCY_HISTOGRAM: &str = "pubsub_output_publish_latency_ms";

/// 记录一次发布尝试
pub fn record_publish_request(topic: &str) {
    counter!(REQUESTS_COUNTER, "topic" => topic.to_string()).increment(1);
}

/// 记录一次发布失败
pub fn record_publish_error(topic: &str) {
    counter!(ERRORS_COUNTER, "topic" => topic.to_string()).increment(1);
}

/// 记录发布确认耗时
pub fn record_publish_latency_ms(topic: &str, latency_ms: f64) {
    histogram!(PUBLISH_LATENCY_HISTOGRAM, "topic" => topic.to_string()).record(latency_ms);
}

/// 单个 topic 的计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopicCounts {
    /// 发布尝试次数
    pub requests: u64,
    /// 发布失败次数
    pub errors: u64,
}

impl TopicCounts {
    /// 成功次数
    pub fn successes(&self) -> u64 {
        self.requests.saturating_sub(self.errors)
    }
}

/// 发布摘要
///
/// 由按 topic 的计数快照聚合而来，用于运行结束时输出。
#[derive(Debug, Clone, Default)]
pub struct PublishSummary {
    pub total_requests: u64,
    pub total_errors: u64,
    pub topics: BTreeMap<String, TopicCounts>,
}

impl PublishSummary {
    /// 从 (topic, 计数) 快照构建摘要
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (String, TopicCounts)>,
    {
        let mut summary = Self::default();
        for (topic, topic_counts) in counts {
            summary.total_requests += topic_counts.requests;
            summary.total_errors += topic_counts.errors;
            let entry = summary.topics.entry(topic).or_default();
            entry.requests += topic_counts.requests;
            entry.errors += topic_counts.errors;
        }
        summary
    }

    /// 错误率 (百分比)
    pub fn error_rate(&self) -> f64 {
        if self.total_requests > 0 {
            self.total_errors as f64 / self.total_requests as f64 * 100.0
        } else {
            0.0
        }
    }
}

impl std::fmt::Display for PublishSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Pub/Sub Publish Summary ===")?;
        writeln!(f, "Requests: {}", self.total_requests)?;
        writeln!(
            f,
            "Errors: {} ({:.2}%)",
            self.total_errors,
            self.error_rate()
        )?;

        if !self.topics.is_empty() {
            writeln!(f, "Per topic:")?;
            for (topic, counts) in &self.topics {
                writeln!(
                    f,
                    "  {}: requests={}, errors={}",
                    topic, counts.requests, counts.errors
                )?;
            }
        }

        Ok(())
    }
}
