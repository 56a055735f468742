//! Per-topic publish metrics
//!
//! Every increment is mirrored to the `metrics` facade (Prometheus) and kept
//! in-process for snapshots.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use observability::TopicCounts;

/// Counters for a single topic
#[derive(Debug, Default)]
struct TopicCounters {
    requests: AtomicU64,
    errors: AtomicU64,
}

/// Label-partitioned `requests` / `errors` counters
#[derive(Debug, Default)]
pub struct TopicMetrics {
    topics: RwLock<HashMap<String, Arc<TopicCounters>>>,
}

impl TopicMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a publish attempt
    pub fn record_request(&self, topic: &str) {
        self.counters(topic).requests.fetch_add(1, Ordering::Relaxed);
        observability::record_publish_request(topic);
    }

    /// Count a failed publish
    pub fn record_error(&self, topic: &str) {
        self.counters(topic).errors.fetch_add(1, Ordering::Relaxed);
        observability::record_publish_error(topic);
    }

    /// Counts for one topic (zero if never seen)
    pub fn topic(&self, topic: &str) -> TopicCounts {
        let topics = self.topics.read().unwrap_or_else(PoisonError::into_inner);
        topics
            .get(topic)
            .map(|counters| Self::load(counters))
            .unwrap_or_default()
    }

    /// Snapshot of every topic seen so far
    pub fn snapshot(&self) -> BTreeMap<String, TopicCounts> {
        let topics = self.topics.read().unwrap_or_else(PoisonError::into_inner);
        topics
            .iter()
            .map(|(topic, counters)| (topic.clone(), Self::load(counters)))
            .collect()
    }

    /// Total publish attempts across topics
    pub fn total_requests(&self) -> u64 {
        self.snapshot().values().map(|c| c.requests).sum()
    }

    /// Total failed publishes across topics
    pub fn total_errors(&self) -> u64 {
        self.snapshot().values().map(|c| c.errors).sum()
    }

    fn counters(&self, topic: &str) -> Arc<TopicCounters> {
        {
            let topics = self.topics.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(counters) = topics.get(topic) {
                return Arc::clone(counters);
            }
        }

        let mut topics = self.topics.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(topics.entry(topic.to_string()).or_default())
    }

    fn load(counters: &TopicCounters) -> TopicCounts {
        TopicCounts {
            requests: counters.requests.load(Ordering::Relaxed),
            errors: counters.errors.load(Ordering::Relaxed),
        }
    }
}
