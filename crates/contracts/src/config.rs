//! OutputConfig - Config Loader output
//!
//! Describes the Pub/Sub output: credentials, project, templates, timeouts.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Pub/Sub output settings
    #[serde(default)]
    pub pubsub: PubSubOutputConfig,

    /// Shared template settings
    #[serde(default)]
    pub template: TemplateOptions,
}

/// Pub/Sub output settings
///
/// `message` and `topic_selector` hold either template text or a path to a
/// file containing it. `credentials` holds either a path to a credentials
/// file or inline credentials JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PubSubOutputConfig {
    /// Credentials file path or inline JSON
    #[serde(default)]
    pub credentials: String,

    /// Project the topics live in
    #[serde(default)]
    pub project_id: String,

    /// Message body template
    #[serde(default)]
    pub message: String,

    /// Template producing newline-separated topic names
    #[serde(default)]
    pub topic_selector: String,

    /// Per-publish timeout in milliseconds (0 = no timeout)
    #[serde(default)]
    pub publish_timeout_ms: u64,
}

impl PubSubOutputConfig {
    /// The output is optional infrastructure: without credentials and a
    /// project it is disabled rather than misconfigured.
    pub fn is_enabled(&self) -> bool {
        !self.credentials.trim().is_empty() && !self.project_id.trim().is_empty()
    }

    /// Publish timeout, `None` when unbounded
    pub fn publish_timeout(&self) -> Option<Duration> {
        match self.publish_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

/// Template engine settings shared by all templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateOptions {
    /// Default `chrono` format for the `time_format` filter
    #[serde(default = "default_time_format")]
    pub time_format: String,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            time_format: default_time_format(),
        }
    }
}

fn default_time_format() -> String {
    "%Y-%m-%dT%H:%M:%S%.9f%:z".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_requires_credentials_and_project() {
        let mut config = PubSubOutputConfig::default();
        assert!(!config.is_enabled());

        config.credentials = "/etc/keys/sa.json".to_string();
        assert!(!config.is_enabled());

        config.project_id = "   ".to_string();
        assert!(!config.is_enabled());

        config.project_id = "events-prod".to_string();
        assert!(config.is_enabled());
    }

    #[test]
    fn test_publish_timeout() {
        let mut config = PubSubOutputConfig::default();
        assert_eq!(config.publish_timeout(), None);

        config.publish_timeout_ms = 250;
        assert_eq!(config.publish_timeout(), Some(Duration::from_millis(250)));
    }
}
