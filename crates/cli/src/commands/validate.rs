//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::OutputConfig;
use dispatcher::{MessageFormatter, TopicResolver};
use serde::Serialize;
use tracing::info;

use super::load_config;
use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    enabled: bool,
    project_id: String,
    has_topic_selector: bool,
    publish_timeout_ms: u64,
    time_format: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    let invalid = |error: String| ValidationResult {
        valid: false,
        config_path: config_path.clone(),
        error: Some(error),
        warnings: None,
        summary: None,
    };

    let config = match load_config(&args.config, &args.overrides) {
        Ok(config) => config,
        Err(e) => return invalid(e.to_string()),
    };

    // 消息模板编译失败是致命错误
    if config.pubsub.is_enabled() || !config.pubsub.message.trim().is_empty() {
        if let Err(e) = MessageFormatter::from_template(&config.pubsub.message, &config.template) {
            return invalid(e.to_string());
        }
    }

    let warnings = collect_warnings(&config);

    ValidationResult {
        valid: true,
        config_path: config_path.clone(),
        error: None,
        warnings: if warnings.is_empty() {
            None
        } else {
            Some(warnings)
        },
        summary: Some(ConfigSummary {
            version: format!("{:?}", config.version),
            enabled: config.pubsub.is_enabled(),
            project_id: config.pubsub.project_id.clone(),
            has_topic_selector: !config.pubsub.topic_selector.trim().is_empty(),
            publish_timeout_ms: config.pubsub.publish_timeout_ms,
            time_format: config.template.time_format.clone(),
        }),
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &OutputConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let pubsub = &config.pubsub;

    if !pubsub.is_enabled() {
        warnings.push(
            "pubsub.credentials or pubsub.project_id is empty - output is disabled".to_string(),
        );
    }

    if pubsub.message.trim().is_empty() {
        warnings.push("pubsub.message is empty - every event will be suppressed".to_string());
    }

    if pubsub.topic_selector.trim().is_empty() {
        warnings.push("pubsub.topic_selector is empty - no event will be published".to_string());
    } else if let Err(e) = TopicResolver::from_template(&pubsub.topic_selector, &config.template) {
        warnings.push(format!(
            "pubsub.topic_selector does not compile - no event will be published: {e}"
        ));
    }

    if pubsub.publish_timeout().is_none() {
        warnings.push(
            "pubsub.publish_timeout_ms is 0 - publishes wait for acknowledgment indefinitely"
                .to_string(),
        );
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Enabled: {}", summary.enabled);
            println!("  Project: {}", summary.project_id);
            println!("  Topic selector: {}", summary.has_topic_selector);
            println!("  Publish timeout (ms): {}", summary.publish_timeout_ms);
            println!("  Time format: {}", summary.time_format);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
