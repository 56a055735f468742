//! # Config Loader
//!
//! Loads the Pub/Sub output configuration.
//!
//! - TOML (primary) or JSON, picked by file extension
//! - relative template / credentials file references are resolved against
//!   the directory of the configuration file
//! - the result is validated before it is returned
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("output.toml")).unwrap();
//! println!("Project: {}", config.pubsub.project_id);
//! ```

mod validator;

pub use contracts::OutputConfig;

use contracts::{ContractError, PubSubOutputConfig};
use std::path::{Path, PathBuf};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// 从文件路径推断格式
    pub fn from_path(path: &Path) -> Result<Self, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        Self::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!(
                "unsupported config format for {} (expected .toml or .json)",
                path.display()
            ))
        })
    }

    fn parse(self, content: &str) -> Result<OutputConfig, ContractError> {
        let parsed = match self {
            Self::Toml => toml::from_str::<OutputConfig>(content)
                .map_err(|e| ("TOML", e.to_string(), boxed(e))),
            Self::Json => serde_json::from_str::<OutputConfig>(content)
                .map_err(|e| ("JSON", e.to_string(), boxed(e))),
        };

        parsed.map_err(|(kind, message, source)| ContractError::ConfigParse {
            message: format!("{kind} parse error: {message}"),
            source: Some(source),
        })
    }
}

fn boxed(
    e: impl std::error::Error + Send + Sync + 'static,
) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(e)
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load, resolve and validate a configuration file
    ///
    /// # Errors
    /// - unreadable file or unsupported extension
    /// - parse failure
    /// - validation failure
    pub fn load_from_path(path: &Path) -> Result<OutputConfig, ContractError> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| ContractError::ConfigParse {
            message: format!("cannot read {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })?;

        let mut config = format.parse(&content)?;
        if let Some(base) = path.parent() {
            resolve_file_references(&mut config.pubsub, base);
        }

        validator::validate(&config)?;
        Ok(config)
    }

    /// Parse and validate configuration text; file references stay as written
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<OutputConfig, ContractError> {
        let config = format.parse(content)?;
        validator::validate(&config)?;
        Ok(config)
    }

    /// Validate an already assembled configuration (e.g. after CLI overrides)
    pub fn validate(config: &OutputConfig) -> Result<(), ContractError> {
        validator::validate(config)
    }

    /// Serialize OutputConfig to TOML string
    pub fn to_toml(config: &OutputConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize OutputConfig to JSON string
    pub fn to_json(config: &OutputConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

/// `credentials`, `message` and `topic_selector` may name a file. A relative
/// name that exists next to the configuration file becomes an absolute path;
/// everything else is left untouched.
fn resolve_file_references(pubsub: &mut PubSubOutputConfig, base: &Path) {
    for value in [
        &mut pubsub.credentials,
        &mut pubsub.message,
        &mut pubsub.topic_selector,
    ] {
        if let Some(path) = relative_file(value.as_str(), base) {
            *value = path.display().to_string();
        }
    }
}

fn relative_file(value: &str, base: &Path) -> Option<PathBuf> {
    let value = value.trim();
    // Multi-line values and inline JSON are never file names
    if value.is_empty() || value.contains('\n') || value.starts_with('{') {
        return None;
    }

    let path = Path::new(value);
    if path.is_absolute() {
        return None;
    }

    let candidate = base.join(path);
    candidate.is_file().then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL_TOML: &str = r#"
[pubsub]
credentials = "/etc/keys/sa.json"
project_id = "events-prod"
message = "{{ data | json_encode() }}"
topic_selector = """
{{ channel }}-events
audit
"""
publish_timeout_ms = 2000

[template]
time_format = "%Y-%m-%d"
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.pubsub.project_id, "events-prod");
        assert!(config.pubsub.topic_selector.contains("audit"));
        assert_eq!(config.pubsub.publish_timeout_ms, 2000);
    }

    #[test]
    fn test_load_from_str_defaults() {
        let config = ConfigLoader::load_from_str("", ConfigFormat::Toml).unwrap();
        assert!(!config.pubsub.is_enabled());
        assert_eq!(config.pubsub.publish_timeout_ms, 0);
        assert_eq!(config.template.time_format, "%Y-%m-%dT%H:%M:%S%.9f%:z");
    }

    #[test]
    fn test_load_from_str_json() {
        let content = r#"{
            "pubsub": {
                "credentials": "{\"type\":\"service_account\"}",
                "project_id": "events-prod",
                "message": "{{ data.text }}",
                "publish_timeout_ms": 1500
            },
            "template": { "time_format": "%H:%M" }
        }"#;
        let config = ConfigLoader::load_from_str(content, ConfigFormat::Json).unwrap();
        assert_eq!(config.pubsub.publish_timeout_ms, 1500);
        assert_eq!(config.template.time_format, "%H:%M");
    }

    #[test]
    fn test_syntax_error_keeps_source() {
        let err = ConfigLoader::load_from_str("invalid toml [[[", ConfigFormat::Toml).unwrap_err();
        assert!(matches!(
            err,
            ContractError::ConfigParse {
                source: Some(_),
                ..
            }
        ));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("TOML"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }

    #[test]
    fn test_round_trip_toml() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(config.pubsub.message, config2.pubsub.message);
        assert_eq!(config.pubsub.topic_selector, config2.pubsub.topic_selector);
    }

    #[test]
    fn test_round_trip_json() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(config.pubsub.publish_timeout_ms, config2.pubsub.publish_timeout_ms);
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(MINIMAL_TOML.as_bytes()).unwrap();

        let config = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(config.template.time_format, "%Y-%m-%d");
        assert_eq!(config.pubsub.credentials, "/etc/keys/sa.json");
    }

    #[test]
    fn test_load_from_path_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let err = ConfigLoader::load_from_path(Path::new("/nonexistent/output.toml")).unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
        assert!(err.to_string().contains("cannot read"));
    }

    #[test]
    fn test_relative_files_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("templates")).unwrap();
        std::fs::write(dir.path().join("templates/message.tera"), "{{ data }}").unwrap();
        std::fs::write(dir.path().join("sa.json"), "{}").unwrap();

        let config_path = dir.path().join("output.toml");
        std::fs::write(
            &config_path,
            r#"
[pubsub]
credentials = "sa.json"
project_id = "events-prod"
message = "templates/message.tera"
topic_selector = "alerts"
"#,
        )
        .unwrap();

        let config = ConfigLoader::load_from_path(&config_path).unwrap();
        assert_eq!(
            PathBuf::from(&config.pubsub.credentials),
            dir.path().join("sa.json")
        );
        assert_eq!(
            PathBuf::from(&config.pubsub.message),
            dir.path().join("templates/message.tera")
        );
        // no such file: the value is the template itself
        assert_eq!(config.pubsub.topic_selector, "alerts");
    }

    #[test]
    fn test_inline_values_are_not_paths() {
        let base = tempfile::tempdir().unwrap();
        assert_eq!(relative_file(r#"{"type":"service_account"}"#, base.path()), None);
        assert_eq!(relative_file("{{ channel }}\naudit", base.path()), None);
        assert_eq!(relative_file("/etc/keys/sa.json", base.path()), None);
        assert_eq!(relative_file("  ", base.path()), None);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[pubsub]
project_id = "events prod"
"#;
        let err = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { .. }));
    }
}
