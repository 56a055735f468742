//! Command implementations.

mod render;
mod run;
mod validate;

pub use render::run_render;
pub use run::run_publish;
pub use validate::run_validate;

use std::path::Path;

use contracts::OutputConfig;
use tracing::info;

use crate::cli::PubSubOverrides;
use crate::error::{CliError, Result};

/// Load the configuration file, apply CLI/env overrides, then validate
pub(crate) fn load_config(path: &Path, overrides: &PubSubOverrides) -> Result<OutputConfig> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()));
    }

    let mut config = config_loader::ConfigLoader::load_from_path(path)?;
    overrides.apply(&mut config);
    config_loader::ConfigLoader::validate(&config)?;

    info!(
        config = %path.display(),
        enabled = config.pubsub.is_enabled(),
        project_id = %config.pubsub.project_id,
        "Configuration loaded"
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file() {
        let result = load_config(Path::new("/nonexistent/out.toml"), &PubSubOverrides::default());
        assert!(matches!(result, Err(CliError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_overrides_are_validated() {
        let file = config_file(
            r#"
[pubsub]
credentials = "{}"
message = "{{ data }}"
"#,
        );

        let overrides = PubSubOverrides {
            project_id: Some("events prod".to_string()),
            ..Default::default()
        };

        let result = load_config(file.path(), &overrides);
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_overrides_enable_output() {
        let file = config_file(
            r#"
[pubsub]
message = "{{ data }}"
topic_selector = "alerts"
"#,
        );

        let overrides = PubSubOverrides {
            credentials: Some("{}".to_string()),
            project_id: Some("events-prod".to_string()),
            ..Default::default()
        };

        let config = load_config(file.path(), &overrides).unwrap();
        assert!(config.pubsub.is_enabled());
        assert_eq!(config.pubsub.topic_selector, "alerts");
    }
}
