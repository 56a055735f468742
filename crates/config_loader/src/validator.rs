//! 配置校验模块
//!
//! 校验规则：
//! - time_format 非空且为合法的 strftime 格式
//! - project_id 不含空白字符
//!
//! credentials / project_id 缺失不是错误：输出被禁用。
//! 空 message 模板也不是错误：每个事件都被静默丢弃。

use chrono::format::{Item, StrftimeItems};

use contracts::{ContractError, OutputConfig};

/// 校验 OutputConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &OutputConfig) -> Result<(), ContractError> {
    validate_time_format(config)?;
    validate_project_id(config)?;
    Ok(())
}

/// 校验时间格式
fn validate_time_format(config: &OutputConfig) -> Result<(), ContractError> {
    let format = &config.template.time_format;

    if format.trim().is_empty() {
        return Err(ContractError::config_validation(
            "template.time_format",
            "time_format cannot be empty",
        ));
    }

    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ContractError::config_validation(
            "template.time_format",
            format!("invalid strftime format '{format}'"),
        ));
    }

    Ok(())
}

/// 校验 project_id
fn validate_project_id(config: &OutputConfig) -> Result<(), ContractError> {
    let project_id = config.pubsub.project_id.trim();
    if project_id.chars().any(char::is_whitespace) {
        return Err(ContractError::config_validation(
            "pubsub.project_id",
            format!("project_id '{project_id}' must not contain whitespace"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ConfigVersion, PubSubOutputConfig, TemplateOptions};

    fn minimal_config() -> OutputConfig {
        OutputConfig {
            version: ConfigVersion::V1,
            pubsub: PubSubOutputConfig {
                credentials: "/etc/keys/sa.json".into(),
                project_id: "events-prod".into(),
                message: "{{ data | json_encode() }}".into(),
                topic_selector: "{{ channel }}".into(),
                publish_timeout_ms: 0,
            },
            template: TemplateOptions::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = minimal_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_disabled_output_is_valid() {
        let mut config = minimal_config();
        config.pubsub.credentials = String::new();
        config.pubsub.message = String::new();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_message_when_enabled_is_valid() {
        let mut config = minimal_config();
        config.pubsub.message = "  ".into();
        assert!(config.pubsub.is_enabled());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_time_format() {
        let mut config = minimal_config();
        config.template.time_format = String::new();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("time_format cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_invalid_time_format() {
        let mut config = minimal_config();
        config.template.time_format = "%Y-%Q".into();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("invalid strftime format"), "got: {err}");
    }

    #[test]
    fn test_project_id_whitespace() {
        let mut config = minimal_config();
        config.pubsub.project_id = "events prod".into();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("must not contain whitespace"), "got: {err}");
    }
}
