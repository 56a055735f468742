//! Layered error definitions
//!
//! Categorized by source: config / event / template / publish

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Event Errors =====
    /// Event payload could not be turned into a structured object
    #[error("event conversion error: {message}")]
    EventConversion { message: String },

    // ===== Template Errors =====
    /// Template failed to compile
    #[error("template '{name}' compile error: {message}")]
    TemplateCompile { name: String, message: String },

    /// Template failed to render
    #[error("template '{name}' render error: {message}")]
    TemplateRender { name: String, message: String },

    // ===== Publish Errors =====
    /// Bus client could not be created
    #[error("publish client error: {message}")]
    ClientConnection { message: String },

    /// Publish to a topic failed
    #[error("publish to topic '{topic}' failed: {message}")]
    Publish { topic: String, message: String },

    /// Publish to a topic did not complete in time
    #[error("publish to topic '{topic}' timed out after {timeout_ms}ms")]
    PublishTimeout { topic: String, timeout_ms: u64 },
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create event conversion error
    pub fn event_conversion(message: impl Into<String>) -> Self {
        Self::EventConversion {
            message: message.into(),
        }
    }

    /// Create template compile error
    pub fn template_compile(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TemplateCompile {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create template render error
    pub fn template_render(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TemplateRender {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create client connection error
    pub fn client_connection(message: impl Into<String>) -> Self {
        Self::ClientConnection {
            message: message.into(),
        }
    }

    /// Create publish error
    pub fn publish(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Publish {
            topic: topic.into(),
            message: message.into(),
        }
    }
}
