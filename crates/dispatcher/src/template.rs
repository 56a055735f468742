//! Templates - topic selector and message body rendering
//!
//! [`TextTemplate`] is the tera-backed [`TemplateRenderer`]. [`TopicResolver`]
//! and [`MessageFormatter`] are thin wrappers that only differ in purpose.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use contracts::{ContractError, TemplateOptions, TemplateRenderer};
use serde_json::Value;
use tera::{Context, Tera};

/// Template name used for the message body
pub const MESSAGE_TEMPLATE_NAME: &str = "pubsub-message";

/// Template name used for the topic selector
pub const SELECTOR_TEMPLATE_NAME: &str = "pubsub-selector";

/// Resolve template content: a path to an existing file yields the file
/// contents, anything else is the template itself.
pub fn resolve_content(content: &str) -> String {
    let path = Path::new(content);
    if path.is_file() {
        if let Ok(text) = std::fs::read_to_string(path) {
            return text;
        }
    }
    content.to_string()
}

/// A single compiled tera template
pub struct TextTemplate {
    name: String,
    tera: Tera,
}

impl TextTemplate {
    /// Compile `content` under `name`
    ///
    /// # Errors
    /// Returns `TemplateCompile` when tera rejects the template.
    pub fn new(
        name: impl Into<String>,
        content: &str,
        options: &TemplateOptions,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let mut tera = Tera::default();
        tera.autoescape_on(Vec::new());
        tera.register_filter("time_format", time_format_filter(options.time_format.clone()));
        tera.add_raw_template(&name, content)
            .map_err(|e| ContractError::template_compile(&name, error_chain(&e)))?;

        Ok(Self { name, tera })
    }
}

impl TemplateRenderer for TextTemplate {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, object: &Value) -> Result<Vec<u8>, ContractError> {
        let context = Context::from_serialize(object)
            .map_err(|e| ContractError::template_render(&self.name, error_chain(&e)))?;

        self.tera
            .render(&self.name, &context)
            .map(String::into_bytes)
            .map_err(|e| ContractError::template_render(&self.name, error_chain(&e)))
    }
}

/// Renders the newline-separated topic list for an event
pub struct TopicResolver {
    renderer: Box<dyn TemplateRenderer>,
}

impl TopicResolver {
    /// Wrap any renderer
    pub fn new(renderer: impl TemplateRenderer + 'static) -> Self {
        Self {
            renderer: Box::new(renderer),
        }
    }

    /// Compile the selector template (inline text or file path)
    pub fn from_template(content: &str, options: &TemplateOptions) -> Result<Self, ContractError> {
        let template = TextTemplate::new(SELECTOR_TEMPLATE_NAME, &resolve_content(content), options)?;
        Ok(Self::new(template))
    }

    /// Render the raw topic list
    pub fn render(&self, object: &Value) -> Result<String, ContractError> {
        let bytes = self.renderer.render(object)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Renders the message body for an event
pub struct MessageFormatter {
    renderer: Box<dyn TemplateRenderer>,
}

impl MessageFormatter {
    /// Wrap any renderer
    pub fn new(renderer: impl TemplateRenderer + 'static) -> Self {
        Self {
            renderer: Box::new(renderer),
        }
    }

    /// Compile the message template (inline text or file path)
    pub fn from_template(content: &str, options: &TemplateOptions) -> Result<Self, ContractError> {
        let template = TextTemplate::new(MESSAGE_TEMPLATE_NAME, &resolve_content(content), options)?;
        Ok(Self::new(template))
    }

    /// Render the untrimmed message body
    pub fn render(&self, object: &Value) -> Result<Vec<u8>, ContractError> {
        self.renderer.render(object)
    }
}

/// `{{ time | time_format }}` / `{{ time | time_format(format="%H:%M") }}`
///
/// Accepts RFC 3339 strings or unix seconds.
fn time_format_filter(
    default_format: String,
) -> impl Fn(&Value, &HashMap<String, Value>) -> tera::Result<Value> + Send + Sync {
    move |value, args| {
        let format = match args.get("format") {
            Some(Value::String(format)) => format.as_str(),
            Some(other) => {
                return Err(tera::Error::msg(format!(
                    "time_format: `format` must be a string, got {other}"
                )))
            }
            None => default_format.as_str(),
        };

        let time: DateTime<FixedOffset> = match value {
            Value::String(text) => DateTime::parse_from_rfc3339(text)
                .map_err(|e| tera::Error::msg(format!("time_format: '{text}': {e}")))?,
            Value::Number(number) => number
                .as_i64()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .map(|utc| utc.fixed_offset())
                .ok_or_else(|| tera::Error::msg(format!("time_format: bad timestamp {number}")))?,
            other => {
                return Err(tera::Error::msg(format!(
                    "time_format: unsupported value {other}"
                )))
            }
        };

        let mut out = String::new();
        write!(out, "{}", time.format(format))
            .map_err(|_| tera::Error::msg(format!("time_format: invalid format '{format}'")))?;
        Ok(Value::String(out))
    }
}

/// tera keeps the useful part of an error in its source chain
fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
