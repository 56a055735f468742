//! TemplateRenderer trait - template engine interface

use serde_json::Value;

use crate::ContractError;

/// Renders a compiled template against a structured object
///
/// Rendering must not mutate renderer state: the same object always yields
/// the same bytes.
pub trait TemplateRenderer: Send + Sync {
    /// Template name (used in errors and logs)
    fn name(&self) -> &str;

    /// Render the template with `object` as root context
    ///
    /// # Errors
    /// Returns `TemplateRender` on any engine failure.
    fn render(&self, object: &Value) -> Result<Vec<u8>, ContractError>;
}
