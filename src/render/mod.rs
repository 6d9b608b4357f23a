//! Template rendering seam.
//!
//! # Responsibilities
//! - Define the opaque `render(template, values) -> string` capability
//!   the pipeline's sanctioned output path defers to
//!
//! # Design Decisions
//! - The scaffold does not ship a real template engine; applications
//!   plug in their backend behind [`TemplateBackend`]
//! - Backends are expected to autoescape; the pipeline injects the XSRF
//!   token and CSP nonce into the value set before delegating

use serde_json::{Map, Value};
use thiserror::Error;

/// Template rendering failure.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template backend error: {0}")]
    Backend(String),

    #[error("value serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Opaque template rendering capability.
pub trait TemplateBackend: Send + Sync {
    /// Render `template` with `values` to a string.
    fn render(&self, template: &str, values: &Map<String, Value>) -> Result<String, RenderError>;
}

/// Backend that renders the value map as JSON, ignoring the template
/// name. Useful for tests and for inspecting injected values.
pub struct JsonTemplateBackend;

impl TemplateBackend for JsonTemplateBackend {
    fn render(&self, _template: &str, values: &Map<String, Value>) -> Result<String, RenderError> {
        Ok(serde_json::to_string(values)?)
    }
}
