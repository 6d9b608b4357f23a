//! Locked-down response channel.
//!
//! # Responsibilities
//! - Buffer status, headers and body for one response
//! - Force all body content through the escaping render paths
//!
//! # Design Decisions
//! - The raw write channel is crate-private; the public `write_raw`
//!   unconditionally fails so stray direct writes surface as defects,
//!   not as unescaped output
//! - Page sinks accept only `render`, AJAX sinks only `render_json`

use axum::body::Body;
use axum::http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::Response;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::SecurityError;
use crate::render::{RenderError, TemplateBackend};
use crate::safety::html_safe_json;

/// Output discipline for a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// HTML page responses; body must come from [`ResponseSink::render`].
    Page,
    /// JSON responses; body must come from [`ResponseSink::render_json`].
    Ajax,
}

/// Buffered response a handler writes into through sanctioned paths.
pub struct ResponseSink {
    mode: OutputMode,
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    templates: Arc<dyn TemplateBackend>,
    xsrf_token: Option<String>,
    csp_nonce: String,
}

impl ResponseSink {
    pub(crate) fn new(
        mode: OutputMode,
        templates: Arc<dyn TemplateBackend>,
        xsrf_token: Option<String>,
        csp_nonce: String,
    ) -> Self {
        let mut headers = HeaderMap::new();
        if mode == OutputMode::Ajax {
            // Discourage browsers from ever treating the payload as markup.
            headers.insert(
                CONTENT_DISPOSITION,
                HeaderValue::from_static("attachment; filename=json"),
            );
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static("application/json; charset=utf-8"),
            );
        }
        Self {
            mode,
            status: StatusCode::OK,
            headers,
            body: Vec::new(),
            templates,
            xsrf_token,
            csp_nonce,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Set a response header.
    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Append a response header, keeping existing values (Set-Cookie).
    pub fn append_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.append(name, value);
    }

    /// Render `template` with `values` plus the injected `_xsrf` and
    /// `_csp_nonce` entries, returning the result as a string.
    pub fn render_to_string(
        &self,
        template: &str,
        values: Map<String, Value>,
    ) -> Result<String, RenderError> {
        let mut values = values;
        values.insert(
            "_xsrf".to_string(),
            self.xsrf_token
                .as_deref()
                .map(|t| Value::String(t.to_string()))
                .unwrap_or(Value::Null),
        );
        values.insert(
            "_csp_nonce".to_string(),
            Value::String(self.csp_nonce.clone()),
        );
        self.templates.render(template, &values)
    }

    /// Render `template` into the response body. Page handlers only.
    pub fn render(
        &mut self,
        template: &str,
        values: Map<String, Value>,
    ) -> Result<(), SecurityError> {
        if self.mode != OutputMode::Page {
            return Err(SecurityError::RenderPathViolation {
                expected: "render_json",
            });
        }
        let rendered = self.render_to_string(template, values)?;
        self.raw(rendered.as_bytes());
        Ok(())
    }

    /// Serialize `value` as HTML-safe JSON into the response body.
    /// AJAX handlers only.
    pub fn render_json<T: Serialize>(&mut self, value: &T) -> Result<(), SecurityError> {
        if self.mode != OutputMode::Ajax {
            return Err(SecurityError::RenderPathViolation { expected: "render" });
        }
        let json = html_safe_json(value).map_err(RenderError::Json)?;
        self.raw(json.as_bytes());
        Ok(())
    }

    /// Guarded direct-write channel: always fails. All content must go
    /// through [`ResponseSink::render`] or [`ResponseSink::render_json`].
    pub fn write_raw(&mut self, _bytes: &[u8]) -> Result<(), SecurityError> {
        Err(SecurityError::RawWriteBlocked)
    }

    /// The original, un-guarded channel. Pipeline-internal.
    pub(crate) fn raw(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    pub(crate) fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::JsonTemplateBackend;
    use serde_json::json;

    fn page_sink() -> ResponseSink {
        ResponseSink::new(
            OutputMode::Page,
            Arc::new(JsonTemplateBackend),
            Some("tok123".to_string()),
            "nonce456".to_string(),
        )
    }

    fn ajax_sink() -> ResponseSink {
        ResponseSink::new(
            OutputMode::Ajax,
            Arc::new(JsonTemplateBackend),
            None,
            "nonce456".to_string(),
        )
    }

    #[test]
    fn test_raw_write_always_blocked() {
        let mut sink = page_sink();
        assert!(matches!(
            sink.write_raw(b"<b>hi</b>"),
            Err(SecurityError::RawWriteBlocked)
        ));
        let mut sink = ajax_sink();
        assert!(matches!(
            sink.write_raw(b"{}"),
            Err(SecurityError::RawWriteBlocked)
        ));
    }

    #[test]
    fn test_render_injects_token_and_nonce() {
        let mut sink = page_sink();
        sink.render("index.html", Map::new()).unwrap();
        let rendered = String::from_utf8(sink.body.clone()).unwrap();
        assert!(rendered.contains(r#""_xsrf":"tok123""#));
        assert!(rendered.contains(r#""_csp_nonce":"nonce456""#));
    }

    #[test]
    fn test_render_rejected_on_ajax_sink() {
        let mut sink = ajax_sink();
        assert!(matches!(
            sink.render("index.html", Map::new()),
            Err(SecurityError::RenderPathViolation { .. })
        ));
    }

    #[test]
    fn test_render_json_rejected_on_page_sink() {
        let mut sink = page_sink();
        assert!(matches!(
            sink.render_json(&json!({"ok": true})),
            Err(SecurityError::RenderPathViolation { .. })
        ));
    }

    #[test]
    fn test_ajax_sink_sets_json_headers_and_escapes() {
        let mut sink = ajax_sink();
        sink.render_json(&json!({"html": "<p>"})).unwrap();
        assert_eq!(
            sink.headers.get(CONTENT_TYPE).unwrap(),
            "application/json; charset=utf-8"
        );
        assert_eq!(
            sink.headers.get(CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=json"
        );
        let body = String::from_utf8(sink.body.clone()).unwrap();
        assert!(!body.contains('<'));
    }
}
