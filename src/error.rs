//! Error taxonomy for the security pipeline.
//!
//! # Design Decisions
//! - Access denial and XSRF failure are not errors: the concrete handler
//!   controls those responses through its `deny_access` / `xsrf_fail`
//!   callbacks
//! - Everything here signals a defect in the surrounding application or
//!   an unavailable upstream; both surface as opaque server errors

use axum::http::header::InvalidHeaderValue;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::observability::metrics;
use crate::render::RenderError;
use crate::xsrf::KeyStoreError;

/// Fatal security-policy violations and upstream failures.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// A handler type declared a method reserved for the pipeline.
    /// Raised at registration time, before any request is served.
    #[error("{type_name} attempts to override restricted method {method}")]
    RestrictedOverride { type_name: String, method: String },

    /// A restricted-context handler was reached without its
    /// trusted-origin header. In the deployed topology such a request
    /// should never occur.
    #[error("attempt to access {variant} handler without {header} header")]
    UntrustedOrigin {
        variant: &'static str,
        header: &'static str,
    },

    /// Business logic attempted to bypass the escaping render path.
    #[error("all response content must originate via render() or render_json()")]
    RawWriteBlocked,

    /// Business logic used the wrong render path for its handler kind.
    #[error("output for this handler must go through {expected}()")]
    RenderPathViolation { expected: &'static str },

    /// The request body could not be buffered for parameter extraction.
    #[error("failed to buffer request body: {0}")]
    BodyRead(String),

    #[error(transparent)]
    Render(#[from] RenderError),

    /// The authoritative secret-key store is unavailable. Not retried:
    /// token validation without the key would fail open or closed
    /// unpredictably.
    #[error(transparent)]
    KeyStore(#[from] KeyStoreError),

    /// Configured policy produced an unencodable header value.
    #[error("invalid security header value: {0}")]
    HeaderValue(#[from] InvalidHeaderValue),
}

impl SecurityError {
    /// Short stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SecurityError::RestrictedOverride { .. } => "restricted_override",
            SecurityError::UntrustedOrigin { .. } => "untrusted_origin",
            SecurityError::RawWriteBlocked => "raw_write_blocked",
            SecurityError::RenderPathViolation { .. } => "render_path_violation",
            SecurityError::BodyRead(_) => "body_read",
            SecurityError::Render(_) => "render",
            SecurityError::KeyStore(_) => "key_store",
            SecurityError::HeaderValue(_) => "header_value",
        }
    }
}

impl IntoResponse for SecurityError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, kind = self.kind(), "security pipeline failure");
        metrics::record_security_violation(self.kind());
        // Details stay in the logs; clients get an opaque server error.
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
    }
}
