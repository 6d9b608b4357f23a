//! Per-request context assembled before any gate runs.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::http::{header, request::Parts, HeaderMap, Method, Uri};
use uuid::Uuid;

/// Authenticated principal for one request, resolved once before any
/// gate runs and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Stable user identifier; also the XSRF token user scope.
    pub email: String,
    /// Administrator flag, checked by Admin handler variants.
    pub is_admin: bool,
}

impl Identity {
    pub fn user(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            is_admin: false,
        }
    }

    pub fn admin(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            is_admin: true,
        }
    }
}

/// Resolves the current identity from request parts.
///
/// Implementations wrap whatever session or platform identity mechanism
/// the host application uses. Returning `None` means unauthenticated.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, parts: &Parts) -> Option<Identity>;
}

/// Resolver reading an [`Identity`] placed in request extensions by an
/// outer authentication layer.
pub struct ExtensionIdentityResolver;

impl IdentityResolver for ExtensionIdentityResolver {
    fn resolve(&self, parts: &Parts) -> Option<Identity> {
        parts.extensions.get::<Identity>().cloned()
    }
}

/// Read-only view of one inbound request, handed to gates and to the
/// concrete handler's verb method.
#[derive(Debug)]
pub struct RequestContext {
    /// Correlation id for logs.
    pub request_id: Uuid,
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    /// Whether the request arrived over HTTPS (scheme, or the
    /// `X-Forwarded-Proto` set by a fronting proxy).
    pub is_https: bool,
    /// Identity resolved before any gate ran; immutable per request.
    pub identity: Option<Identity>,
    /// Query and form parameters, first value wins.
    params: HashMap<String, String>,
    /// Buffered request body.
    pub body: Bytes,
    /// Token generated for the current identity, if any. Injected into
    /// rendered templates as `_xsrf`.
    pub xsrf_token: Option<String>,
    /// Per-response CSP nonce. Injected into rendered templates as
    /// `_csp_nonce`.
    pub csp_nonce: String,
}

impl RequestContext {
    pub(crate) fn new(
        parts: &Parts,
        body: Bytes,
        identity: Option<Identity>,
        xsrf_token: Option<String>,
        csp_nonce: String,
    ) -> Self {
        let is_https = request_is_https(parts);
        let params = parse_params(parts, &body);
        Self {
            request_id: Uuid::new_v4(),
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            headers: parts.headers.clone(),
            is_https,
            identity,
            params,
            body,
            xsrf_token,
            csp_nonce,
        }
    }

    /// First value of a query or form parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

fn request_is_https(parts: &Parts) -> bool {
    if let Some(scheme) = parts.uri.scheme_str() {
        return scheme.eq_ignore_ascii_case("https");
    }
    parts
        .headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("https"))
        .unwrap_or(false)
}

fn parse_params(parts: &Parts, body: &Bytes) -> HashMap<String, String> {
    let mut params = HashMap::new();
    if let Some(query) = parts.uri.query() {
        for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
            params.entry(k.into_owned()).or_insert_with(|| v.into_owned());
        }
    }
    let is_form = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false);
    if is_form {
        for (k, v) in url::form_urlencoded::parse(body) {
            params.entry(k.into_owned()).or_insert_with(|| v.into_owned());
        }
    }
    params
}
