//! The layered request dispatch chain.
//!
//! # Responsibilities
//! - Apply, in order: trusted-origin gate, security headers, auth gate,
//!   XSRF gate, output lockdown, verb delegation
//! - Short-circuit through the handler's terminal callbacks
//!
//! # Design Decisions
//! - The chain is a fixed function over a handler-capability object;
//!   there is no hook for a handler to reorder or skip stages
//! - Gate outcomes are logged and counted; recoverable denials never
//!   reach business logic, fatal violations abort the request loudly

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::SET_COOKIE;
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, MethodRouter};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::schema::ScaffoldConfig;
use crate::error::SecurityError;
use crate::headers;
use crate::observability::metrics;
use crate::pipeline::context::{IdentityResolver, RequestContext};
use crate::pipeline::guard::{self, HandlerDescriptor};
use crate::pipeline::handler::SecureHandler;
use crate::pipeline::sink::{OutputMode, ResponseSink};
use crate::pipeline::variant::{is_safe_verb, HandlerVariant};
use crate::render::TemplateBackend;
use crate::safety::SecureCookie;
use crate::xsrf::token::DEFAULT_ACTION;
use crate::xsrf::{generate_token, unix_now, validate_token, KeyProvider, KeyStore};

/// Prefix returned before GET responses from AJAX handlers. A foreign
/// origin including the endpoint via a script tag cannot strip it, so
/// the payload never parses as JavaScript there.
pub const XSSI_PREFIX: &str = ")]}',\n";

/// Cookie exposing the XSRF token to frontend code in SPA mode.
pub const XSRF_COOKIE_NAME: &str = "XSRF-TOKEN";

/// Cap on buffered request bodies for form-parameter extraction.
const MAX_BUFFERED_BODY: usize = 1024 * 1024;

/// Shared capabilities every pipeline draws on.
#[derive(Clone)]
pub struct ScaffoldState {
    pub config: Arc<ScaffoldConfig>,
    pub keys: Arc<KeyProvider>,
    pub identity: Arc<dyn IdentityResolver>,
    pub templates: Arc<dyn TemplateBackend>,
}

impl ScaffoldState {
    pub fn new(
        config: ScaffoldConfig,
        store: Arc<dyn KeyStore>,
        identity: Arc<dyn IdentityResolver>,
        templates: Arc<dyn TemplateBackend>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            keys: Arc::new(KeyProvider::new(store)),
            identity,
            templates,
        }
    }
}

/// One registered handler behind the full security chain.
pub struct DispatchPipeline {
    state: ScaffoldState,
    variant: HandlerVariant,
    handler: Arc<dyn SecureHandler>,
}

impl DispatchPipeline {
    /// Register a handler behind the pipeline. The descriptor is checked
    /// once, here, against the restricted-method list; a violation
    /// aborts registration before any request is served.
    pub fn register(
        state: ScaffoldState,
        variant: HandlerVariant,
        descriptor: HandlerDescriptor,
        handler: Arc<dyn SecureHandler>,
    ) -> Result<Self, SecurityError> {
        guard::check_descriptor(&descriptor)?;
        tracing::debug!(
            handler = %descriptor.type_name,
            variant = variant.name(),
            "handler registered"
        );
        Ok(Self {
            state,
            variant,
            handler,
        })
    }

    pub fn variant(&self) -> HandlerVariant {
        self.variant
    }

    /// Run the full chain for one request. Fatal violations become
    /// opaque server errors.
    pub async fn dispatch(&self, request: Request<Body>) -> Response {
        match self.run(request).await {
            Ok(response) => response,
            Err(error) => {
                metrics::record_dispatch(self.variant.name(), "error");
                error.into_response()
            }
        }
    }

    async fn run(&self, request: Request<Body>) -> Result<Response, SecurityError> {
        // Trusted-origin gate, layered outside the base chain. Failing
        // it is fatal: in the deployed topology such a request should
        // never occur.
        if let Some(origin) = self.variant.trusted_origin() {
            let value = request
                .headers()
                .get(origin.header_name())
                .and_then(|v| v.to_str().ok());
            if !origin.accepts(value) {
                return Err(SecurityError::UntrustedOrigin {
                    variant: self.variant.name(),
                    header: origin.header_name(),
                });
            }
        }

        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, MAX_BUFFERED_BODY)
            .await
            .map_err(|e| SecurityError::BodyRead(e.to_string()))?;

        // Identity is resolved once, before any gate, and stays
        // immutable for the request.
        let identity = self.state.identity.resolve(&parts);
        let xsrf_token = match &identity {
            Some(id) => {
                let key = self.state.keys.key().await?;
                Some(generate_token(&key, &id.email, DEFAULT_ACTION, unix_now()))
            }
            None => None,
        };
        let csp_nonce = headers::generate_nonce(self.state.config.nonce_length);
        let ctx = RequestContext::new(&parts, body, identity, xsrf_token.clone(), csp_nonce.clone());

        tracing::debug!(
            request_id = %ctx.request_id,
            method = %ctx.method,
            path = %ctx.uri.path(),
            variant = self.variant.name(),
            "dispatching request"
        );

        // Header stage: computed once, attached before anything else can
        // short-circuit the chain.
        let mode = if self.variant.is_ajax() {
            OutputMode::Ajax
        } else {
            OutputMode::Page
        };
        let mut sink = ResponseSink::new(
            mode,
            self.state.templates.clone(),
            xsrf_token.clone(),
            csp_nonce.clone(),
        );
        for (name, value) in headers::compute_headers(&self.state.config, ctx.is_https, &csp_nonce)?
        {
            sink.append_header(name, value);
        }
        if self.state.config.spa_mode {
            if let Some(token) = &xsrf_token {
                // Frontend HTTP clients read this cookie and echo the
                // token back in the XSRF header.
                let cookie = SecureCookie::new(XSRF_COOKIE_NAME, token, self.state.config.dev_mode)
                    .http_only(false);
                sink.append_header(SET_COOKIE, cookie.to_header_value()?);
            }
        }

        // Auth gate.
        if self.variant.requires_auth() {
            let authorized = match &ctx.identity {
                None => false,
                Some(id) => !self.variant.requires_admin() || id.is_admin,
            };
            if !authorized {
                tracing::info!(
                    request_id = %ctx.request_id,
                    variant = self.variant.name(),
                    "access denied"
                );
                metrics::record_access_denied(self.variant.name());
                metrics::record_dispatch(self.variant.name(), "access_denied");
                self.handler.deny_access(&ctx, &mut sink).await?;
                return Ok(sink.into_response());
            }
        }

        // XSRF gate; safe verbs are exempt.
        if self.variant.xsrf_protected()
            && !is_safe_verb(&ctx.method)
            && !self.request_contains_valid_xsrf_token(&ctx).await?
        {
            tracing::info!(
                request_id = %ctx.request_id,
                variant = self.variant.name(),
                "invalid or missing XSRF token"
            );
            metrics::record_xsrf_failure(self.variant.name());
            metrics::record_dispatch(self.variant.name(), "xsrf_fail");
            self.handler.xsrf_fail(&ctx, &mut sink).await?;
            return Ok(sink.into_response());
        }

        // Output lockdown is carried by the sink mode; AJAX GET bodies
        // additionally start with the anti-script-inclusion prefix.
        if self.variant.is_ajax() && ctx.method == Method::GET {
            sink.raw(XSSI_PREFIX.as_bytes());
        }

        // Delegate to the verb method.
        match ctx.method.clone() {
            Method::GET => self.handler.get(&ctx, &mut sink).await?,
            Method::POST => self.handler.post(&ctx, &mut sink).await?,
            Method::PUT => self.handler.put(&ctx, &mut sink).await?,
            Method::DELETE => self.handler.delete(&ctx, &mut sink).await?,
            Method::PATCH => self.handler.patch(&ctx, &mut sink).await?,
            Method::HEAD => self.handler.head(&ctx, &mut sink).await?,
            Method::OPTIONS => self.handler.options(&ctx, &mut sink).await?,
            _ => sink.set_status(StatusCode::METHOD_NOT_ALLOWED),
        }

        metrics::record_dispatch(self.variant.name(), "ok");
        Ok(sink.into_response())
    }

    /// Extract and validate the request's XSRF token for the current
    /// identity. Fails closed on any missing piece.
    async fn request_contains_valid_xsrf_token(
        &self,
        ctx: &RequestContext,
    ) -> Result<bool, SecurityError> {
        let Some(identity) = &ctx.identity else {
            return Ok(false);
        };
        let mut token = ctx
            .param("xsrf")
            .or_else(|| ctx.header(self.variant.xsrf_header()))
            .map(str::to_string);
        if self.state.config.spa_mode {
            // Some frontend HTTP clients quote the header value.
            if let Some(t) = &token {
                if t.len() >= 2 && t.starts_with('"') && t.ends_with('"') {
                    token = Some(t[1..t.len() - 1].to_string());
                }
            }
        }
        let Some(token) = token else {
            return Ok(false);
        };
        let key = self.state.keys.key().await?;
        Ok(validate_token(
            &key,
            &identity.email,
            &token,
            DEFAULT_ACTION,
            self.state.config.xsrf_max_age_secs,
            unix_now(),
        ))
    }

    /// Adapt the pipeline to an axum route serving every verb.
    pub fn into_route(self: Arc<Self>) -> MethodRouter {
        any(move |request: Request<Body>| {
            let pipeline = self.clone();
            async move { pipeline.dispatch(request).await }
        })
    }
}

/// Build an axum router from path-to-pipeline bindings, with request
/// tracing wired the way the rest of the service expects.
pub fn scaffold_router(routes: Vec<(&str, Arc<DispatchPipeline>)>) -> Router {
    let mut router = Router::new();
    for (path, pipeline) in routes {
        router = router.route(path, pipeline.into_route());
    }
    router.layer(TraceLayer::new_for_http())
}
