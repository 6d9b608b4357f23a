//! The handler capability surface.

use async_trait::async_trait;
use axum::http::StatusCode;

use crate::error::SecurityError;
use crate::pipeline::context::RequestContext;
use crate::pipeline::sink::ResponseSink;

/// Business-logic surface the pipeline delegates to after every gate has
/// passed.
///
/// The trait deliberately has no `dispatch` and no token-extraction
/// method: customization happens only through the verb methods and the
/// `deny_access` / `xsrf_fail` terminal callbacks, so the pipeline's
/// ordering and gating cannot be overridden from a handler.
#[async_trait]
pub trait SecureHandler: Send + Sync + 'static {
    async fn get(&self, ctx: &RequestContext, out: &mut ResponseSink) -> Result<(), SecurityError> {
        method_not_allowed(ctx, out)
    }

    async fn post(
        &self,
        ctx: &RequestContext,
        out: &mut ResponseSink,
    ) -> Result<(), SecurityError> {
        method_not_allowed(ctx, out)
    }

    async fn put(&self, ctx: &RequestContext, out: &mut ResponseSink) -> Result<(), SecurityError> {
        method_not_allowed(ctx, out)
    }

    async fn delete(
        &self,
        ctx: &RequestContext,
        out: &mut ResponseSink,
    ) -> Result<(), SecurityError> {
        method_not_allowed(ctx, out)
    }

    async fn patch(
        &self,
        ctx: &RequestContext,
        out: &mut ResponseSink,
    ) -> Result<(), SecurityError> {
        method_not_allowed(ctx, out)
    }

    async fn head(
        &self,
        ctx: &RequestContext,
        out: &mut ResponseSink,
    ) -> Result<(), SecurityError> {
        method_not_allowed(ctx, out)
    }

    async fn options(
        &self,
        ctx: &RequestContext,
        out: &mut ResponseSink,
    ) -> Result<(), SecurityError> {
        method_not_allowed(ctx, out)
    }

    /// Terminal callback when the auth gate rejects the request. The
    /// handler fully controls the response; no verb method runs.
    async fn deny_access(
        &self,
        _ctx: &RequestContext,
        out: &mut ResponseSink,
    ) -> Result<(), SecurityError> {
        out.set_status(StatusCode::FORBIDDEN);
        Ok(())
    }

    /// Terminal callback when the XSRF gate rejects the request. The
    /// handler fully controls the response; no verb method runs.
    async fn xsrf_fail(
        &self,
        _ctx: &RequestContext,
        out: &mut ResponseSink,
    ) -> Result<(), SecurityError> {
        out.set_status(StatusCode::FORBIDDEN);
        Ok(())
    }
}

fn method_not_allowed(ctx: &RequestContext, out: &mut ResponseSink) -> Result<(), SecurityError> {
    tracing::debug!(method = %ctx.method, path = %ctx.uri.path(), "verb not implemented by handler");
    out.set_status(StatusCode::METHOD_NOT_ALLOWED);
    Ok(())
}
