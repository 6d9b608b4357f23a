//! Security dispatch pipeline.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → variant.rs trusted-origin gate (Cron/Task only)
//!     → headers (security header set, per-response CSP nonce)
//!     → auth gate (Authenticated/Admin variants)
//!     → XSRF gate (state-changing verbs only)
//!     → sink.rs output lockdown (render/render_json only)
//!     → handler.rs verb method (business logic)
//! ```
//!
//! # Design Decisions
//! - Stages are a fixed, ordered chain inside one function; ordering is
//!   not an emergent property of registration order
//! - Handlers customize behavior only through verb methods and the
//!   deny_access/xsrf_fail callbacks; guard.rs rejects registrations
//!   that try to claim pipeline method names

pub mod context;
pub mod dispatch;
pub mod guard;
pub mod handler;
pub mod sink;
pub mod variant;

pub use context::{ExtensionIdentityResolver, Identity, IdentityResolver, RequestContext};
pub use dispatch::{scaffold_router, DispatchPipeline, ScaffoldState, XSRF_COOKIE_NAME, XSSI_PREFIX};
pub use guard::{check_descriptor, HandlerDescriptor, RESTRICTED_METHODS};
pub use handler::SecureHandler;
pub use sink::{OutputMode, ResponseSink};
pub use variant::{
    HandlerVariant, TrustedOrigin, CRON_ORIGIN_HEADER, SAFE_VERBS, TASK_ORIGIN_HEADER,
    XSRF_HEADER_AJAX, XSRF_HEADER_PAGE,
};
