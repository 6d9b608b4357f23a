//! Security-hardening scaffold for axum-based web applications.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌────────────────────────────────────────────┐
//!                      │              SECURE SCAFFOLD               │
//!                      │                                            │
//!     Request ─────────┼─▶ trusted-origin gate (Cron/Task)          │
//!                      │        │                                   │
//!                      │        ▼                                   │
//!                      │   security headers (CSP nonce, HSTS,       │
//!                      │   frame options, nosniff, XSS filter)      │
//!                      │        │                                   │
//!                      │        ▼                                   │
//!                      │   auth gate ──────▶ deny_access()          │
//!                      │        │                                   │
//!                      │        ▼                                   │
//!                      │   XSRF gate ──────▶ xsrf_fail()            │
//!                      │        │                                   │
//!                      │        ▼                                   │
//!     Response ◀───────┼── output lockdown ◀── verb method          │
//!                      │   (render / render_json only)              │
//!                      │                                            │
//!                      │  ┌──────────────────────────────────────┐  │
//!                      │  │         Cross-Cutting Concerns       │  │
//!                      │  │  config   xsrf keys   observability  │  │
//!                      │  │  safety (JSON/cookies)   rendering   │  │
//!                      │  └──────────────────────────────────────┘  │
//!                      └────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod headers;
pub mod pipeline;
pub mod xsrf;

// Cross-cutting concerns
pub mod error;
pub mod observability;
pub mod render;
pub mod safety;

pub use config::{load_config, ScaffoldConfig};
pub use error::SecurityError;
pub use pipeline::{
    scaffold_router, DispatchPipeline, HandlerDescriptor, HandlerVariant, Identity,
    IdentityResolver, ResponseSink, ScaffoldState, SecureHandler,
};
pub use render::TemplateBackend;
pub use xsrf::{KeyProvider, KeyStore, MemoryKeyStore};
