//! Anti-forgery (XSRF) token subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound (page render):
//!     keys.rs (shared secret)
//!         → token.rs generate_token(key, user, action)
//!         → embedded in template values / XSRF-TOKEN cookie
//!
//! Inbound (state-changing request):
//!     request parameter or header
//!         → token.rs validate_token(key, user, token)
//!         → pipeline allows or invokes xsrf_fail()
//! ```
//!
//! # Design Decisions
//! - Tokens are stateless: the timestamp is part of the signed message,
//!   so validation recomputes the digest without persisted per-token state
//! - Digest comparison is constant-time to avoid timing side channels
//! - One application-wide key, created lazily and exactly once

pub mod keys;
pub mod token;

pub use keys::{KeyProvider, KeyStore, KeyStoreError, MemoryKeyStore};
pub use token::{constant_time_eq, generate_token, validate_token, DEFAULT_MAX_AGE_SECS};

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
