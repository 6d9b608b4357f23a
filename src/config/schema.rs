//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! scaffold. All types derive Serde traits for deserialization from
//! config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Placeholder substituted with a fresh nonce once per response.
pub const NONCE_PLACEHOLDER: &str = "{nonce}";

/// Default CSP nonce display length.
pub const DEFAULT_NONCE_LENGTH: usize = 10;

/// Root configuration for the scaffold.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScaffoldConfig {
    /// X-Frame-Options policy.
    pub framing_policy: FramingPolicy,

    /// Strict-Transport-Security policy; `None` disables the header.
    pub hsts: Option<HstsPolicy>,

    /// Content-Security-Policy directives.
    pub csp: CspPolicy,

    /// Display length of the per-response CSP nonce.
    pub nonce_length: usize,

    /// Local development mode: relaxes the Secure cookie flag, which
    /// cannot be satisfied without HTTPS.
    pub dev_mode: bool,

    /// Single-page-app mode: exposes the XSRF token as a JS-readable
    /// cookie and strips the surrounding quotes some frontend HTTP
    /// clients add around the token header.
    pub spa_mode: bool,

    /// Maximum accepted XSRF token age in seconds.
    pub xsrf_max_age_secs: u64,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            framing_policy: FramingPolicy::Deny,
            hsts: Some(HstsPolicy::default()),
            csp: CspPolicy::default(),
            nonce_length: DEFAULT_NONCE_LENGTH,
            dev_mode: false,
            spa_mode: false,
            xsrf_max_age_secs: crate::xsrf::DEFAULT_MAX_AGE_SECS,
        }
    }
}

/// Framing (clickjacking) policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FramingPolicy {
    /// Emit `X-Frame-Options: DENY`.
    #[default]
    Deny,
    /// Emit `X-Frame-Options: SAMEORIGIN`.
    SameOrigin,
    /// Emit no frame-options header.
    Permit,
}

impl FramingPolicy {
    /// Header value for this policy, or `None` for [`FramingPolicy::Permit`].
    pub fn header_value(self) -> Option<&'static str> {
        match self {
            FramingPolicy::Deny => Some("DENY"),
            FramingPolicy::SameOrigin => Some("SAMEORIGIN"),
            FramingPolicy::Permit => None,
        }
    }
}

/// Strict-Transport-Security policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HstsPolicy {
    /// `max-age` in seconds.
    pub max_age_secs: u64,

    /// Append `; includeSubdomains`.
    pub include_subdomains: bool,
}

impl Default for HstsPolicy {
    fn default() -> Self {
        Self {
            max_age_secs: 2_592_000,
            include_subdomains: true,
        }
    }
}

/// Content-Security-Policy directives.
///
/// Directive values may embed [`NONCE_PLACEHOLDER`], substituted with
/// the per-response nonce after directive assembly.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CspPolicy {
    /// Emit `Content-Security-Policy-Report-Only` instead of the
    /// enforcing header.
    pub report_only: bool,

    /// Directive name to directive value.
    pub directives: BTreeMap<String, String>,
}

impl Default for CspPolicy {
    fn default() -> Self {
        let mut directives = BTreeMap::new();
        // Disallow Flash, etc.
        directives.insert("object-src".to_string(), "'none'".to_string());
        // Strict CSP with fallbacks for browsers not supporting CSP v3:
        // unsafe-inline is ignored in presence of a nonce, https:/http:
        // in presence of strict-dynamic.
        directives.insert(
            "script-src".to_string(),
            format!("'nonce-{NONCE_PLACEHOLDER}' 'strict-dynamic' 'unsafe-inline' https: http:"),
        );
        directives.insert("report-uri".to_string(), "/csp".to_string());
        Self {
            report_only: false,
            directives,
        }
    }
}
