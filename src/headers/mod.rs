//! Security response headers.
//!
//! # Responsibilities
//! - Compute the per-response security header set from configuration
//! - Generate the per-response CSP nonce
//!
//! # Design Decisions
//! - Headers are computed fresh per response; the nonce placeholder in
//!   CSP directive values is substituted once, after directive assembly
//! - HSTS is only meaningful over HTTPS, so it is omitted on plain HTTP
//! - Nonces come from the OS CSPRNG

use axum::http::header::{
    HeaderName, HeaderValue, InvalidHeaderValue, CONTENT_SECURITY_POLICY,
    CONTENT_SECURITY_POLICY_REPORT_ONLY, STRICT_TRANSPORT_SECURITY, X_CONTENT_TYPE_OPTIONS,
    X_FRAME_OPTIONS, X_XSS_PROTECTION,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::config::schema::{ScaffoldConfig, NONCE_PLACEHOLDER};

/// Compute the ordered security header set for one response.
pub fn compute_headers(
    config: &ScaffoldConfig,
    request_is_https: bool,
    nonce: &str,
) -> Result<Vec<(HeaderName, HeaderValue)>, InvalidHeaderValue> {
    let mut headers = Vec::new();

    if let Some(value) = config.framing_policy.header_value() {
        headers.push((X_FRAME_OPTIONS, HeaderValue::from_static(value)));
    }

    if request_is_https {
        if let Some(hsts) = &config.hsts {
            let subdomains = if hsts.include_subdomains {
                "; includeSubdomains"
            } else {
                ""
            };
            let value = format!("max-age={}{}", hsts.max_age_secs, subdomains);
            headers.push((STRICT_TRANSPORT_SECURITY, HeaderValue::from_str(&value)?));
        }
    }

    headers.push((X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block")));
    headers.push((X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")));

    let name = if config.csp.report_only {
        CONTENT_SECURITY_POLICY_REPORT_ONLY
    } else {
        CONTENT_SECURITY_POLICY
    };
    let directives: Vec<String> = config
        .csp
        .directives
        .iter()
        .map(|(k, v)| format!("{k} {v}"))
        .collect();
    // Substitute the per-response nonce after directive assembly.
    let csp = directives.join("; ").replace(NONCE_PLACEHOLDER, nonce);
    headers.push((name, HeaderValue::from_str(&csp)?));

    Ok(headers)
}

/// Generate a CSP nonce: `len` characters of base64 from twice as many
/// random bytes, truncated to the display length.
pub fn generate_nonce(len: usize) -> String {
    let mut bytes = vec![0u8; len * 2];
    OsRng.fill_bytes(&mut bytes);
    let mut encoded = BASE64.encode(&bytes);
    encoded.truncate(len);
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{CspPolicy, FramingPolicy, HstsPolicy};

    fn value_of<'a>(
        headers: &'a [(HeaderName, HeaderValue)],
        name: &str,
    ) -> Option<&'a HeaderValue> {
        headers.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    #[test]
    fn test_always_emits_hardening_headers() {
        let headers = compute_headers(&ScaffoldConfig::default(), false, "abc").unwrap();
        assert_eq!(
            value_of(&headers, "x-xss-protection").unwrap(),
            "1; mode=block"
        );
        assert_eq!(
            value_of(&headers, "x-content-type-options").unwrap(),
            "nosniff"
        );
    }

    #[test]
    fn test_frame_options_permit_emits_nothing() {
        let config = ScaffoldConfig {
            framing_policy: FramingPolicy::Permit,
            ..ScaffoldConfig::default()
        };
        let headers = compute_headers(&config, false, "abc").unwrap();
        assert!(value_of(&headers, "x-frame-options").is_none());

        let config = ScaffoldConfig {
            framing_policy: FramingPolicy::SameOrigin,
            ..ScaffoldConfig::default()
        };
        let headers = compute_headers(&config, false, "abc").unwrap();
        assert_eq!(value_of(&headers, "x-frame-options").unwrap(), "SAMEORIGIN");
    }

    #[test]
    fn test_hsts_requires_https() {
        let config = ScaffoldConfig {
            hsts: Some(HstsPolicy {
                max_age_secs: 3600,
                include_subdomains: false,
            }),
            ..ScaffoldConfig::default()
        };
        let http = compute_headers(&config, false, "abc").unwrap();
        assert!(value_of(&http, "strict-transport-security").is_none());

        let https = compute_headers(&config, true, "abc").unwrap();
        assert_eq!(
            value_of(&https, "strict-transport-security").unwrap(),
            "max-age=3600"
        );
    }

    #[test]
    fn test_hsts_subdomain_suffix() {
        let config = ScaffoldConfig::default();
        let headers = compute_headers(&config, true, "abc").unwrap();
        assert_eq!(
            value_of(&headers, "strict-transport-security").unwrap(),
            "max-age=2592000; includeSubdomains"
        );
    }

    #[test]
    fn test_csp_nonce_substitution() {
        let headers = compute_headers(&ScaffoldConfig::default(), false, "NONCE123").unwrap();
        let csp = value_of(&headers, "content-security-policy")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(csp.contains("'nonce-NONCE123'"));
        assert!(!csp.contains(NONCE_PLACEHOLDER));
        assert!(csp.contains("object-src 'none'"));
    }

    #[test]
    fn test_csp_report_only_switches_header_name() {
        let config = ScaffoldConfig {
            csp: CspPolicy {
                report_only: true,
                ..CspPolicy::default()
            },
            ..ScaffoldConfig::default()
        };
        let headers = compute_headers(&config, false, "abc").unwrap();
        assert!(value_of(&headers, "content-security-policy").is_none());
        assert!(value_of(&headers, "content-security-policy-report-only").is_some());
    }

    #[test]
    fn test_nonce_shape() {
        let nonce = generate_nonce(10);
        assert_eq!(nonce.len(), 10);
        // Base64 alphabet only.
        assert!(nonce
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/'));
        // Two draws should essentially never collide.
        assert_ne!(generate_nonce(10), generate_nonce(10));
    }
}
