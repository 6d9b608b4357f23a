//! Secure-by-default API wrappers.
//!
//! # Responsibilities
//! - HTML-safe JSON serialization for content that may land in markup
//! - Cookie construction with Secure/HttpOnly forced on by default
//! - Advisory logging for non-HTTPS outbound fetch URLs
//!
//! # Design Decisions
//! - Safer defaults are explicit values callers pass to library APIs,
//!   not runtime patches of third-party code

pub mod cookie;
pub mod json;

pub use cookie::SecureCookie;
pub use json::html_safe_json;

use url::Url;

/// Why an outbound fetch URL deserves a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchUrlIssue {
    NotHttps,
    Unparseable,
}

fn fetch_url_issue(url: &str) -> Option<FetchUrlIssue> {
    match Url::parse(url) {
        Ok(parsed) if parsed.scheme() != "https" => Some(FetchUrlIssue::NotHttps),
        Ok(_) => None,
        Err(_) => Some(FetchUrlIssue::Unparseable),
    }
}

/// Log a warning when an outbound fetch URL is not HTTPS.
///
/// Call sites fetching remote resources should funnel URLs through this
/// before handing them to an HTTP client.
pub fn warn_if_not_https(url: &str) {
    match fetch_url_issue(url) {
        Some(FetchUrlIssue::NotHttps) => {
            tracing::warn!(url, "SECURITY: fetching non-HTTPS url");
        }
        Some(FetchUrlIssue::Unparseable) => {
            tracing::warn!(url, "SECURITY: unparseable fetch url");
        }
        None => {}
    }
}
