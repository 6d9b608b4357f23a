//! Cookie construction with hardened defaults.

use axum::http::header::{HeaderValue, InvalidHeaderValue};

/// Builder for a `Set-Cookie` value with `HttpOnly` on by default and
/// `Secure` on by default outside local development mode.
///
/// Names and values are expected to be cookie-token-safe; callers
/// setting arbitrary values should encode them first.
#[derive(Debug, Clone)]
pub struct SecureCookie {
    name: String,
    value: String,
    path: String,
    http_only: bool,
    secure: bool,
}

impl SecureCookie {
    /// Create a cookie with hardened defaults. `dev_mode` disables the
    /// `Secure` flag, which cannot be satisfied without HTTPS.
    pub fn new(name: impl Into<String>, value: impl Into<String>, dev_mode: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: "/".to_string(),
            http_only: true,
            secure: !dev_mode,
        }
    }

    /// Override the HttpOnly flag. Turning this off makes the cookie
    /// readable from JavaScript; only do that for values meant for the
    /// frontend, like the XSRF token cookie.
    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Override the Secure flag.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Override the cookie path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Serialize to a `Set-Cookie` header value.
    pub fn to_header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut out = format!("{}={}; Path={}", self.name, self.value, self.path);
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        if self.secure {
            out.push_str("; Secure");
        }
        HeaderValue::from_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_force_flags() {
        let value = SecureCookie::new("session", "abc", false)
            .to_header_value()
            .unwrap();
        assert_eq!(value, "session=abc; Path=/; HttpOnly; Secure");
    }

    #[test]
    fn test_dev_mode_drops_secure() {
        let value = SecureCookie::new("session", "abc", true)
            .to_header_value()
            .unwrap();
        assert_eq!(value, "session=abc; Path=/; HttpOnly");
    }

    #[test]
    fn test_js_readable_opt_out() {
        let value = SecureCookie::new("XSRF-TOKEN", "tok", false)
            .http_only(false)
            .to_header_value()
            .unwrap();
        assert_eq!(value, "XSRF-TOKEN=tok; Path=/; Secure");
    }
}
