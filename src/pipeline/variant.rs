//! Handler variants and the gates they imply.

use axum::http::Method;

/// Trusted-origin header name for Cron handlers. The hosting platform
/// strips it from external requests, so its presence proves a scheduled
/// invocation (or an administrator's crafted request).
pub const CRON_ORIGIN_HEADER: &str = "X-AppEngine-Cron";

/// Trusted-origin header name for Task handlers.
pub const TASK_ORIGIN_HEADER: &str = "X-AppEngine-QueueName";

/// XSRF token header checked by page handler variants.
pub const XSRF_HEADER_PAGE: &str = "X-XSRF-TOKEN";

/// XSRF token header checked by AJAX handler variants.
pub const XSRF_HEADER_AJAX: &str = "X-XSRF-Token";

/// Verbs exempt from XSRF validation: they must not change state.
pub const SAFE_VERBS: [Method; 3] = [Method::GET, Method::HEAD, Method::OPTIONS];

/// Trusted-origin requirement for restricted-context variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustedOrigin {
    /// Header must be present with the literal value `true`.
    CronHeader,
    /// Header must be present with any non-empty value.
    TaskHeader,
}

impl TrustedOrigin {
    pub fn header_name(self) -> &'static str {
        match self {
            TrustedOrigin::CronHeader => CRON_ORIGIN_HEADER,
            TrustedOrigin::TaskHeader => TASK_ORIGIN_HEADER,
        }
    }

    /// Whether `value` (the header value, or `None` when absent)
    /// satisfies this requirement.
    pub fn accepts(self, value: Option<&str>) -> bool {
        match self {
            TrustedOrigin::CronHeader => value == Some("true"),
            TrustedOrigin::TaskHeader => value.is_some_and(|v| !v.is_empty()),
        }
    }
}

/// The eight built-in handler kinds. Each implies a fixed set of gates;
/// concrete handlers pick a variant instead of overriding pipeline
/// behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerVariant {
    /// Unauthenticated page handler.
    Page,
    /// Unauthenticated AJAX handler: JSON output, XSSI prefix on GET.
    Ajax,
    /// Scheduled-job handler gated on [`CRON_ORIGIN_HEADER`].
    Cron,
    /// Task-queue handler gated on [`TASK_ORIGIN_HEADER`].
    Task,
    /// Page handler requiring a signed-in user and XSRF proof.
    Authenticated,
    /// AJAX handler requiring a signed-in user and XSRF proof.
    AuthenticatedAjax,
    /// Page handler requiring an administrator.
    Admin,
    /// AJAX handler requiring an administrator.
    AdminAjax,
}

impl HandlerVariant {
    pub fn name(self) -> &'static str {
        match self {
            HandlerVariant::Page => "PageHandler",
            HandlerVariant::Ajax => "AjaxHandler",
            HandlerVariant::Cron => "CronHandler",
            HandlerVariant::Task => "TaskHandler",
            HandlerVariant::Authenticated => "AuthenticatedHandler",
            HandlerVariant::AuthenticatedAjax => "AuthenticatedAjaxHandler",
            HandlerVariant::Admin => "AdminHandler",
            HandlerVariant::AdminAjax => "AdminAjaxHandler",
        }
    }

    pub(crate) fn requires_auth(self) -> bool {
        matches!(
            self,
            HandlerVariant::Authenticated
                | HandlerVariant::AuthenticatedAjax
                | HandlerVariant::Admin
                | HandlerVariant::AdminAjax
        )
    }

    pub(crate) fn requires_admin(self) -> bool {
        matches!(self, HandlerVariant::Admin | HandlerVariant::AdminAjax)
    }

    pub(crate) fn xsrf_protected(self) -> bool {
        self.requires_auth()
    }

    pub(crate) fn is_ajax(self) -> bool {
        matches!(
            self,
            HandlerVariant::Ajax | HandlerVariant::AuthenticatedAjax | HandlerVariant::AdminAjax
        )
    }

    pub(crate) fn trusted_origin(self) -> Option<TrustedOrigin> {
        match self {
            HandlerVariant::Cron => Some(TrustedOrigin::CronHeader),
            HandlerVariant::Task => Some(TrustedOrigin::TaskHeader),
            _ => None,
        }
    }

    /// Header the XSRF gate reads for this variant.
    pub(crate) fn xsrf_header(self) -> &'static str {
        if self.is_ajax() {
            XSRF_HEADER_AJAX
        } else {
            XSRF_HEADER_PAGE
        }
    }
}

/// Whether `method` is exempt from XSRF validation.
pub(crate) fn is_safe_verb(method: &Method) -> bool {
    SAFE_VERBS.contains(method)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_gate_flags() {
        assert!(!HandlerVariant::Page.requires_auth());
        assert!(!HandlerVariant::Cron.requires_auth());
        assert!(HandlerVariant::Authenticated.requires_auth());
        assert!(HandlerVariant::AdminAjax.requires_auth());
        assert!(HandlerVariant::Admin.requires_admin());
        assert!(!HandlerVariant::Authenticated.requires_admin());
        assert!(HandlerVariant::AuthenticatedAjax.is_ajax());
        assert!(!HandlerVariant::Task.is_ajax());
    }

    #[test]
    fn test_trusted_origin_semantics() {
        let cron = TrustedOrigin::CronHeader;
        assert!(cron.accepts(Some("true")));
        assert!(!cron.accepts(Some("false")));
        assert!(!cron.accepts(Some("TRUE")));
        assert!(!cron.accepts(None));

        let task = TrustedOrigin::TaskHeader;
        assert!(task.accepts(Some("default-queue")));
        assert!(!task.accepts(Some("")));
        assert!(!task.accepts(None));
    }

    #[test]
    fn test_safe_verbs() {
        assert!(is_safe_verb(&Method::GET));
        assert!(is_safe_verb(&Method::HEAD));
        assert!(is_safe_verb(&Method::OPTIONS));
        assert!(!is_safe_verb(&Method::POST));
        assert!(!is_safe_verb(&Method::DELETE));
    }
}
