//! Registration-time check against pipeline-method overrides.
//!
//! # Responsibilities
//! - Reject handler registrations whose type declares a method name
//!   reserved for the pipeline
//!
//! # Design Decisions
//! - Runs exactly once, when a handler is registered, never per request
//! - The whitelist matches on bare type names; a deliberately colliding
//!   name in another module can bypass it, same as the discipline this
//!   check approximates

use crate::error::SecurityError;
use crate::pipeline::variant::HandlerVariant;

/// Method names reserved for the pipeline. A registering handler type
/// declaring any of these fails registration.
pub const RESTRICTED_METHODS: [&str; 2] = ["dispatch", "request_contains_valid_xsrf_token"];

/// Type names allowed to carry restricted methods: the built-in handler
/// variants themselves.
const TRUSTED_TYPE_NAMES: [&str; 8] = [
    "PageHandler",
    "AjaxHandler",
    "CronHandler",
    "TaskHandler",
    "AuthenticatedHandler",
    "AuthenticatedAjaxHandler",
    "AdminHandler",
    "AdminAjaxHandler",
];

/// Declared shape of a handler type at registration time: its bare type
/// name and the method names it declares itself (not inherited
/// defaults).
#[derive(Debug, Clone)]
pub struct HandlerDescriptor {
    pub type_name: String,
    pub declared_methods: Vec<String>,
}

impl HandlerDescriptor {
    /// Describe a handler type, listing the methods it declares.
    pub fn of<H: 'static>(declared_methods: &[&str]) -> Self {
        let full = std::any::type_name::<H>();
        let type_name = full.rsplit("::").next().unwrap_or(full).to_string();
        Self {
            type_name,
            declared_methods: declared_methods.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// Check a descriptor against the restricted-method list. Called once
/// per handler at registration; a violation aborts registration.
pub fn check_descriptor(descriptor: &HandlerDescriptor) -> Result<(), SecurityError> {
    if TRUSTED_TYPE_NAMES.contains(&descriptor.type_name.as_str()) {
        return Ok(());
    }
    for method in &descriptor.declared_methods {
        if RESTRICTED_METHODS.contains(&method.as_str()) {
            return Err(SecurityError::RestrictedOverride {
                type_name: descriptor.type_name.clone(),
                method: method.clone(),
            });
        }
    }
    Ok(())
}

impl HandlerVariant {
    /// Descriptor for the built-in variant itself.
    pub(crate) fn descriptor(self) -> HandlerDescriptor {
        HandlerDescriptor {
            type_name: self.name().to_string(),
            declared_methods: RESTRICTED_METHODS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ProfileHandler;
    struct SneakyHandler;

    #[test]
    fn test_accepts_ordinary_handler() {
        let descriptor = HandlerDescriptor::of::<ProfileHandler>(&["get", "post", "deny_access"]);
        assert_eq!(descriptor.type_name, "ProfileHandler");
        assert!(check_descriptor(&descriptor).is_ok());
    }

    #[test]
    fn test_rejects_dispatch_override() {
        let descriptor = HandlerDescriptor::of::<SneakyHandler>(&["get", "dispatch"]);
        let err = check_descriptor(&descriptor).unwrap_err();
        assert!(matches!(err, SecurityError::RestrictedOverride { .. }));
        assert!(err.to_string().contains("SneakyHandler"));
        assert!(err.to_string().contains("dispatch"));
    }

    #[test]
    fn test_rejects_token_extraction_override() {
        let descriptor =
            HandlerDescriptor::of::<SneakyHandler>(&["request_contains_valid_xsrf_token"]);
        assert!(check_descriptor(&descriptor).is_err());
    }

    #[test]
    fn test_whitelisted_base_names_pass() {
        for variant in [
            HandlerVariant::Page,
            HandlerVariant::Ajax,
            HandlerVariant::Cron,
            HandlerVariant::Task,
            HandlerVariant::Authenticated,
            HandlerVariant::AuthenticatedAjax,
            HandlerVariant::Admin,
            HandlerVariant::AdminAjax,
        ] {
            assert!(check_descriptor(&variant.descriptor()).is_ok());
        }
    }
}
