//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ScaffoldConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ScaffoldConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ScaffoldConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Semantic checks beyond what serde enforces.
pub fn validate_config(config: &ScaffoldConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.nonce_length == 0 {
        errors.push("nonce_length must be nonzero".to_string());
    }
    if config.xsrf_max_age_secs == 0 {
        errors.push("xsrf_max_age_secs must be nonzero".to_string());
    }
    if let Some(hsts) = &config.hsts {
        if hsts.max_age_secs == 0 {
            errors.push("hsts.max_age_secs must be nonzero".to_string());
        }
    }
    for (name, value) in &config.csp.directives {
        if name.is_empty() {
            errors.push("csp directive with empty name".to_string());
        }
        if value.chars().any(|c| c == ';' || c.is_control()) {
            errors.push(format!(
                "csp directive {name} contains ';' or control characters"
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
