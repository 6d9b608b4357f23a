//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs validate_config (semantic checks)
//!     → ScaffoldConfig (validated, immutable)
//!     → shared via Arc to the dispatch pipeline
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; it is read-only per request
//! - All fields have defaults matching the strict security posture
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;

pub use loader::{load_config, validate_config, ConfigError};
pub use schema::{CspPolicy, FramingPolicy, HstsPolicy, ScaffoldConfig};
