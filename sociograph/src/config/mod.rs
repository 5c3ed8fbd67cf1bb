//! Engine configuration.
//!
//! [`SociographConfig`] has one section per concern:
//!
//! - `relationships`: default and maximum edge query limits, default mutual limit
//! - `inbox`: default and maximum inbox page size
//! - `fanout`: delivery concurrency, whether the actor is notified of their
//!   own activity, and whether items are threaded by first target
//! - `requests`: type key carried by follow-request inbox items
//! - `logging`: level, format and output of the tracing subscriber
//!
//! [`ConfigLoader`] layers defaults, the first of [`DEFAULT_CONFIG_FILES`]
//! found, a `config.*` file in the user config directory, then `SOCIOGRAPH_`
//! variables with `__` between section and key. [`ConfigBuilder`] builds the same struct in code. Both
//! run [`validate_config`] before handing a config out.

mod builder;
mod loader;
mod models;
mod validation;

pub use builder::ConfigBuilder;
pub use loader::ConfigLoader;
pub use models::*;
pub use validation::validate_config;

/// Searched in order relative to the working directory; the first readable one wins
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "sociograph.toml",
    "sociograph.yaml",
    "sociograph.yml",
    "sociograph.json",
    ".sociograph/config.toml",
    ".sociograph/config.yaml",
    ".sociograph/config.yml",
    ".sociograph/config.json",
];

/// Prefix of environment overrides, e.g. `SOCIOGRAPH_INBOX__MAX_PAGE_SIZE=200`
pub const ENV_PREFIX: &str = "SOCIOGRAPH_";

/// Why a configuration could not be produced
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Missing file or unsupported extension
    #[error("Failed to load configuration file: {0}")]
    FileLoadError(String),

    /// A limit or key failed validation, e.g. a default page size above its maximum
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// A source could not be deserialized into [`SociographConfig`]
    #[error("Configuration parsing error: {0}")]
    ParseError(String),
}

/// Result of loading or building a configuration
pub type Result<T> = std::result::Result<T, ConfigError>;
