//! Configuration builder.
//!
//! This module provides a builder pattern API for creating configurations.

use super::{Result, models::*, validation};
use std::path::Path;

/// Builder for creating SociographConfig instances.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: SociographConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self {
            config: SociographConfig::default(),
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: SociographConfig) -> Self {
        Self { config }
    }

    /// Set the default edge query limit.
    pub fn with_default_query_limit(mut self, limit: usize) -> Self {
        self.config.relationships.default_query_limit = limit;
        self
    }

    /// Set the hard ceiling on edge query limits.
    pub fn with_max_query_limit(mut self, limit: usize) -> Self {
        self.config.relationships.max_query_limit = limit;
        self
    }

    /// Set the default mutual-relationship limit.
    pub fn with_default_mutual_limit(mut self, limit: usize) -> Self {
        self.config.relationships.default_mutual_limit = limit;
        self
    }

    /// Set inbox page sizes.
    pub fn with_page_sizes(mut self, default_page_size: usize, max_page_size: usize) -> Self {
        self.config.inbox.default_page_size = default_page_size;
        self.config.inbox.max_page_size = max_page_size;
        self
    }

    /// Set how many recipients are delivered to concurrently.
    pub fn with_fanout_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.fanout.max_concurrency = max_concurrency;
        self
    }

    /// Deliver notifications to the actor of an activity as well.
    pub fn with_actor_notifications(mut self, notify_actor: bool) -> Self {
        self.config.fanout.notify_actor = notify_actor;
        self
    }

    /// Enable or disable grouping notifications into threads by target.
    pub fn with_thread_by_target(mut self, enabled: bool) -> Self {
        self.config.fanout.thread_by_target = enabled;
        self
    }

    /// Set the event kind stamped on follow-request inbox items.
    pub fn with_request_type_key(mut self, type_key: impl Into<String>) -> Self {
        self.config.requests.notification_type_key = type_key.into();
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set the log format.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Configure logging to a file.
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use default logging configuration (console output at Info level)
    pub fn with_default_logging(mut self) -> Self {
        self.config.logging.level = LogLevel::Info;
        self.config.logging.format = LogFormat::Json;
        self.config.logging.file = None; // Console only by default

        self
    }

    /// Create a configuration for development with debug logging.
    pub fn development() -> Self {
        Self::new()
            .with_log_level(LogLevel::Debug)
            .with_log_format(LogFormat::Pretty)
    }

    /// Create a configuration for testing.
    ///
    /// Fan-out runs one delivery at a time so test output is deterministic.
    pub fn testing() -> Self {
        Self::development().with_fanout_concurrency(1)
    }

    /// Create a production-ready configuration with JSON logging.
    pub fn production() -> Self {
        Self::new().with_default_logging()
    }

    /// Build the configuration, validating it in the process.
    pub fn build(self) -> Result<SociographConfig> {
        validation::validate_config(&self.config)?;

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
