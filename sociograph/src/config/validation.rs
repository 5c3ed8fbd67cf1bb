//! Configuration validation utilities.
//!
//! This module provides validation functions for configuration values.

use super::ConfigError;
use super::models::*;

/// Validate the entire configuration.
pub fn validate_config(config: &SociographConfig) -> Result<(), ConfigError> {
    validate_relationship_config(&config.relationships)?;
    validate_inbox_config(&config.inbox)?;
    validate_fanout_config(&config.fanout)?;
    validate_request_config(&config.requests)?;

    Ok(())
}

fn validate_relationship_config(config: &RelationshipConfig) -> Result<(), ConfigError> {
    if config.default_query_limit == 0 || config.max_query_limit == 0 {
        return Err(ConfigError::ValidationError(
            "Relationship query limits must be greater than 0".to_string(),
        ));
    }

    if config.default_query_limit > config.max_query_limit {
        return Err(ConfigError::ValidationError(format!(
            "default_query_limit ({}) cannot exceed max_query_limit ({})",
            config.default_query_limit, config.max_query_limit
        )));
    }

    if config.default_mutual_limit == 0 {
        return Err(ConfigError::ValidationError(
            "default_mutual_limit must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_inbox_config(config: &InboxConfig) -> Result<(), ConfigError> {
    if config.default_page_size == 0 || config.max_page_size == 0 {
        return Err(ConfigError::ValidationError(
            "Inbox page sizes must be greater than 0".to_string(),
        ));
    }

    if config.default_page_size > config.max_page_size {
        return Err(ConfigError::ValidationError(format!(
            "default_page_size ({}) cannot exceed max_page_size ({})",
            config.default_page_size, config.max_page_size
        )));
    }

    Ok(())
}

fn validate_fanout_config(config: &FanoutConfig) -> Result<(), ConfigError> {
    if config.max_concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "Fan-out max_concurrency must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_request_config(config: &RequestConfig) -> Result<(), ConfigError> {
    if config.notification_type_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Request notification_type_key cannot be empty".to_string(),
        ));
    }

    Ok(())
}
