//! Configuration model definitions.
//!
//! This module contains the configuration structures for all Sociograph components.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Main configuration structure for Sociograph.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SociographConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Relationship engine limits
    pub relationships: RelationshipConfig,

    /// Inbox paging limits
    pub inbox: InboxConfig,

    /// Notification fan-out behaviour
    pub fanout: FanoutConfig,

    /// Follow-request workflow settings
    pub requests: RequestConfig,
}

/// Limits applied by the relationship engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RelationshipConfig {
    /// Edge query limit when the caller supplies none
    pub default_query_limit: usize,

    /// Hard ceiling on any edge query limit
    pub max_query_limit: usize,

    /// Mutual-relationship limit when the caller supplies none
    pub default_mutual_limit: usize,
}

impl Default for RelationshipConfig {
    fn default() -> Self {
        Self {
            default_query_limit: 200,
            max_query_limit: 1000,
            default_mutual_limit: 50,
        }
    }
}

/// Inbox paging limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InboxConfig {
    /// Page size when the caller supplies none
    pub default_page_size: usize,

    /// Hard ceiling on page size
    pub max_page_size: usize,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 500,
        }
    }
}

/// Notification fan-out behaviour.
///
/// Deliveries to different recipients are independent and run concurrently,
/// at most `max_concurrency` at a time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FanoutConfig {
    /// Concurrent per-recipient deliveries
    pub max_concurrency: usize,

    /// Deliver to the actor when they follow themselves or their own targets
    pub notify_actor: bool,

    /// Group notifications by `(type_key, first target)` into threads
    pub thread_by_target: bool,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 16,
            notify_actor: false,
            thread_by_target: true,
        }
    }
}

/// Follow-request workflow settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RequestConfig {
    /// Event kind stamped on request items delivered to approvers
    pub notification_type_key: String,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            notification_type_key: "relationship.requested".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,

    /// Log format
    pub format: LogFormat,

    /// File to log to (if any)
    pub file: Option<PathBuf>,

    /// Whether to log to stdout
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Default,
            file: None,
            stdout: true,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level
    Trace,

    /// Debug level
    Debug,

    /// Info level
    Info,

    /// Warn level
    Warn,

    /// Error level
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Default format
    Default,

    /// JSON format
    Json,

    /// Compact format
    Compact,

    /// Pretty format
    Pretty,
}
