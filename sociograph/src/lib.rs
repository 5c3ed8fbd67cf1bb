//! # Sociograph
//!
//! Relationship-graph visibility and notification fan-out for social
//! activity platforms.
//!
//! Two engines share one set of collaborators:
//!
//! - **Relationship Engine**: directed, typed, scoped edges (follow,
//!   subscribe, block, mute, allow, deny) and a priority-ordered decision of
//!   whether a viewer may see an activity.
//! - **Notification Fan-out Engine**: resolves who should hear about a
//!   published activity, re-checks visibility per recipient, writes
//!   deduplicated and threaded inbox items, and runs the follow-request
//!   approval workflow.
//!
//! ## Quick Start
//!
//! ```rust
//! use sociograph::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let graph = init_with_defaults()?;
//!     let alice = EntityRef::user("alice");
//!     let bob = EntityRef::user("bob");
//!
//!     // Bob follows Alice, then mutes her
//!     graph
//!         .relationships()
//!         .upsert(RelationshipEdge::follow("acme", bob.clone(), alice.clone()))
//!         .await?;
//!     graph
//!         .relationships()
//!         .upsert(RelationshipEdge::mute("acme", bob.clone(), alice.clone()))
//!         .await?;
//!
//!     let post = Activity::builder("acme", "post.created", alice).build();
//!     let decision = graph.relationships().can_see("acme", &bob, &post).await?;
//!     assert_eq!(decision.kind, DecisionKind::Hidden);
//!
//!     // Muted followers get no inbox item
//!     let report = graph.notifications().on_activity_published(&post).await?;
//!     assert_eq!(report.suppressed, 1);
//!     Ok(())
//! }
//! ```
//!
//! ## Collaborators
//!
//! Persistence and policy are pluggable: implement
//! [`storage::RelationshipStore`], [`storage::InboxStore`] and
//! [`governance::GovernancePolicy`], then wire them in with
//! [`Sociograph::builder`]. The in-memory stores honour the same atomicity
//! contracts and back the defaults.

pub mod config;
pub mod governance;
pub mod ids;
pub mod logging;
pub mod models;
pub mod notifications;
pub mod relationships;
pub mod simple;
pub mod storage;
pub mod validation;

pub use governance::PolicyReason;
pub use simple::{Sociograph, SociographBuilder};
pub use validation::{FieldError, ValidationErrors};

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    pub use crate::simple::{Sociograph, SociographBuilder};

    pub use crate::{init, init_with_defaults};

    pub use crate::config::{ConfigBuilder, ConfigLoader, LogLevel, SociographConfig};

    pub use crate::models::{
        Activity, DecisionKind, DecisionReason, EntityRef, FollowRequest, InboxItem,
        InboxItemKind, InboxStatus, NewFollowRequest, RelationshipDecision, RelationshipEdge,
        RelationshipFilter, RelationshipKind, RelationshipScope, RequestStatus, Visibility,
    };

    pub use crate::governance::{AllowAllPolicy, GovernancePolicy, PolicyReason, StaticPolicy};
    pub use crate::notifications::{FanoutReport, NotificationEngine};
    pub use crate::relationships::RelationshipEngine;

    pub use crate::storage::{EdgeQuery, InboxPage, InboxQuery, StorageError};

    pub use crate::{Result, SociographError};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for Sociograph operations
#[derive(Debug, thiserror::Error)]
pub enum SociographError {
    /// One or more request fields were missing or malformed
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The governance policy rejected the request
    #[error("Policy violation ({reason}): {message}")]
    PolicyViolation {
        reason: PolicyReason,
        message: String,
    },

    /// The operation does not apply to the record's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Error during storage operations
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LogError),
}

impl SociographError {
    /// Reason code of a policy violation
    pub fn policy_reason(&self) -> Option<&PolicyReason> {
        match self {
            SociographError::PolicyViolation { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

impl From<crate::config::ConfigError> for SociographError {
    fn from(err: crate::config::ConfigError) -> Self {
        SociographError::Configuration(err.to_string())
    }
}

/// Result type for Sociograph operations
pub type Result<T> = std::result::Result<T, SociographError>;

/// Initialize Sociograph with default configuration
///
/// In-memory stores, the allow-all governance policy and UUIDv7 ids.
pub fn init_with_defaults() -> Result<Sociograph> {
    let config = config::ConfigBuilder::new().build()?;
    init(config)
}

/// Initialize Sociograph with the provided configuration
///
/// Installs the log subscriber described by `config.logging` (unless one is
/// already installed) and wires in-memory collaborators.
///
/// # Examples
///
/// ```rust
/// use sociograph::prelude::*;
///
/// fn example() -> Result<()> {
///     let config = ConfigBuilder::production()
///         .with_fanout_concurrency(32)
///         .build()?;
///     let graph = init(config)?;
///     assert_eq!(graph.config().fanout.max_concurrency, 32);
///     Ok(())
/// }
/// ```
pub fn init(config: config::SociographConfig) -> Result<Sociograph> {
    Sociograph::builder().with_config(config).with_logging().build()
}
