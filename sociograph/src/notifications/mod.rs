//! Notification Fan-out Engine
//!
//! Turns published activities into inbox items for interested recipients and
//! drives the follow-request approval workflow. Delivery goes through the
//! inbox store's dedup and thread rules, so retried fan-outs and repeated
//! requests are safe.

mod fanout;
mod requests;

pub use fanout::FanoutReport;

use crate::config::{FanoutConfig, InboxConfig, RequestConfig, SociographConfig};
use crate::governance::GovernancePolicy;
use crate::ids::IdGenerator;
use crate::relationships::RelationshipEngine;
use crate::storage::InboxStore;
use std::sync::Arc;

/// Fan-out, inbox and follow-request operations.
///
/// Cheap to clone; every clone shares the same collaborators.
#[derive(Debug, Clone)]
pub struct NotificationEngine {
    relationships: RelationshipEngine,
    inbox: Arc<dyn InboxStore>,
    governance: Arc<dyn GovernancePolicy>,
    ids: Arc<dyn IdGenerator>,
    inbox_config: InboxConfig,
    fanout_config: FanoutConfig,
    request_config: RequestConfig,
}

impl NotificationEngine {
    pub fn new(
        relationships: RelationshipEngine,
        inbox: Arc<dyn InboxStore>,
        governance: Arc<dyn GovernancePolicy>,
        ids: Arc<dyn IdGenerator>,
        config: &SociographConfig,
    ) -> Self {
        Self {
            relationships,
            inbox,
            governance,
            ids,
            inbox_config: config.inbox.clone(),
            fanout_config: config.fanout.clone(),
            request_config: config.requests.clone(),
        }
    }

    /// The relationship engine used for recipient resolution and edge creation
    pub fn relationships(&self) -> &RelationshipEngine {
        &self.relationships
    }

    /// The underlying inbox store
    pub fn inbox_store(&self) -> &Arc<dyn InboxStore> {
        &self.inbox
    }
}
