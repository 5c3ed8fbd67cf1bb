//! Host-supplied governance rules
//!
//! The fan-out engine asks a [`GovernancePolicy`] whether an entity may be
//! targeted by a relationship request, whether a request needs approval,
//! and who approves it.

mod policies;

pub use policies::{AllowAllPolicy, StaticPolicy};

use crate::Result;
use crate::models::{EntityRef, RelationshipKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// Rules about targeting and approval
#[async_trait]
pub trait GovernancePolicy: Send + Sync + Debug {
    /// Whether `entity` may be the target of a relationship request
    async fn is_targetable(&self, tenant_id: &str, entity: &EntityRef) -> Result<bool>;

    /// Whether `requester` needs approval before holding a `kind` edge to `target`
    async fn requires_approval_to_follow(
        &self,
        tenant_id: &str,
        requester: &EntityRef,
        target: &EntityRef,
        kind: RelationshipKind,
    ) -> Result<bool>;

    /// Entities allowed to approve requests addressed to `target`
    async fn get_approvers(&self, tenant_id: &str, target: &EntityRef) -> Result<Vec<EntityRef>>;
}

/// Machine-readable reason carried by a policy violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyReason {
    NotTargetable,
    ApprovalRequired,
    Other(String),
}

impl PolicyReason {
    /// Stable code for callers to branch on
    pub fn as_code(&self) -> &str {
        match self {
            PolicyReason::NotTargetable => "NOT_TARGETABLE",
            PolicyReason::ApprovalRequired => "APPROVAL_REQUIRED",
            PolicyReason::Other(code) => code,
        }
    }
}

impl fmt::Display for PolicyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}
