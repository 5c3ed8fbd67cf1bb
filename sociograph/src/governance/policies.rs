//! Built-in governance policies

use super::GovernancePolicy;
use crate::Result;
use crate::models::{EntityRef, RelationshipKind};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// Everything is targetable, nothing needs approval, a target approves its
/// own requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAllPolicy;

#[async_trait]
impl GovernancePolicy for AllowAllPolicy {
    async fn is_targetable(&self, _tenant_id: &str, _entity: &EntityRef) -> Result<bool> {
        Ok(true)
    }

    async fn requires_approval_to_follow(
        &self,
        _tenant_id: &str,
        _requester: &EntityRef,
        _target: &EntityRef,
        _kind: RelationshipKind,
    ) -> Result<bool> {
        Ok(false)
    }

    async fn get_approvers(&self, _tenant_id: &str, target: &EntityRef) -> Result<Vec<EntityRef>> {
        Ok(vec![target.clone()])
    }
}

/// Fixed rule sets, configured up front.
///
/// Entities are compared by `(kind, type, id)` across all tenants. Targets
/// without an explicit approver list approve their own requests.
#[derive(Debug, Default, Clone)]
pub struct StaticPolicy {
    not_targetable: HashSet<EntityRef>,
    approval_required: HashSet<EntityRef>,
    approvers: HashMap<EntityRef, Vec<EntityRef>>,
}

impl StaticPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every request addressed to `entity`
    pub fn not_targetable(mut self, entity: EntityRef) -> Self {
        self.not_targetable.insert(entity);
        self
    }

    /// Require approval for every request addressed to `target` (a private account)
    pub fn require_approval(mut self, target: EntityRef) -> Self {
        self.approval_required.insert(target);
        self
    }

    /// Route approval of requests addressed to `target` to `approvers`
    pub fn with_approvers(mut self, target: EntityRef, approvers: Vec<EntityRef>) -> Self {
        self.approvers.insert(target, approvers);
        self
    }
}

#[async_trait]
impl GovernancePolicy for StaticPolicy {
    async fn is_targetable(&self, _tenant_id: &str, entity: &EntityRef) -> Result<bool> {
        Ok(!self.not_targetable.contains(entity))
    }

    async fn requires_approval_to_follow(
        &self,
        _tenant_id: &str,
        _requester: &EntityRef,
        target: &EntityRef,
        _kind: RelationshipKind,
    ) -> Result<bool> {
        Ok(self.approval_required.contains(target))
    }

    async fn get_approvers(&self, _tenant_id: &str, target: &EntityRef) -> Result<Vec<EntityRef>> {
        Ok(self
            .approvers
            .get(target)
            .cloned()
            .unwrap_or_else(|| vec![target.clone()]))
    }
}
