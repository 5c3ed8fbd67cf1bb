//! Follow requests awaiting (or past) an approver decision

use super::edge::RelationshipKind;
use super::entity::EntityRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
}

impl RequestStatus {
    /// Approved and Denied are final
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::Approved => write!(f, "approved"),
            RequestStatus::Denied => write!(f, "denied"),
        }
    }
}

/// Caller input for creating a follow request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewFollowRequest {
    pub tenant_id: String,
    pub requester: EntityRef,
    pub target: EntityRef,
    pub requested_kind: RelationshipKind,
    pub idempotency_key: String,
}

impl NewFollowRequest {
    /// A `Follow` request
    pub fn follow(
        tenant_id: impl Into<String>,
        requester: EntityRef,
        target: EntityRef,
        idempotency_key: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            requester,
            target,
            requested_kind: RelationshipKind::Follow,
            idempotency_key: idempotency_key.into(),
        }
    }

    pub fn with_kind(mut self, kind: RelationshipKind) -> Self {
        self.requested_kind = kind;
        self
    }
}

/// A persisted follow request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FollowRequest {
    pub id: String,
    pub tenant_id: String,
    pub requester: EntityRef,
    pub target: EntityRef,
    pub requested_kind: RelationshipKind,
    pub status: RequestStatus,
    pub idempotency_key: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_note: Option<String>,
}

impl FollowRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

/// Outcome of a conditional status change on a stored request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestTransition {
    /// The stored status matched and the new record replaced it
    Applied(FollowRequest),
    /// The stored status had already moved on; carries the stored record
    Conflict(FollowRequest),
    /// No request with that id in the tenant
    NotFound,
}
