//! Filter types for storage queries

use crate::models::{
    EntityRef, InboxItem, InboxItemKind, InboxStatus, RelationshipEdge, RelationshipKind,
    RelationshipScope,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Filter for edge queries. Every populated field must match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeQuery {
    pub tenant_id: String,

    /// Filter by source entity
    pub from: Option<EntityRef>,

    /// Filter by destination entity
    pub to: Option<EntityRef>,

    /// Filter by kind (any of)
    pub kinds: Option<Vec<RelationshipKind>>,

    /// Filter by scope (any of)
    pub scopes: Option<Vec<RelationshipScope>>,

    /// `Some(true)` (the default) returns only active edges, `Some(false)`
    /// only inactive ones, `None` both
    pub is_active: Option<bool>,

    /// Exclude edges already expired at this instant
    pub active_at: Option<DateTime<Utc>>,

    /// Maximum number of edges returned
    pub limit: Option<usize>,
}

impl EdgeQuery {
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            from: None,
            to: None,
            kinds: None,
            scopes: None,
            is_active: Some(true),
            active_at: None,
            limit: None,
        }
    }

    pub fn from(mut self, from: EntityRef) -> Self {
        self.from = Some(from);
        self
    }

    pub fn to(mut self, to: EntityRef) -> Self {
        self.to = Some(to);
        self
    }

    pub fn kind(mut self, kind: RelationshipKind) -> Self {
        self.kinds.get_or_insert_with(Vec::new).push(kind);
        self
    }

    pub fn scope(mut self, scope: RelationshipScope) -> Self {
        self.scopes.get_or_insert_with(Vec::new).push(scope);
        self
    }

    pub fn is_active(mut self, is_active: Option<bool>) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn active_at(mut self, at: DateTime<Utc>) -> Self {
        self.active_at = Some(at);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `edge` satisfies every populated field (the limit aside)
    pub fn matches(&self, edge: &RelationshipEdge) -> bool {
        if edge.tenant_id != self.tenant_id {
            return false;
        }
        if self.from.as_ref().is_some_and(|from| *from != edge.from) {
            return false;
        }
        if self.to.as_ref().is_some_and(|to| *to != edge.to) {
            return false;
        }
        if self.kinds.as_ref().is_some_and(|kinds| !kinds.contains(&edge.kind)) {
            return false;
        }
        if self.scopes.as_ref().is_some_and(|scopes| !scopes.contains(&edge.scope)) {
            return false;
        }
        if self.is_active.is_some_and(|active| active != edge.is_active) {
            return false;
        }
        if self.active_at.is_some_and(|now| edge.is_expired(now)) {
            return false;
        }
        true
    }
}

/// Filter for inbox queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxQuery {
    pub tenant_id: String,

    /// Items addressed to any of these recipients
    pub recipients: Vec<EntityRef>,

    pub kind: Option<InboxItemKind>,

    pub status: Option<InboxStatus>,

    pub offset: usize,

    pub limit: Option<usize>,
}

impl InboxQuery {
    pub fn new(tenant_id: impl Into<String>, recipient: EntityRef) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            recipients: vec![recipient],
            kind: None,
            status: None,
            offset: 0,
            limit: None,
        }
    }

    pub fn recipient(mut self, recipient: EntityRef) -> Self {
        self.recipients.push(recipient);
        self
    }

    pub fn kind(mut self, kind: InboxItemKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn status(mut self, status: InboxStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, item: &InboxItem) -> bool {
        item.tenant_id == self.tenant_id
            && self.recipients.contains(&item.recipient)
            && self.kind.is_none_or(|kind| kind == item.kind)
            && self.status.is_none_or(|status| status == item.status)
    }
}

/// One page of inbox items, newest first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InboxPage {
    pub items: Vec<InboxItem>,
    /// Matching items across all pages
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

impl InboxPage {
    pub fn has_more(&self) -> bool {
        self.offset + self.items.len() < self.total
    }
}
