//! Inbox items delivered to recipients

use super::entity::EntityRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InboxItemKind {
    Notification,
    Request,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum InboxStatus {
    #[default]
    Unread,
    Read,
}

/// What the item points at: an activity, a follow request, ...
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct InboxEvent {
    pub kind: String,
    pub id: String,
}

impl InboxEvent {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

/// A notification or request sitting in a recipient's inbox.
///
/// `dedup_key` is unique per `(tenant_id, recipient)`. Items sharing a
/// `thread_key` collapse into one displayed item whose `thread_count` grows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InboxItem {
    pub id: String,
    pub tenant_id: String,
    pub recipient: EntityRef,
    pub kind: InboxItemKind,
    pub event: InboxEvent,
    pub dedup_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_key: Option<String>,
    pub thread_count: u32,
    pub status: InboxStatus,
    pub created_at: DateTime<Utc>,
}

impl InboxItem {
    /// A fresh, unread candidate with `thread_count = 1`
    pub fn new(
        id: impl Into<String>,
        tenant_id: impl Into<String>,
        recipient: EntityRef,
        kind: InboxItemKind,
        event: InboxEvent,
        dedup_key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            tenant_id: tenant_id.into(),
            recipient,
            kind,
            event,
            dedup_key: dedup_key.into(),
            thread_key: None,
            thread_count: 1,
            status: InboxStatus::Unread,
            created_at: Utc::now(),
        }
    }

    pub fn with_thread_key(mut self, thread_key: impl Into<String>) -> Self {
        self.thread_key = Some(thread_key.into());
        self
    }

    pub fn is_read(&self) -> bool {
        self.status == InboxStatus::Read
    }
}

/// How `add_or_merge` resolved a candidate item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A brand-new item was stored
    Created,
    /// An existing thread absorbed the candidate (`thread_count` incremented)
    Merged,
    /// The dedup key was already present; nothing changed
    Duplicate,
}

/// Stored item plus how it got there
#[derive(Debug, Clone, PartialEq)]
pub struct AddResult {
    pub item: InboxItem,
    pub outcome: AddOutcome,
}
