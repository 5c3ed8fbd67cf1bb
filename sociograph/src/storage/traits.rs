//! Trait definitions for the store collaborators
//!
//! The engines hold no mutable state of their own; every read and write goes
//! through these traits. Implementations are the points of contention and
//! must make the documented steps atomic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use crate::models::{
    AddResult, EdgeKey, EntityRef, FollowRequest, InboxItem, RelationshipEdge, RelationshipKind,
    RequestStatus, RequestTransition,
};
use crate::storage::errors::StorageError;
use crate::storage::filters::{EdgeQuery, InboxPage, InboxQuery};

/// Base trait for all storage implementations
#[async_trait]
pub trait BaseStore: Send + Sync + 'static + Debug {
    /// Check if the store is healthy and available
    async fn health_check(&self) -> std::result::Result<bool, StorageError>;
}

/// Persistence for relationship edges
#[async_trait]
pub trait RelationshipStore: BaseStore {
    /// Get an edge by its ID
    async fn get_edge(&self, tenant_id: &str, id: &str) -> std::result::Result<Option<RelationshipEdge>, StorageError>;

    /// Look an edge up by its uniqueness key
    async fn find_by_key(&self, key: &EdgeKey) -> std::result::Result<Option<RelationshipEdge>, StorageError>;

    /// Insert or update by uniqueness key.
    ///
    /// Must be atomic per `(tenant, from, to, kind, scope)`: on collision the
    /// stored edge keeps its id and creation time and takes the filter,
    /// expiry and active flag of `edge`; otherwise `edge` is stored as given.
    async fn upsert(&self, edge: RelationshipEdge) -> std::result::Result<RelationshipEdge, StorageError>;

    /// Delete an edge by its ID, returning whether it existed
    async fn remove(&self, tenant_id: &str, id: &str) -> std::result::Result<bool, StorageError>;

    /// List edges matching a filter, in insertion order
    async fn query(&self, query: &EdgeQuery) -> std::result::Result<Vec<RelationshipEdge>, StorageError>;

    /// Entities that `from` has an active, unexpired edge of `kind` to
    async fn related_entities(
        &self,
        tenant_id: &str,
        from: &EntityRef,
        kind: RelationshipKind,
        as_of: DateTime<Utc>,
    ) -> std::result::Result<Vec<EntityRef>, StorageError>;
}

/// Persistence for inbox items and follow requests
#[async_trait]
pub trait InboxStore: BaseStore {
    /// Store a candidate item applying dedup and thread rules.
    ///
    /// Atomic per `(tenant, recipient, dedup_key)` and per
    /// `(tenant, recipient, thread_key)`:
    /// 1. a known dedup key returns the existing item unchanged;
    /// 2. a known thread key increments that item's `thread_count`, leaving
    ///    its status untouched, and records the candidate's dedup key;
    /// 3. otherwise the candidate is stored as a new item.
    async fn add_or_merge(&self, item: InboxItem) -> std::result::Result<AddResult, StorageError>;

    /// Get an item by its ID
    async fn get_item(&self, tenant_id: &str, id: &str) -> std::result::Result<Option<InboxItem>, StorageError>;

    /// Page through items, newest first
    async fn query(&self, query: &InboxQuery) -> std::result::Result<InboxPage, StorageError>;

    /// Set an item's status to Read. `None` when the item does not exist.
    async fn mark_read(&self, tenant_id: &str, id: &str) -> std::result::Result<Option<InboxItem>, StorageError>;

    /// Mark every unread item of a recipient as read, returning how many changed
    async fn mark_all_read(&self, tenant_id: &str, recipient: &EntityRef) -> std::result::Result<usize, StorageError>;

    /// Count unread items of a recipient
    async fn count_unread(&self, tenant_id: &str, recipient: &EntityRef) -> std::result::Result<usize, StorageError>;

    /// Find a request by `(tenant, requester, target, idempotency_key)`
    async fn find_request_by_idempotency_key(
        &self,
        tenant_id: &str,
        requester: &EntityRef,
        target: &EntityRef,
        idempotency_key: &str,
    ) -> std::result::Result<Option<FollowRequest>, StorageError>;

    /// Get a request by its ID
    async fn get_request(&self, tenant_id: &str, id: &str) -> std::result::Result<Option<FollowRequest>, StorageError>;

    /// Store a new request, atomically per idempotency key.
    ///
    /// When `(tenant, requester, target, idempotency_key)` or the id is
    /// already taken, the stored request is returned unchanged. Stored
    /// requests only change through [`InboxStore::transition_request`].
    async fn insert_request(&self, request: FollowRequest) -> std::result::Result<FollowRequest, StorageError>;

    /// Replace the stored request with `request` only if its status is still `from`.
    ///
    /// The status check and the write must be one atomic step, so that of
    /// two concurrent decisions exactly one is applied.
    async fn transition_request(
        &self,
        request: FollowRequest,
        from: RequestStatus,
    ) -> std::result::Result<RequestTransition, StorageError>;

    /// Requests addressed to `target`, optionally narrowed by status, oldest first
    async fn list_requests(
        &self,
        tenant_id: &str,
        target: &EntityRef,
        status: Option<RequestStatus>,
    ) -> std::result::Result<Vec<FollowRequest>, StorageError>;
}
