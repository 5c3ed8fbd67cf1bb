//! In-memory inbox and follow-request store

use crate::models::{
    AddOutcome, AddResult, EntityRef, FollowRequest, InboxItem, InboxStatus, RequestStatus,
    RequestTransition,
};
use crate::storage::errors::StorageError;
use crate::storage::filters::{InboxPage, InboxQuery};
use crate::storage::traits::{BaseStore, InboxStore};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// `(tenant, recipient, key)` index entry shared by dedup and thread lookups
type RecipientKey = (String, EntityRef, String);

/// `(tenant, requester, target, idempotency_key)`
type IdempotencyKey = (String, EntityRef, EntityRef, String);

#[derive(Debug, Default)]
struct InboxTables {
    items: HashMap<String, InboxItem>,
    /// Item ids in insertion order
    order: Vec<String>,
    by_dedup: HashMap<RecipientKey, String>,
    by_thread: HashMap<RecipientKey, String>,
    requests: HashMap<String, FollowRequest>,
    request_order: Vec<String>,
    by_idempotency: HashMap<IdempotencyKey, String>,
}

/// Inbox store backed by `HashMap`s behind one async lock.
///
/// `add_or_merge`, `insert_request` and `transition_request` each run under
/// a single write lock, so the dedup check, thread merge, idempotent insert
/// and status compare-and-set are atomic.
#[derive(Debug, Default)]
pub struct InMemoryInboxStore {
    tables: RwLock<InboxTables>,
}

impl InMemoryInboxStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored inbox items
    pub async fn item_count(&self) -> usize {
        self.tables.read().await.items.len()
    }

    /// Number of stored follow requests
    pub async fn request_count(&self) -> usize {
        self.tables.read().await.requests.len()
    }
}

fn recipient_key(item: &InboxItem, key: &str) -> RecipientKey {
    (item.tenant_id.clone(), item.recipient.clone(), key.to_string())
}

fn idempotency_key(request: &FollowRequest) -> IdempotencyKey {
    (
        request.tenant_id.clone(),
        request.requester.clone(),
        request.target.clone(),
        request.idempotency_key.clone(),
    )
}

#[async_trait]
impl BaseStore for InMemoryInboxStore {
    async fn health_check(&self) -> Result<bool, StorageError> {
        Ok(true)
    }

}

#[async_trait]
impl InboxStore for InMemoryInboxStore {
    async fn add_or_merge(&self, item: InboxItem) -> Result<AddResult, StorageError> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;
        let dedup = recipient_key(&item, &item.dedup_key);

        if let Some(existing) = tables.by_dedup.get(&dedup).and_then(|id| tables.items.get(id)) {
            return Ok(AddResult {
                item: existing.clone(),
                outcome: AddOutcome::Duplicate,
            });
        }

        if let Some(thread_key) = item.thread_key.as_deref() {
            let thread = recipient_key(&item, thread_key);
            if let Some(thread_id) = tables.by_thread.get(&thread).cloned()
                && let Some(existing) = tables.items.get_mut(&thread_id)
            {
                existing.thread_count += 1;
                let merged = existing.clone();
                tables.by_dedup.insert(dedup, thread_id);
                return Ok(AddResult {
                    item: merged,
                    outcome: AddOutcome::Merged,
                });
            }
        }

        if tables.items.contains_key(&item.id) {
            return Err(StorageError::AlreadyExists(format!(
                "Inbox item with ID {} already exists",
                item.id
            )));
        }

        let mut stored = item;
        stored.thread_count = 1;
        stored.status = InboxStatus::Unread;

        tables.by_dedup.insert(dedup, stored.id.clone());
        if let Some(thread_key) = stored.thread_key.as_deref() {
            tables
                .by_thread
                .insert(recipient_key(&stored, thread_key), stored.id.clone());
        }
        tables.order.push(stored.id.clone());
        tables.items.insert(stored.id.clone(), stored.clone());

        Ok(AddResult {
            item: stored,
            outcome: AddOutcome::Created,
        })
    }

    async fn get_item(&self, tenant_id: &str, id: &str) -> Result<Option<InboxItem>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .items
            .get(id)
            .filter(|item| item.tenant_id == tenant_id)
            .cloned())
    }

    async fn query(&self, query: &InboxQuery) -> Result<InboxPage, StorageError> {
        let tables = self.tables.read().await;
        let matching: Vec<&InboxItem> = tables
            .order
            .iter()
            .rev()
            .filter_map(|id| tables.items.get(id))
            .filter(|item| query.matches(item))
            .collect();

        let total = matching.len();
        let limit = query.limit.unwrap_or(total);
        let items = matching
            .into_iter()
            .skip(query.offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(InboxPage {
            items,
            total,
            offset: query.offset,
            limit,
        })
    }

    async fn mark_read(&self, tenant_id: &str, id: &str) -> Result<Option<InboxItem>, StorageError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .items
            .get_mut(id)
            .filter(|item| item.tenant_id == tenant_id)
            .map(|item| {
                item.status = InboxStatus::Read;
                item.clone()
            }))
    }

    async fn mark_all_read(&self, tenant_id: &str, recipient: &EntityRef) -> Result<usize, StorageError> {
        let mut tables = self.tables.write().await;
        let mut changed = 0;
        for item in tables.items.values_mut() {
            if item.tenant_id == tenant_id && item.recipient == *recipient && !item.is_read() {
                item.status = InboxStatus::Read;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn count_unread(&self, tenant_id: &str, recipient: &EntityRef) -> Result<usize, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .items
            .values()
            .filter(|item| item.tenant_id == tenant_id && item.recipient == *recipient && !item.is_read())
            .count())
    }

    async fn find_request_by_idempotency_key(
        &self,
        tenant_id: &str,
        requester: &EntityRef,
        target: &EntityRef,
        idempotency_key: &str,
    ) -> Result<Option<FollowRequest>, StorageError> {
        let tables = self.tables.read().await;
        let key = (
            tenant_id.to_string(),
            requester.clone(),
            target.clone(),
            idempotency_key.to_string(),
        );
        Ok(tables
            .by_idempotency
            .get(&key)
            .and_then(|id| tables.requests.get(id))
            .cloned())
    }

    async fn get_request(&self, tenant_id: &str, id: &str) -> Result<Option<FollowRequest>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .requests
            .get(id)
            .filter(|request| request.tenant_id == tenant_id)
            .cloned())
    }

    async fn insert_request(&self, request: FollowRequest) -> Result<FollowRequest, StorageError> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;

        if let Some(existing) = tables.requests.get(&request.id) {
            if existing.tenant_id != request.tenant_id {
                return Err(StorageError::AlreadyExists(format!(
                    "Request with ID {} belongs to another tenant",
                    request.id
                )));
            }
            return Ok(existing.clone());
        }

        let key = idempotency_key(&request);
        if let Some(existing) = tables.by_idempotency.get(&key).and_then(|id| tables.requests.get(id)) {
            return Ok(existing.clone());
        }

        tables.by_idempotency.insert(key, request.id.clone());
        tables.request_order.push(request.id.clone());
        tables.requests.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    async fn transition_request(
        &self,
        request: FollowRequest,
        from: RequestStatus,
    ) -> Result<RequestTransition, StorageError> {
        let mut tables = self.tables.write().await;
        let Some(existing) = tables
            .requests
            .get_mut(&request.id)
            .filter(|existing| existing.tenant_id == request.tenant_id)
        else {
            return Ok(RequestTransition::NotFound);
        };

        if existing.status != from {
            return Ok(RequestTransition::Conflict(existing.clone()));
        }

        *existing = request.clone();
        Ok(RequestTransition::Applied(request))
    }

    async fn list_requests(
        &self,
        tenant_id: &str,
        target: &EntityRef,
        status: Option<RequestStatus>,
    ) -> Result<Vec<FollowRequest>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .request_order
            .iter()
            .filter_map(|id| tables.requests.get(id))
            .filter(|request| {
                request.tenant_id == tenant_id
                    && request.target == *target
                    && status.is_none_or(|status| status == request.status)
            })
            .cloned()
            .collect())
    }
}
