//! In-memory relationship store

use crate::models::{EdgeKey, EntityRef, RelationshipEdge, RelationshipKind};
use crate::storage::errors::StorageError;
use crate::storage::filters::EdgeQuery;
use crate::storage::traits::{BaseStore, RelationshipStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct EdgeTable {
    edges: HashMap<String, RelationshipEdge>,
    by_key: HashMap<EdgeKey, String>,
    /// Edge ids in insertion order
    order: Vec<String>,
}

/// Relationship store backed by a `HashMap` behind one async lock.
///
/// Upserts run entirely under the write lock, which makes them atomic per
/// uniqueness key.
#[derive(Debug, Default)]
pub struct InMemoryRelationshipStore {
    table: RwLock<EdgeTable>,
}

impl InMemoryRelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored edges, active or not
    pub async fn len(&self) -> usize {
        self.table.read().await.edges.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl BaseStore for InMemoryRelationshipStore {
    async fn health_check(&self) -> Result<bool, StorageError> {
        Ok(true)
    }

}

#[async_trait]
impl RelationshipStore for InMemoryRelationshipStore {
    async fn get_edge(&self, tenant_id: &str, id: &str) -> Result<Option<RelationshipEdge>, StorageError> {
        let table = self.table.read().await;
        Ok(table
            .edges
            .get(id)
            .filter(|edge| edge.tenant_id == tenant_id)
            .cloned())
    }

    async fn find_by_key(&self, key: &EdgeKey) -> Result<Option<RelationshipEdge>, StorageError> {
        let table = self.table.read().await;
        Ok(table
            .by_key
            .get(key)
            .and_then(|id| table.edges.get(id))
            .cloned())
    }

    async fn upsert(&self, edge: RelationshipEdge) -> Result<RelationshipEdge, StorageError> {
        if edge.id.is_empty() {
            return Err(StorageError::Operation(
                "Edge must carry an id before it is stored".to_string(),
            ));
        }

        let mut table = self.table.write().await;
        let key = edge.key();

        if let Some(existing_id) = table.by_key.get(&key).cloned() {
            let existing = table.edges.get_mut(&existing_id).ok_or_else(|| {
                StorageError::Internal(format!("Key index points at missing edge {}", existing_id))
            })?;
            existing.filter = edge.filter;
            existing.expires_at = edge.expires_at;
            existing.is_active = edge.is_active;
            return Ok(existing.clone());
        }

        if table.edges.contains_key(&edge.id) {
            return Err(StorageError::AlreadyExists(format!(
                "Edge with ID {} already exists under another key",
                edge.id
            )));
        }

        table.by_key.insert(key, edge.id.clone());
        table.order.push(edge.id.clone());
        table.edges.insert(edge.id.clone(), edge.clone());
        Ok(edge)
    }

    async fn remove(&self, tenant_id: &str, id: &str) -> Result<bool, StorageError> {
        let mut table = self.table.write().await;
        let owned = table
            .edges
            .get(id)
            .is_some_and(|edge| edge.tenant_id == tenant_id);
        if !owned {
            return Ok(false);
        }

        if let Some(edge) = table.edges.remove(id) {
            table.by_key.remove(&edge.key());
            table.order.retain(|edge_id| edge_id != id);
        }
        Ok(true)
    }

    async fn query(&self, query: &EdgeQuery) -> Result<Vec<RelationshipEdge>, StorageError> {
        let table = self.table.read().await;
        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(table
            .order
            .iter()
            .filter_map(|id| table.edges.get(id))
            .filter(|edge| query.matches(edge))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn related_entities(
        &self,
        tenant_id: &str,
        from: &EntityRef,
        kind: RelationshipKind,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<EntityRef>, StorageError> {
        let table = self.table.read().await;
        let mut related: Vec<EntityRef> = Vec::new();
        for edge in table.order.iter().filter_map(|id| table.edges.get(id)) {
            if edge.tenant_id == tenant_id
                && edge.from == *from
                && edge.kind == kind
                && edge.is_effective(as_of)
                && !related.contains(&edge.to)
            {
                related.push(edge.to.clone());
            }
        }
        Ok(related)
    }
}
