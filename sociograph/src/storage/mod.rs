//! Storage abstractions and implementations
//!
//! This module provides the collaborator traits the engines read from and
//! write to, plus in-memory implementations.
//!
//! ## Storage Implementations
//!
//! - **Memory**: `InMemoryRelationshipStore` and `InMemoryInboxStore`, suitable
//!   for tests, development and single-process embedding
//! - **Custom**: any host-supplied implementation of [`RelationshipStore`] and
//!   [`InboxStore`]; the atomicity contracts are documented on the traits

pub mod errors;
pub mod filters;
pub mod memory;
pub mod traits;

pub use errors::{StorageError, StorageResult};
pub use filters::{EdgeQuery, InboxPage, InboxQuery};
pub use memory::{InMemoryInboxStore, InMemoryRelationshipStore};
pub use traits::{BaseStore, InboxStore, RelationshipStore};

use std::sync::Arc;

/// The pair of stores the engines are wired to
#[derive(Debug, Clone)]
pub struct Stores {
    pub relationships: Arc<dyn RelationshipStore>,
    pub inbox: Arc<dyn InboxStore>,
}

impl Stores {
    /// Fresh, empty in-memory stores
    pub fn in_memory() -> Self {
        Self {
            relationships: Arc::new(InMemoryRelationshipStore::new()),
            inbox: Arc::new(InMemoryInboxStore::new()),
        }
    }

    /// Health of both stores
    pub async fn health_check(&self) -> StorageResult<bool> {
        Ok(self.relationships.health_check().await? && self.inbox.health_check().await?)
    }
}
