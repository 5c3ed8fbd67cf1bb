//! The `Sociograph` handle
//!
//! Wires stores, governance and id generation into the two engines. Use
//! [`crate::init`] for the in-memory defaults or [`Sociograph::builder`] to
//! plug in host collaborators.

use crate::Result;
use crate::config::{ConfigBuilder, SociographConfig, validate_config};
use crate::governance::{AllowAllPolicy, GovernancePolicy};
use crate::ids::{IdGenerator, SequentialIdGenerator, UuidV7Generator};
use crate::notifications::NotificationEngine;
use crate::relationships::RelationshipEngine;
use crate::storage::{InboxStore, RelationshipStore, Stores};
use std::sync::Arc;

/// Relationship and notification engines sharing one set of collaborators
///
/// # Examples
///
/// ```rust
/// use sociograph::prelude::*;
///
/// async fn example() -> Result<()> {
///     let graph = init_with_defaults()?;
///     let alice = EntityRef::user("alice");
///     let bob = EntityRef::user("bob");
///
///     graph
///         .relationships()
///         .upsert(RelationshipEdge::follow("tenant", bob.clone(), alice.clone()))
///         .await?;
///
///     let post = Activity::builder("tenant", "post.created", alice).build();
///     let report = graph.notifications().on_activity_published(&post).await?;
///     assert_eq!(report.delivered, 1);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Sociograph {
    config: SociographConfig,
    stores: Stores,
    relationships: RelationshipEngine,
    notifications: NotificationEngine,
}

impl Sociograph {
    pub fn builder() -> SociographBuilder {
        SociographBuilder::new()
    }

    /// In-memory stores, sequential ids and the testing configuration
    pub fn for_testing() -> Result<Self> {
        Self::builder()
            .with_config(ConfigBuilder::testing().build()?)
            .with_id_generator(Arc::new(SequentialIdGenerator::new("test")))
            .build()
    }

    /// Edge lifecycle and visibility decisions
    pub fn relationships(&self) -> &RelationshipEngine {
        &self.relationships
    }

    /// Fan-out, inbox and follow requests
    pub fn notifications(&self) -> &NotificationEngine {
        &self.notifications
    }

    pub fn config(&self) -> &SociographConfig {
        &self.config
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    /// Whether both stores report healthy
    pub async fn health_check(&self) -> Result<bool> {
        Ok(self.stores.health_check().await?)
    }
}

/// Builder for a [`Sociograph`] with host-supplied collaborators.
///
/// Anything left unset falls back to the in-memory stores, [`AllowAllPolicy`]
/// and [`UuidV7Generator`].
#[derive(Debug, Default)]
pub struct SociographBuilder {
    config: Option<SociographConfig>,
    relationship_store: Option<Arc<dyn RelationshipStore>>,
    inbox_store: Option<Arc<dyn InboxStore>>,
    governance: Option<Arc<dyn GovernancePolicy>>,
    ids: Option<Arc<dyn IdGenerator>>,
    init_logging: bool,
}

impl SociographBuilder {
    fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: SociographConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_relationship_store(mut self, store: Arc<dyn RelationshipStore>) -> Self {
        self.relationship_store = Some(store);
        self
    }

    pub fn with_inbox_store(mut self, store: Arc<dyn InboxStore>) -> Self {
        self.inbox_store = Some(store);
        self
    }

    pub fn with_governance(mut self, policy: Arc<dyn GovernancePolicy>) -> Self {
        self.governance = Some(policy);
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Install the global log subscriber from the config's logging section
    pub fn with_logging(mut self) -> Self {
        self.init_logging = true;
        self
    }

    /// Validate the configuration and wire the engines
    pub fn build(self) -> Result<Sociograph> {
        let config = self.config.unwrap_or_default();
        validate_config(&config)?;

        if self.init_logging {
            crate::logging::init(&config.logging)?;
        }

        let defaults = Stores::in_memory();
        let stores = Stores {
            relationships: self.relationship_store.unwrap_or(defaults.relationships),
            inbox: self.inbox_store.unwrap_or(defaults.inbox),
        };
        let governance = self.governance.unwrap_or_else(|| Arc::new(AllowAllPolicy));
        let ids = self.ids.unwrap_or_else(|| Arc::new(UuidV7Generator));

        let relationships = RelationshipEngine::new(
            stores.relationships.clone(),
            ids.clone(),
            config.relationships.clone(),
        );
        let notifications = NotificationEngine::new(
            relationships.clone(),
            stores.inbox.clone(),
            governance,
            ids,
            &config,
        );

        tracing::debug!("Sociograph engines wired");
        Ok(Sociograph {
            config,
            stores,
            relationships,
            notifications,
        })
    }
}
