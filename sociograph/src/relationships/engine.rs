//! Edge lifecycle, queries and visibility decisions

use super::decision::{DECISION_KINDS, decide};
use crate::Result;
use crate::config::RelationshipConfig;
use crate::ids::IdGenerator;
use crate::models::{
    Activity, EdgeKey, EntityRef, RelationshipDecision, RelationshipEdge, RelationshipKind,
};
use crate::storage::{EdgeQuery, RelationshipStore};
use crate::validation::{ValidationErrors, validate_edge};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Owns edge lifecycle and the visibility decision.
///
/// Holds no mutable state; every call goes through the store.
#[derive(Debug, Clone)]
pub struct RelationshipEngine {
    store: Arc<dyn RelationshipStore>,
    ids: Arc<dyn IdGenerator>,
    config: RelationshipConfig,
}

impl RelationshipEngine {
    pub fn new(
        store: Arc<dyn RelationshipStore>,
        ids: Arc<dyn IdGenerator>,
        config: RelationshipConfig,
    ) -> Self {
        Self { store, ids, config }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn RelationshipStore> {
        &self.store
    }

    /// Create an edge, or update the existing one with the same uniqueness key.
    ///
    /// On update the stored edge keeps its id and creation time. Repeating
    /// the call with identical content is a no-op.
    pub async fn upsert(&self, mut edge: RelationshipEdge) -> Result<RelationshipEdge> {
        validate_edge(&edge)?;

        if edge.id.is_empty() {
            edge.id = self.ids.next_id();
        }

        let stored = self.store.upsert(edge).await?;
        info!(
            edge_id = %stored.id,
            tenant_id = %stored.tenant_id,
            kind = %stored.kind,
            from = %stored.from,
            to = %stored.to,
            "Upserted relationship edge"
        );
        Ok(stored)
    }

    /// Hard delete. Unknown ids are a no-op.
    pub async fn remove(&self, tenant_id: &str, edge_id: &str) -> Result<bool> {
        let removed = self.store.remove(tenant_id, edge_id).await?;
        if removed {
            info!(edge_id, tenant_id, "Removed relationship edge");
        } else {
            debug!(edge_id, tenant_id, "Remove of unknown edge ignored");
        }
        Ok(removed)
    }

    /// Soft delete by clearing the active flag.
    ///
    /// Returns the updated edge, or `None` when the id is unknown.
    pub async fn deactivate(
        &self,
        tenant_id: &str,
        edge_id: &str,
    ) -> Result<Option<RelationshipEdge>> {
        let Some(edge) = self.store.get_edge(tenant_id, edge_id).await? else {
            return Ok(None);
        };

        if !edge.is_active {
            return Ok(Some(edge));
        }

        let stored = self.store.upsert(edge.inactive()).await?;
        info!(edge_id, tenant_id, "Deactivated relationship edge");
        Ok(Some(stored))
    }

    pub async fn get_edge(&self, tenant_id: &str, edge_id: &str) -> Result<Option<RelationshipEdge>> {
        Ok(self.store.get_edge(tenant_id, edge_id).await?)
    }

    /// Look an edge up by its uniqueness key
    pub async fn find_edge(&self, key: &EdgeKey) -> Result<Option<RelationshipEdge>> {
        Ok(self.store.find_by_key(key).await?)
    }

    /// Edges matching `query`.
    ///
    /// Expired edges are never returned. The limit defaults to the configured
    /// default and is capped at the configured maximum.
    pub async fn query(&self, query: EdgeQuery) -> Result<Vec<RelationshipEdge>> {
        if query.tenant_id.trim().is_empty() {
            let mut errors = ValidationErrors::new();
            errors.require("tenant_id", &query.tenant_id);
            errors.into_result()?;
        }

        let limit = query
            .limit
            .unwrap_or(self.config.default_query_limit)
            .min(self.config.max_query_limit);
        let query = query.active_at(Utc::now()).limit(limit);

        Ok(self.store.query(&query).await?)
    }

    /// Decide whether `viewer` may see `activity`.
    #[instrument(skip_all, fields(tenant_id = %tenant_id, activity_id = %activity.id, viewer = %viewer))]
    pub async fn can_see(
        &self,
        tenant_id: &str,
        viewer: &EntityRef,
        activity: &Activity,
    ) -> Result<RelationshipDecision> {
        let now = Utc::now();

        if *viewer == activity.actor {
            return Ok(decide(viewer, activity, &[], now));
        }

        let mut edges = Vec::new();
        for participant in participants(activity) {
            let mut query = EdgeQuery::new(tenant_id)
                .from(viewer.clone())
                .to(participant.clone())
                .active_at(now);
            for kind in DECISION_KINDS {
                query = query.kind(kind);
            }
            edges.extend(self.store.query(&query).await?);
        }

        let decision = decide(viewer, activity, &edges, now);
        debug!(
            kind = ?decision.kind,
            reason = ?decision.reason,
            matched_edge_id = ?decision.matched_edge_id,
            "Visibility decided"
        );
        Ok(decision)
    }

    /// Whether active edges of `kind` exist in both directions
    pub async fn are_mutual(
        &self,
        tenant_id: &str,
        e1: &EntityRef,
        e2: &EntityRef,
        kind: RelationshipKind,
    ) -> Result<bool> {
        Ok(self.has_effective_edge(tenant_id, e1, e2, kind).await?
            && self.has_effective_edge(tenant_id, e2, e1, kind).await?)
    }

    /// Entities both `e1` and `e2` have an edge of `kind` to, in `e1`'s order
    pub async fn get_mutual_relationships(
        &self,
        tenant_id: &str,
        e1: &EntityRef,
        e2: &EntityRef,
        kind: RelationshipKind,
        limit: Option<usize>,
    ) -> Result<Vec<EntityRef>> {
        let limit = limit.unwrap_or(self.config.default_mutual_limit);
        let (first, second) = self.related_pair(tenant_id, e1, e2, kind).await?;

        Ok(first
            .into_iter()
            .filter(|entity| second.contains(entity))
            .take(limit)
            .collect())
    }

    /// Size of the mutual set, counting at most `limit` matches
    pub async fn count_mutual_relationships(
        &self,
        tenant_id: &str,
        e1: &EntityRef,
        e2: &EntityRef,
        kind: RelationshipKind,
        limit: Option<usize>,
    ) -> Result<usize> {
        let limit = limit.unwrap_or(self.config.default_mutual_limit);
        let (first, second) = self.related_pair(tenant_id, e1, e2, kind).await?;

        Ok(first
            .iter()
            .filter(|entity| second.contains(*entity))
            .take(limit)
            .count())
    }

    /// Entities `from` has an effective edge of `kind` to
    pub async fn get_related(
        &self,
        tenant_id: &str,
        from: &EntityRef,
        kind: RelationshipKind,
    ) -> Result<Vec<EntityRef>> {
        Ok(self
            .store
            .related_entities(tenant_id, from, kind, Utc::now())
            .await?)
    }

    /// Entities holding an effective edge of `kind` to `target`
    pub async fn get_followers(
        &self,
        tenant_id: &str,
        target: &EntityRef,
        kind: RelationshipKind,
    ) -> Result<Vec<EntityRef>> {
        let query = EdgeQuery::new(tenant_id)
            .to(target.clone())
            .kind(kind)
            .active_at(Utc::now());

        let mut seen = HashSet::new();
        Ok(self
            .store
            .query(&query)
            .await?
            .into_iter()
            .map(|edge| edge.from)
            .filter(|from| seen.insert(from.clone()))
            .collect())
    }

    async fn has_effective_edge(
        &self,
        tenant_id: &str,
        from: &EntityRef,
        to: &EntityRef,
        kind: RelationshipKind,
    ) -> Result<bool> {
        let query = EdgeQuery::new(tenant_id)
            .from(from.clone())
            .to(to.clone())
            .kind(kind)
            .active_at(Utc::now())
            .limit(1);
        Ok(!self.store.query(&query).await?.is_empty())
    }

    async fn related_pair(
        &self,
        tenant_id: &str,
        e1: &EntityRef,
        e2: &EntityRef,
        kind: RelationshipKind,
    ) -> Result<(Vec<EntityRef>, HashSet<EntityRef>)> {
        let now = Utc::now();
        let first = self.store.related_entities(tenant_id, e1, kind, now).await?;
        let second = self
            .store
            .related_entities(tenant_id, e2, kind, now)
            .await?
            .into_iter()
            .collect();
        Ok((first, second))
    }
}

/// Actor, targets and owner with duplicates removed
fn participants(activity: &Activity) -> Vec<&EntityRef> {
    let mut participants: Vec<&EntityRef> = Vec::with_capacity(activity.targets.len() + 2);
    let candidates = std::iter::once(&activity.actor)
        .chain(activity.targets.iter())
        .chain(activity.owner.iter());
    for entity in candidates {
        if !participants.contains(&entity) {
            participants.push(entity);
        }
    }
    participants
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SociographError;
    use crate::ids::SequentialIdGenerator;
    use crate::models::{DecisionKind, DecisionReason, RelationshipScope, Visibility};
    use crate::storage::InMemoryRelationshipStore;
    use chrono::Duration;

    fn engine() -> RelationshipEngine {
        RelationshipEngine::new(
            Arc::new(InMemoryRelationshipStore::new()),
            Arc::new(SequentialIdGenerator::new("edge")),
            RelationshipConfig::default(),
        )
    }

    fn user(id: &str) -> EntityRef {
        EntityRef::user(id)
    }

    #[tokio::test]
    async fn test_upsert_assigns_id_and_is_idempotent() {
        let engine = engine();
        let first = engine
            .upsert(RelationshipEdge::follow("t1", user("a"), user("b")))
            .await
            .unwrap();
        assert_eq!(first.id, "edge-1");

        let second = engine
            .upsert(RelationshipEdge::follow("t1", user("a"), user("b")))
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);

        let edges = engine
            .query(EdgeQuery::new("t1").from(user("a")))
            .await
            .unwrap();
        assert_eq!(edges.len(), 1);
    }

    #[tokio::test]
    async fn test_scope_is_part_of_uniqueness_key() {
        let engine = engine();
        engine
            .upsert(RelationshipEdge::block("t1", user("a"), user("b")))
            .await
            .unwrap();
        engine
            .upsert(
                RelationshipEdge::block("t1", user("a"), user("b"))
                    .with_scope(RelationshipScope::ActorOnly),
            )
            .await
            .unwrap();

        let edges = engine
            .query(EdgeQuery::new("t1").kind(RelationshipKind::Block))
            .await
            .unwrap();
        assert_eq!(edges.len(), 2);
    }

    #[tokio::test]
    async fn test_upsert_validation_lists_every_field() {
        let engine = engine();
        let edge = RelationshipEdge::follow("", EntityRef::new("", "", ""), EntityRef::new("", "", ""));

        match engine.upsert(edge).await {
            Err(SociographError::Validation(errors)) => {
                assert_eq!(errors.fields(), vec!["tenant_id", "from", "to"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_remove_and_deactivate() {
        let engine = engine();
        let edge = engine
            .upsert(RelationshipEdge::follow("t1", user("a"), user("b")))
            .await
            .unwrap();

        let deactivated = engine.deactivate("t1", &edge.id).await.unwrap().unwrap();
        assert!(!deactivated.is_active);
        assert!(
            engine
                .query(EdgeQuery::new("t1"))
                .await
                .unwrap()
                .is_empty()
        );
        let inactive = engine
            .query(EdgeQuery::new("t1").is_active(Some(false)))
            .await
            .unwrap();
        assert_eq!(inactive.len(), 1);

        assert!(engine.remove("t1", &edge.id).await.unwrap());
        assert!(!engine.remove("t1", &edge.id).await.unwrap());
        assert!(engine.get_edge("t1", &edge.id).await.unwrap().is_none());
        assert!(engine.deactivate("t1", &edge.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_limit_defaults_and_cap() {
        let store = Arc::new(InMemoryRelationshipStore::new());
        let engine = RelationshipEngine::new(
            store,
            Arc::new(SequentialIdGenerator::new("edge")),
            RelationshipConfig {
                default_query_limit: 2,
                max_query_limit: 3,
                default_mutual_limit: 50,
            },
        );
        for i in 0..5 {
            engine
                .upsert(RelationshipEdge::follow("t1", user("a"), user(&format!("u{}", i))))
                .await
                .unwrap();
        }

        assert_eq!(engine.query(EdgeQuery::new("t1")).await.unwrap().len(), 2);
        assert_eq!(
            engine
                .query(EdgeQuery::new("t1").limit(100))
                .await
                .unwrap()
                .len(),
            3
        );
    }

    #[tokio::test]
    async fn test_expired_edges_excluded_from_queries() {
        let engine = engine();
        engine
            .upsert(
                RelationshipEdge::follow("t1", user("a"), user("b"))
                    .expires_at(Utc::now() - Duration::minutes(1)),
            )
            .await
            .unwrap();

        assert!(engine.query(EdgeQuery::new("t1")).await.unwrap().is_empty());
        assert!(
            engine
                .get_related("t1", &user("a"), RelationshipKind::Follow)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_can_see_block_and_mute() {
        let engine = engine();
        let activity = Activity::builder("t1", "post.created", user("author")).build();

        let decision = engine.can_see("t1", &user("v"), &activity).await.unwrap();
        assert_eq!(decision.reason, DecisionReason::Default);

        engine
            .upsert(RelationshipEdge::mute("t1", user("v"), user("author")))
            .await
            .unwrap();
        let decision = engine.can_see("t1", &user("v"), &activity).await.unwrap();
        assert_eq!(decision.kind, DecisionKind::Hidden);
        assert!(decision.allowed);

        let block = engine
            .upsert(RelationshipEdge::block("t1", user("v"), user("author")))
            .await
            .unwrap();
        let decision = engine.can_see("t1", &user("v"), &activity).await.unwrap();
        assert_eq!(decision.kind, DecisionKind::Denied);
        assert_eq!(decision.matched_edge_id, Some(block.id));

        let own = engine.can_see("t1", &user("author"), &activity).await.unwrap();
        assert_eq!(own.reason, DecisionReason::SelfAuthored);
    }

    #[tokio::test]
    async fn test_can_see_is_tenant_isolated() {
        let engine = engine();
        engine
            .upsert(RelationshipEdge::block("t2", user("v"), user("author")))
            .await
            .unwrap();
        let activity = Activity::builder("t1", "post.created", user("author"))
            .visibility(Visibility::Public)
            .build();

        let decision = engine.can_see("t1", &user("v"), &activity).await.unwrap();
        assert_eq!(decision.kind, DecisionKind::Allowed);
    }

    #[tokio::test]
    async fn test_mutual_relationships() {
        let engine = engine();
        for (from, to) in [("a", "b"), ("b", "a"), ("a", "x"), ("a", "y"), ("b", "y"), ("b", "x"), ("a", "z")] {
            engine
                .upsert(RelationshipEdge::follow("t1", user(from), user(to)))
                .await
                .unwrap();
        }

        assert!(
            engine
                .are_mutual("t1", &user("a"), &user("b"), RelationshipKind::Follow)
                .await
                .unwrap()
        );
        assert!(
            !engine
                .are_mutual("t1", &user("a"), &user("x"), RelationshipKind::Follow)
                .await
                .unwrap()
        );

        let mutual = engine
            .get_mutual_relationships("t1", &user("a"), &user("b"), RelationshipKind::Follow, None)
            .await
            .unwrap();
        assert_eq!(mutual, vec![user("x"), user("y")]);

        let limited = engine
            .get_mutual_relationships("t1", &user("a"), &user("b"), RelationshipKind::Follow, Some(1))
            .await
            .unwrap();
        assert_eq!(limited, vec![user("x")]);

        let count = engine
            .count_mutual_relationships("t1", &user("a"), &user("b"), RelationshipKind::Follow, None)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_followers_are_reverse_edges() {
        let engine = engine();
        engine
            .upsert(RelationshipEdge::follow("t1", user("a"), user("star")))
            .await
            .unwrap();
        engine
            .upsert(
                RelationshipEdge::follow("t1", user("b"), user("star"))
                    .with_scope(RelationshipScope::ActorOnly),
            )
            .await
            .unwrap();
        engine
            .upsert(RelationshipEdge::follow("t1", user("b"), user("star")))
            .await
            .unwrap();

        let followers = engine
            .get_followers("t1", &user("star"), RelationshipKind::Follow)
            .await
            .unwrap();
        assert_eq!(followers, vec![user("a"), user("b")]);
    }
}
