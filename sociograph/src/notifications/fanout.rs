//! Activity fan-out and inbox operations

use super::NotificationEngine;
use crate::Result;
use crate::models::{
    Activity, AddOutcome, AddResult, DecisionReason, EntityRef, InboxEvent, InboxItem,
    InboxItemKind, RelationshipEdge, RelationshipKind, RelationshipScope,
};
use crate::relationships::edge_applies;
use crate::storage::{EdgeQuery, InboxPage, InboxQuery};
use crate::validation::{ValidationErrors, validate_activity, validate_inbox_item};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Outcome of one fan-out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanoutReport {
    pub activity_id: String,
    /// Recipients resolved from the relationship graph
    pub candidates: usize,
    /// New items plus thread merges
    pub delivered: usize,
    /// Candidates the visibility decision denied or hid
    pub suppressed: usize,
    /// Candidates that already held this activity's item
    pub duplicates: usize,
}

enum Delivery {
    Stored(AddOutcome),
    Suppressed(DecisionReason),
}

impl NotificationEngine {
    /// Deliver `activity` to every interested recipient that may see it.
    ///
    /// Recipients are holders of a Follow edge to the actor, a Subscribe edge
    /// to a target, or either kind to the owner, with scopes and filters
    /// matching the activity. Muted and denied recipients get nothing.
    /// Re-publishing the same activity is safe: existing items come back as
    /// duplicates.
    #[instrument(skip_all, fields(activity_id = %activity.id, tenant_id = %activity.tenant_id))]
    pub async fn on_activity_published(&self, activity: &Activity) -> Result<FanoutReport> {
        validate_activity(activity)?;

        let recipients = self.resolve_recipients(activity).await?;
        let mut report = FanoutReport {
            activity_id: activity.id.clone(),
            candidates: recipients.len(),
            ..Default::default()
        };

        let results: Vec<(EntityRef, Result<Delivery>)> = stream::iter(recipients)
            .map(|recipient| async move {
                let delivery = self.deliver(activity, &recipient).await;
                (recipient, delivery)
            })
            .buffer_unordered(self.fanout_config.max_concurrency.max(1))
            .collect()
            .await;

        let mut first_error = None;
        for (recipient, result) in results {
            match result {
                Ok(Delivery::Stored(AddOutcome::Duplicate)) => report.duplicates += 1,
                Ok(Delivery::Stored(_)) => report.delivered += 1,
                Ok(Delivery::Suppressed(reason)) => {
                    debug!(recipient = %recipient, ?reason, "Notification suppressed");
                    report.suppressed += 1;
                }
                Err(err) => {
                    warn!(recipient = %recipient, error = %err, "Notification delivery failed");
                    first_error.get_or_insert(err);
                }
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }

        info!(
            candidates = report.candidates,
            delivered = report.delivered,
            suppressed = report.suppressed,
            duplicates = report.duplicates,
            "Fan-out complete"
        );
        Ok(report)
    }

    /// Candidate recipients of `activity`, in discovery order and without repeats
    pub async fn resolve_recipients(&self, activity: &Activity) -> Result<Vec<EntityRef>> {
        let now = Utc::now();
        let tenant_id = activity.tenant_id.as_str();
        let store = self.relationships.store();
        let mut edges: Vec<RelationshipEdge> = Vec::new();

        let actor_query = EdgeQuery::new(tenant_id)
            .to(activity.actor.clone())
            .kind(RelationshipKind::Follow)
            .scope(RelationshipScope::Any)
            .scope(RelationshipScope::ActorOnly)
            .active_at(now);
        edges.extend(store.query(&actor_query).await?);

        for target in &activity.targets {
            let target_query = EdgeQuery::new(tenant_id)
                .to(target.clone())
                .kind(RelationshipKind::Subscribe)
                .scope(RelationshipScope::Any)
                .scope(RelationshipScope::TargetOnly)
                .active_at(now);
            edges.extend(store.query(&target_query).await?);
        }

        if let Some(owner) = &activity.owner {
            let owner_query = EdgeQuery::new(tenant_id)
                .to(owner.clone())
                .kind(RelationshipKind::Follow)
                .kind(RelationshipKind::Subscribe)
                .scope(RelationshipScope::Any)
                .scope(RelationshipScope::OwnerOnly)
                .active_at(now);
            edges.extend(store.query(&owner_query).await?);
        }

        let mut seen = HashSet::new();
        let recipients = edges
            .into_iter()
            .filter(|edge| edge_applies(edge, activity))
            .map(|edge| edge.from)
            .filter(|from| self.fanout_config.notify_actor || *from != activity.actor)
            .filter(|from| seen.insert(from.clone()))
            .collect::<Vec<_>>();

        debug!(count = recipients.len(), "Resolved fan-out recipients");
        Ok(recipients)
    }

    async fn deliver(&self, activity: &Activity, recipient: &EntityRef) -> Result<Delivery> {
        let decision = self
            .relationships
            .can_see(&activity.tenant_id, recipient, activity)
            .await?;
        if !decision.is_deliverable() {
            return Ok(Delivery::Suppressed(decision.reason));
        }

        let mut item = InboxItem::new(
            self.ids.next_id(),
            activity.tenant_id.clone(),
            recipient.clone(),
            InboxItemKind::Notification,
            InboxEvent::new(activity.type_key.clone(), activity.id.clone()),
            format!("activity:{}", activity.id),
        );
        if self.fanout_config.thread_by_target
            && let Some(target) = activity.targets.first()
        {
            item = item.with_thread_key(format!("{}:{}", activity.type_key, target.key()));
        }

        let result = self.add(item).await?;
        Ok(Delivery::Stored(result.outcome))
    }

    /// Store a candidate item through the dedup and thread rules.
    ///
    /// An empty id is replaced with a generated one.
    pub async fn add(&self, mut item: InboxItem) -> Result<AddResult> {
        validate_inbox_item(&item)?;
        if item.id.is_empty() {
            item.id = self.ids.next_id();
        }

        let result = self.inbox.add_or_merge(item).await?;
        match result.outcome {
            AddOutcome::Created => debug!(item_id = %result.item.id, recipient = %result.item.recipient, "Inbox item created"),
            AddOutcome::Merged => debug!(
                item_id = %result.item.id,
                thread_count = result.item.thread_count,
                "Inbox item merged into thread"
            ),
            AddOutcome::Duplicate => debug!(item_id = %result.item.id, "Duplicate inbox item ignored"),
        }
        Ok(result)
    }

    /// A page of inbox items, newest first.
    ///
    /// The page size defaults to the configured default and is capped at the
    /// configured maximum.
    pub async fn query_inbox(&self, query: InboxQuery) -> Result<InboxPage> {
        let mut errors = ValidationErrors::new();
        errors.require("tenant_id", &query.tenant_id);
        if query.recipients.is_empty() {
            errors.add("recipients", "at least one recipient is required");
        }
        errors.into_result()?;

        let limit = query
            .limit
            .unwrap_or(self.inbox_config.default_page_size)
            .min(self.inbox_config.max_page_size);
        let offset = query.offset;

        Ok(self.inbox.query(&query.page(offset, limit)).await?)
    }

    pub async fn get_item(&self, tenant_id: &str, item_id: &str) -> Result<Option<InboxItem>> {
        Ok(self.inbox.get_item(tenant_id, item_id).await?)
    }

    /// Mark one item read. Idempotent; `None` for unknown ids.
    pub async fn mark_read(&self, tenant_id: &str, item_id: &str) -> Result<Option<InboxItem>> {
        Ok(self.inbox.mark_read(tenant_id, item_id).await?)
    }

    /// Mark every item of `recipient` read, returning how many changed
    pub async fn mark_all_read(&self, tenant_id: &str, recipient: &EntityRef) -> Result<usize> {
        let changed = self.inbox.mark_all_read(tenant_id, recipient).await?;
        debug!(tenant_id, recipient = %recipient, changed, "Marked inbox read");
        Ok(changed)
    }

    pub async fn count_unread(&self, tenant_id: &str, recipient: &EntityRef) -> Result<usize> {
        Ok(self.inbox.count_unread(tenant_id, recipient).await?)
    }
}
