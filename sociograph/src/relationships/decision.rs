//! Priority-ordered visibility evaluation
//!
//! Rules are evaluated in a fixed order and the first one that fires wins:
//!
//! 1. viewer is the actor: allowed (self-authored)
//! 2. matching Block edge: denied
//! 3. matching Deny edge: denied
//! 4. private activity the viewer is not part of: denied
//! 5. matching Mute edge: hidden
//! 6. matching Allow edge: allowed
//! 7. otherwise: allowed (default)

use super::matching::edge_applies;
use crate::models::{
    Activity, DecisionReason, EntityRef, RelationshipDecision, RelationshipEdge, RelationshipKind,
    Visibility,
};
use chrono::{DateTime, Utc};

/// Edge kinds that can influence a decision
pub const DECISION_KINDS: [RelationshipKind; 4] = [
    RelationshipKind::Block,
    RelationshipKind::Deny,
    RelationshipKind::Mute,
    RelationshipKind::Allow,
];

/// Evaluate `viewer` against `activity` given the viewer's outgoing edges.
///
/// Edges that are not from the viewer, inactive, or expired at `now` are
/// ignored, so callers may pass a superset.
pub fn decide(
    viewer: &EntityRef,
    activity: &Activity,
    edges: &[RelationshipEdge],
    now: DateTime<Utc>,
) -> RelationshipDecision {
    if *viewer == activity.actor {
        return RelationshipDecision::allowed(DecisionReason::SelfAuthored, None);
    }

    let first_match = |kind: RelationshipKind| {
        edges
            .iter()
            .filter(|edge| edge.kind == kind && edge.from == *viewer && edge.is_effective(now))
            .find(|edge| edge_applies(edge, activity))
            .map(|edge| edge.id.clone())
    };

    if let Some(edge_id) = first_match(RelationshipKind::Block) {
        return RelationshipDecision::denied(DecisionReason::Block, Some(edge_id));
    }

    if let Some(edge_id) = first_match(RelationshipKind::Deny) {
        return RelationshipDecision::denied(DecisionReason::Deny, Some(edge_id));
    }

    if activity.visibility == Visibility::Private && !activity.involves(viewer) {
        return RelationshipDecision::denied(DecisionReason::Visibility, None);
    }

    if let Some(edge_id) = first_match(RelationshipKind::Mute) {
        return RelationshipDecision::hidden(DecisionReason::Mute, Some(edge_id));
    }

    if let Some(edge_id) = first_match(RelationshipKind::Allow) {
        return RelationshipDecision::allowed(DecisionReason::Allow, Some(edge_id));
    }

    RelationshipDecision::allowed(DecisionReason::Default, None)
}
