//! Role and filter matching of edges against an activity

use crate::models::{Activity, RelationshipEdge, RelationshipFilter, RelationshipScope};

/// Treats `None` and an empty list alike: no constraint
fn constraint<T>(values: &Option<Vec<T>>) -> Option<&[T]> {
    values.as_deref().filter(|values| !values.is_empty())
}

/// Whether the edge's destination plays the role its scope names.
///
/// `Any` accepts actor, any target or owner; `OwnerOnly` never matches an
/// activity without an owner.
pub fn scope_matches(edge: &RelationshipEdge, activity: &Activity) -> bool {
    let is_actor = edge.to == activity.actor;
    let is_target = activity.targets.iter().any(|target| *target == edge.to);
    let is_owner = activity.owner.as_ref() == Some(&edge.to);

    match edge.scope {
        RelationshipScope::Any => is_actor || is_target || is_owner,
        RelationshipScope::ActorOnly => is_actor,
        RelationshipScope::TargetOnly => is_target,
        RelationshipScope::OwnerOnly => is_owner,
    }
}

/// Whether every populated clause of the filter accepts the activity
pub fn filter_matches(filter: &RelationshipFilter, activity: &Activity) -> bool {
    let type_key = activity.type_key.to_lowercase();

    if let Some(keys) = constraint(&filter.type_keys)
        && !keys.iter().any(|key| key.to_lowercase() == type_key)
    {
        return false;
    }

    if let Some(prefixes) = constraint(&filter.type_key_prefixes)
        && !prefixes
            .iter()
            .any(|prefix| type_key.starts_with(&prefix.to_lowercase()))
    {
        return false;
    }

    if let Some(required) = constraint(&filter.required_tags_any)
        && !required.iter().any(|tag| activity.has_tag(tag))
    {
        return false;
    }

    if let Some(excluded) = constraint(&filter.excluded_tags_any)
        && excluded.iter().any(|tag| activity.has_tag(tag))
    {
        return false;
    }

    if let Some(visibilities) = constraint(&filter.allowed_visibilities)
        && !visibilities.contains(&activity.visibility)
    {
        return false;
    }

    true
}

/// Scope and (optional) filter both accept the activity
pub fn edge_applies(edge: &RelationshipEdge, activity: &Activity) -> bool {
    scope_matches(edge, activity)
        && edge
            .filter
            .as_ref()
            .is_none_or(|filter| filter_matches(filter, activity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityRef, RelationshipKind, Visibility};

    fn activity() -> Activity {
        Activity::builder("t1", "Post.Created", EntityRef::user("alice"))
            .target(EntityRef::object("post", "p1"))
            .owner(EntityRef::object("group", "g1"))
            .tags(&["Rust", "news"])
            .build()
    }

    fn edge_to(to: EntityRef, scope: RelationshipScope) -> RelationshipEdge {
        RelationshipEdge::new("t1", EntityRef::user("bob"), to, RelationshipKind::Block).with_scope(scope)
    }

    #[test]
    fn test_scope_roles() {
        let a = activity();
        let actor = EntityRef::user("alice");
        let target = EntityRef::object("post", "p1");
        let owner = EntityRef::object("group", "g1");

        assert!(scope_matches(&edge_to(actor.clone(), RelationshipScope::Any), &a));
        assert!(scope_matches(&edge_to(actor.clone(), RelationshipScope::ActorOnly), &a));
        assert!(!scope_matches(&edge_to(actor, RelationshipScope::TargetOnly), &a));

        assert!(scope_matches(&edge_to(target.clone(), RelationshipScope::TargetOnly), &a));
        assert!(!scope_matches(&edge_to(target, RelationshipScope::OwnerOnly), &a));

        assert!(scope_matches(&edge_to(owner.clone(), RelationshipScope::OwnerOnly), &a));
        assert!(!scope_matches(&edge_to(owner, RelationshipScope::ActorOnly), &a));

        assert!(!scope_matches(&edge_to(EntityRef::user("carol"), RelationshipScope::Any), &a));
    }

    #[test]
    fn test_owner_only_without_owner_never_matches() {
        let a = Activity::builder("t1", "post.created", EntityRef::user("alice")).build();
        let edge = edge_to(EntityRef::user("alice"), RelationshipScope::OwnerOnly);
        assert!(!scope_matches(&edge, &a));
    }

    #[test]
    fn test_filter_type_keys_case_insensitive() {
        let a = activity();
        assert!(filter_matches(&RelationshipFilter::new().type_keys(&["post.created"]), &a));
        assert!(!filter_matches(&RelationshipFilter::new().type_keys(&["post.deleted"]), &a));
        assert!(filter_matches(&RelationshipFilter::new().type_key_prefixes(&["POST."]), &a));
        assert!(!filter_matches(&RelationshipFilter::new().type_key_prefixes(&["comment."]), &a));
    }

    #[test]
    fn test_non_ascii_keys_fold_the_same_for_exact_and_prefix() {
        let a = Activity::builder("t1", "Événement.Créé", EntityRef::user("alice"))
            .tags(&["Ünicode"])
            .build();
        assert!(filter_matches(&RelationshipFilter::new().type_keys(&["ÉVÉNEMENT.CRÉÉ"]), &a));
        assert!(filter_matches(&RelationshipFilter::new().type_key_prefixes(&["événement."]), &a));
        assert!(filter_matches(&RelationshipFilter::new().required_tags_any(&["ünicode"]), &a));
        assert!(!filter_matches(&RelationshipFilter::new().excluded_tags_any(&["ÜNICODE"]), &a));
    }

    #[test]
    fn test_filter_tags() {
        let a = activity();
        assert!(filter_matches(&RelationshipFilter::new().required_tags_any(&["rust", "go"]), &a));
        assert!(!filter_matches(&RelationshipFilter::new().required_tags_any(&["go"]), &a));
        assert!(!filter_matches(&RelationshipFilter::new().excluded_tags_any(&["NEWS"]), &a));
        assert!(filter_matches(&RelationshipFilter::new().excluded_tags_any(&["sports"]), &a));
    }

    #[test]
    fn test_filter_clauses_are_anded() {
        let a = activity();
        let filter = RelationshipFilter::new()
            .type_key_prefixes(&["post."])
            .allowed_visibilities(&[Visibility::Private]);
        assert!(!filter_matches(&filter, &a));
    }

    #[test]
    fn test_empty_lists_are_no_constraint() {
        let a = activity();
        let filter = RelationshipFilter {
            type_keys: Some(vec![]),
            required_tags_any: Some(vec![]),
            ..RelationshipFilter::default()
        };
        assert!(filter_matches(&filter, &a));
    }

    #[test]
    fn test_edge_applies_requires_scope_and_filter() {
        let a = activity();
        let edge = edge_to(EntityRef::user("alice"), RelationshipScope::Any)
            .with_filter(RelationshipFilter::new().type_keys(&["comment.created"]));
        assert!(!edge_applies(&edge, &a));
        assert!(edge_applies(&edge_to(EntityRef::user("alice"), RelationshipScope::Any), &a));
    }
}
