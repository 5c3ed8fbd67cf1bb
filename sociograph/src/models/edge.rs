//! Directed, typed, scoped relationship edges

use super::activity::Visibility;
use super::entity::EntityRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What an edge expresses about `from`'s relation to `to`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    Follow,
    Subscribe,
    Block,
    Mute,
    Allow,
    Deny,
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelationshipKind::Follow => "follow",
            RelationshipKind::Subscribe => "subscribe",
            RelationshipKind::Block => "block",
            RelationshipKind::Mute => "mute",
            RelationshipKind::Allow => "allow",
            RelationshipKind::Deny => "deny",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for RelationshipKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "follow" => Ok(RelationshipKind::Follow),
            "subscribe" => Ok(RelationshipKind::Subscribe),
            "block" => Ok(RelationshipKind::Block),
            "mute" => Ok(RelationshipKind::Mute),
            "allow" => Ok(RelationshipKind::Allow),
            "deny" => Ok(RelationshipKind::Deny),
            _ => Err(format!("Invalid relationship kind: {}", s)),
        }
    }
}

/// Which role within an activity an edge applies to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipScope {
    #[default]
    Any,
    ActorOnly,
    TargetOnly,
    OwnerOnly,
}

impl fmt::Display for RelationshipScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelationshipScope::Any => "any",
            RelationshipScope::ActorOnly => "actor_only",
            RelationshipScope::TargetOnly => "target_only",
            RelationshipScope::OwnerOnly => "owner_only",
        };
        write!(f, "{}", name)
    }
}

/// Optional narrowing of an edge to certain activities.
///
/// Populated fields are ANDed; values inside one list are ORed. `None` and an
/// empty list both mean "no constraint from this field".
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RelationshipFilter {
    /// Exact type keys, compared case-insensitively
    pub type_keys: Option<Vec<String>>,

    /// Type key prefixes, compared case-insensitively
    pub type_key_prefixes: Option<Vec<String>>,

    /// At least one of these tags must be present
    pub required_tags_any: Option<Vec<String>>,

    /// None of these tags may be present
    pub excluded_tags_any: Option<Vec<String>>,

    /// Activity visibility must be one of these
    pub allowed_visibilities: Option<Vec<Visibility>>,
}

impl RelationshipFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn type_keys<S: AsRef<str>>(mut self, keys: &[S]) -> Self {
        self.type_keys = Some(keys.iter().map(|k| k.as_ref().to_string()).collect());
        self
    }

    pub fn type_key_prefixes<S: AsRef<str>>(mut self, prefixes: &[S]) -> Self {
        self.type_key_prefixes = Some(prefixes.iter().map(|p| p.as_ref().to_string()).collect());
        self
    }

    pub fn required_tags_any<S: AsRef<str>>(mut self, tags: &[S]) -> Self {
        self.required_tags_any = Some(tags.iter().map(|t| t.as_ref().to_string()).collect());
        self
    }

    pub fn excluded_tags_any<S: AsRef<str>>(mut self, tags: &[S]) -> Self {
        self.excluded_tags_any = Some(tags.iter().map(|t| t.as_ref().to_string()).collect());
        self
    }

    pub fn allowed_visibilities(mut self, visibilities: &[Visibility]) -> Self {
        self.allowed_visibilities = Some(visibilities.to_vec());
        self
    }
}

/// Uniqueness key of an edge: at most one stored edge per key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub tenant_id: String,
    pub from: EntityRef,
    pub to: EntityRef,
    pub kind: RelationshipKind,
    pub scope: RelationshipScope,
}

/// A stored relationship between two entities
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelationshipEdge {
    /// Assigned by the engine on first upsert; empty until then
    #[serde(default)]
    pub id: String,
    pub tenant_id: String,
    pub from: EntityRef,
    pub to: EntityRef,
    pub kind: RelationshipKind,
    #[serde(default)]
    pub scope: RelationshipScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<RelationshipFilter>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl RelationshipEdge {
    /// Create an active, unscoped, unfiltered, non-expiring edge
    pub fn new(
        tenant_id: impl Into<String>,
        from: EntityRef,
        to: EntityRef,
        kind: RelationshipKind,
    ) -> Self {
        Self {
            id: String::new(),
            tenant_id: tenant_id.into(),
            from,
            to,
            kind,
            scope: RelationshipScope::Any,
            filter: None,
            is_active: true,
            created_at: Utc::now(),
            expires_at: None,
        }
    }

    pub fn follow(tenant_id: impl Into<String>, from: EntityRef, to: EntityRef) -> Self {
        Self::new(tenant_id, from, to, RelationshipKind::Follow)
    }

    pub fn subscribe(tenant_id: impl Into<String>, from: EntityRef, to: EntityRef) -> Self {
        Self::new(tenant_id, from, to, RelationshipKind::Subscribe)
    }

    pub fn block(tenant_id: impl Into<String>, from: EntityRef, to: EntityRef) -> Self {
        Self::new(tenant_id, from, to, RelationshipKind::Block)
    }

    pub fn mute(tenant_id: impl Into<String>, from: EntityRef, to: EntityRef) -> Self {
        Self::new(tenant_id, from, to, RelationshipKind::Mute)
    }

    pub fn with_scope(mut self, scope: RelationshipScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_filter(mut self, filter: RelationshipFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// The uniqueness key `(tenant, from, to, kind, scope)`
    pub fn key(&self) -> EdgeKey {
        EdgeKey {
            tenant_id: self.tenant_id.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
            kind: self.kind,
            scope: self.scope,
        }
    }

    /// True once `expires_at` has been reached
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Active and not expired at `now`
    pub fn is_effective(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now)
    }
}
