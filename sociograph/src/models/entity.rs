//! Entity references used as the endpoints of every edge, inbox item and request.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Reference to any addressable participant: a user, an object, a service.
///
/// Equality and hashing use the case-sensitive `(kind, entity_type, id)`
/// triple. The display name is carried along for presentation only and never
/// affects identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRef {
    /// Broad category of the participant (`user`, `object`, `service`, ...)
    pub kind: String,

    /// Type within the kind (`person`, `post`, `group`, ...)
    pub entity_type: String,

    /// Identifier, unique within `(kind, entity_type)`
    pub id: String,

    /// Optional human readable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl EntityRef {
    /// Create a new entity reference without a display name
    pub fn new(
        kind: impl Into<String>,
        entity_type: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            entity_type: entity_type.into(),
            id: id.into(),
            display_name: None,
        }
    }

    /// Shorthand for a `user/person` reference
    pub fn user(id: impl Into<String>) -> Self {
        Self::new("user", "person", id)
    }

    /// Shorthand for an `object` reference of the given type
    pub fn object(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new("object", entity_type, id)
    }

    /// Shorthand for a `service` reference
    pub fn service(id: impl Into<String>) -> Self {
        Self::new("service", "app", id)
    }

    /// Attach a display name
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Stable textual key (`kind/type/id`) used when building dedup and thread keys
    pub fn key(&self) -> String {
        format!("{}/{}/{}", self.kind, self.entity_type, self.id)
    }

    /// True when any identifying component is blank
    pub fn is_blank(&self) -> bool {
        self.kind.trim().is_empty() || self.entity_type.trim().is_empty() || self.id.trim().is_empty()
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.entity_type == other.entity_type && self.id == other.id
    }
}

impl Eq for EntityRef {}

impl Hash for EntityRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.entity_type.hash(state);
        self.id.hash(state);
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.display_name {
            Some(name) => write!(f, "{} ({})", self.key(), name),
            None => write!(f, "{}", self.key()),
        }
    }
}
