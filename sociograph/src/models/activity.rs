//! Published activities as seen by the visibility engine and fan-out

use super::entity::EntityRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Audience of an activity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Anyone may see it
    #[default]
    Public,
    /// Visible inside the tenant, subject to graph rules
    Internal,
    /// Only the actor, the owner and listed targets may see it
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Internal => write!(f, "internal"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "internal" => Ok(Visibility::Internal),
            "private" => Ok(Visibility::Private),
            _ => Err(format!("Invalid visibility: {}", s)),
        }
    }
}

/// An activity handed to the core by the publishing service.
///
/// `type_key` is a dotted verb such as `post.created` or `comment.liked`;
/// filters match against it case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub id: String,
    pub tenant_id: String,
    pub type_key: String,
    pub actor: EntityRef,
    #[serde(default)]
    pub targets: Vec<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<EntityRef>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub tags: Vec<String>,
    pub occurred_at: DateTime<Utc>,
}

impl Activity {
    /// Start building an activity
    pub fn builder(
        tenant_id: impl Into<String>,
        type_key: impl Into<String>,
        actor: EntityRef,
    ) -> ActivityBuilder {
        ActivityBuilder::new(tenant_id, type_key, actor)
    }

    /// True when `entity` is the actor, the owner or one of the targets
    pub fn involves(&self, entity: &EntityRef) -> bool {
        self.actor == *entity
            || self.owner.as_ref() == Some(entity)
            || self.targets.iter().any(|t| t == entity)
    }

    /// Case-insensitive tag membership
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == tag)
    }
}

/// Builder for [`Activity`]
#[derive(Debug, Clone)]
pub struct ActivityBuilder {
    activity: Activity,
}

impl ActivityBuilder {
    pub fn new(tenant_id: impl Into<String>, type_key: impl Into<String>, actor: EntityRef) -> Self {
        Self {
            activity: Activity {
                id: uuid::Uuid::now_v7().to_string(),
                tenant_id: tenant_id.into(),
                type_key: type_key.into(),
                actor,
                targets: Vec::new(),
                owner: None,
                visibility: Visibility::Public,
                tags: Vec::new(),
                occurred_at: Utc::now(),
            },
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.activity.id = id.into();
        self
    }

    pub fn target(mut self, target: EntityRef) -> Self {
        self.activity.targets.push(target);
        self
    }

    pub fn targets(mut self, targets: impl IntoIterator<Item = EntityRef>) -> Self {
        self.activity.targets.extend(targets);
        self
    }

    pub fn owner(mut self, owner: EntityRef) -> Self {
        self.activity.owner = Some(owner);
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.activity.visibility = visibility;
        self
    }

    pub fn tags<S: AsRef<str>>(mut self, tags: &[S]) -> Self {
        self.activity
            .tags
            .extend(tags.iter().map(|t| t.as_ref().to_string()));
        self
    }

    pub fn occurred_at(mut self, at: DateTime<Utc>) -> Self {
        self.activity.occurred_at = at;
        self
    }

    pub fn build(self) -> Activity {
        self.activity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_involves_roles() {
        let activity = Activity::builder("t1", "post.created", EntityRef::user("alice"))
            .target(EntityRef::object("post", "1"))
            .owner(EntityRef::object("group", "g"))
            .build();

        assert!(activity.involves(&EntityRef::user("alice")));
        assert!(activity.involves(&EntityRef::object("post", "1")));
        assert!(activity.involves(&EntityRef::object("group", "g")));
        assert!(!activity.involves(&EntityRef::user("bob")));
    }

    #[test]
    fn test_visibility_parse() {
        assert_eq!("PRIVATE".parse::<Visibility>().unwrap(), Visibility::Private);
        assert!("secret".parse::<Visibility>().is_err());
    }
}
