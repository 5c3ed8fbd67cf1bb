//! Request validation that reports every offending field at once

use crate::models::{Activity, EntityRef, InboxItem, NewFollowRequest, RelationshipEdge};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One invalid field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every field error found in one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Record an error when `value` is blank
    pub fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "is required");
        }
    }

    /// Record an error when any component of `entity` is blank
    pub fn require_entity(&mut self, field: &str, entity: &EntityRef) {
        if entity.is_blank() {
            self.add(field, "kind, type and id are required");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Names of the offending fields, in the order they were found
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error
    pub fn into_result(self) -> crate::Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(crate::SociographError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{} {}", err.field, err.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

pub(crate) fn validate_edge(edge: &RelationshipEdge) -> crate::Result<()> {
    let mut errors = ValidationErrors::new();
    errors.require("tenant_id", &edge.tenant_id);
    errors.require_entity("from", &edge.from);
    errors.require_entity("to", &edge.to);
    errors.into_result()
}

pub(crate) fn validate_activity(activity: &Activity) -> crate::Result<()> {
    let mut errors = ValidationErrors::new();
    errors.require("id", &activity.id);
    errors.require("tenant_id", &activity.tenant_id);
    errors.require("type_key", &activity.type_key);
    errors.require_entity("actor", &activity.actor);
    for (i, target) in activity.targets.iter().enumerate() {
        errors.require_entity(&format!("targets[{}]", i), target);
    }
    if let Some(owner) = &activity.owner {
        errors.require_entity("owner", owner);
    }
    errors.into_result()
}

pub(crate) fn validate_follow_request(request: &NewFollowRequest) -> crate::Result<()> {
    let mut errors = ValidationErrors::new();
    errors.require("tenant_id", &request.tenant_id);
    errors.require_entity("requester", &request.requester);
    errors.require_entity("target", &request.target);
    errors.require("idempotency_key", &request.idempotency_key);
    if request.requester == request.target && !request.requester.is_blank() {
        errors.add("target", "must differ from requester");
    }
    errors.into_result()
}

pub(crate) fn validate_inbox_item(item: &InboxItem) -> crate::Result<()> {
    let mut errors = ValidationErrors::new();
    errors.require("tenant_id", &item.tenant_id);
    errors.require_entity("recipient", &item.recipient);
    errors.require("dedup_key", &item.dedup_key);
    if item.thread_key.as_deref().is_some_and(|key| key.trim().is_empty()) {
        errors.add("thread_key", "must not be blank when present");
    }
    errors.into_result()
}
