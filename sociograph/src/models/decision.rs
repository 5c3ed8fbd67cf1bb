//! Outcome of a visibility evaluation

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    Allowed,
    Denied,
    /// Visible but suppressed (muted)
    Hidden,
}

/// The rule that produced a decision
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    SelfAuthored,
    Block,
    Deny,
    Visibility,
    Mute,
    Allow,
    Default,
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DecisionReason::SelfAuthored => "self_authored",
            DecisionReason::Block => "block",
            DecisionReason::Deny => "deny",
            DecisionReason::Visibility => "visibility",
            DecisionReason::Mute => "mute",
            DecisionReason::Allow => "allow",
            DecisionReason::Default => "default",
        };
        write!(f, "{}", name)
    }
}

/// Computed answer to "can viewer V see activity A". Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelationshipDecision {
    pub kind: DecisionKind,
    pub allowed: bool,
    pub reason: DecisionReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_edge_id: Option<String>,
}

impl RelationshipDecision {
    pub fn allowed(reason: DecisionReason, matched_edge_id: Option<String>) -> Self {
        Self {
            kind: DecisionKind::Allowed,
            allowed: true,
            reason,
            matched_edge_id,
        }
    }

    pub fn denied(reason: DecisionReason, matched_edge_id: Option<String>) -> Self {
        Self {
            kind: DecisionKind::Denied,
            allowed: false,
            reason,
            matched_edge_id,
        }
    }

    /// Muted: `allowed` stays true, but the kind is `Hidden`
    pub fn hidden(reason: DecisionReason, matched_edge_id: Option<String>) -> Self {
        Self {
            kind: DecisionKind::Hidden,
            allowed: true,
            reason,
            matched_edge_id,
        }
    }

    /// True when fan-out should deliver to the viewer
    pub fn is_deliverable(&self) -> bool {
        self.kind == DecisionKind::Allowed
    }
}

impl fmt::Display for RelationshipDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{}", self.kind, self.reason)?;
        if let Some(edge_id) = &self.matched_edge_id {
            write!(f, " (edge {})", edge_id)?;
        }
        Ok(())
    }
}
