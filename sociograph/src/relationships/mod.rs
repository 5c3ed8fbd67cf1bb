//! Relationship Engine
//!
//! Stores directed, typed, scoped edges between entities and evaluates the
//! priority-ordered visibility decision for a viewer and an activity.

pub mod decision;
pub mod engine;
pub mod matching;

pub use decision::{DECISION_KINDS, decide};
pub use engine::RelationshipEngine;
pub use matching::{edge_applies, filter_matches, scope_matches};
