//! Domain models for entities, activities, edges, inbox items and requests

pub mod activity;
pub mod decision;
pub mod edge;
pub mod entity;
pub mod inbox;
pub mod request;

// Re-export important models
pub use activity::{Activity, ActivityBuilder, Visibility};
pub use decision::{DecisionKind, DecisionReason, RelationshipDecision};
pub use edge::{EdgeKey, RelationshipEdge, RelationshipFilter, RelationshipKind, RelationshipScope};
pub use entity::EntityRef;
pub use inbox::{AddOutcome, AddResult, InboxEvent, InboxItem, InboxItemKind, InboxStatus};
pub use request::{FollowRequest, NewFollowRequest, RequestStatus, RequestTransition};
