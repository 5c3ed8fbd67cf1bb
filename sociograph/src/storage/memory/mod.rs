//! In-memory store implementations for tests, development and embedding

mod inbox;
mod relationship;

pub use inbox::InMemoryInboxStore;
pub use relationship::InMemoryRelationshipStore;
