//! Persistence collaborator used to resolve associations.

pub mod memory;

pub use memory::InMemoryEntityStore;

use crate::core::Result;
use crate::entity::{EntityHandle, EntityReference};
use serde_json::Value as JsonValue;

/// Storage the transformer resolves associations against.
pub trait EntityStore: Send + Sync {
    /// Eager lookup; `None` when no record has this identifier.
    fn find(&self, target: &str, identifier: &JsonValue) -> Result<Option<EntityHandle>>;

    /// Lazy reference; no existence check is performed.
    fn reference(&self, target: &str, identifier: JsonValue) -> EntityReference {
        EntityReference::new(target, identifier)
    }

    /// Stores (or replaces) the entity under its identifier.
    fn persist(&self, target: &str, identifier: JsonValue, entity: EntityHandle) -> Result<()>;

    /// Stores a new entity; fails with `DuplicateIdentifier` if the identifier is taken.
    fn insert(&self, target: &str, identifier: JsonValue, entity: EntityHandle) -> Result<()>;

    /// All entities of one type in insertion order.
    fn all(&self, target: &str) -> Result<Vec<EntityHandle>>;

    /// Next free integer identifier for a type.
    fn next_identifier(&self, target: &str) -> Result<JsonValue>;
}
