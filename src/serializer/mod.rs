//! Payload deserialization into registered entity types.

use crate::core::{CrudError, Result};
use crate::entity::{Entity, EntityHandle, entity_handle};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Converts a structured payload into an instance of a named type.
pub trait EntityDeserializer: Send + Sync {
    fn deserialize(&self, payload: &JsonValue, target: &str) -> Result<EntityHandle>;
}

type DeserializeFn = Arc<dyn Fn(&JsonValue) -> Result<EntityHandle> + Send + Sync>;
type InstantiateFn = Arc<dyn Fn() -> EntityHandle + Send + Sync>;

#[derive(Clone)]
struct RegisteredType {
    deserialize: DeserializeFn,
    instantiate: InstantiateFn,
}

/// serde-backed registry of entity types, keyed by type name.
#[derive(Clone, Default)]
pub struct EntityTypeRegistry {
    types: HashMap<String, RegisteredType>,
}

impl EntityTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `E` under `name`
    pub fn register<E>(mut self, name: &str) -> Self
    where
        E: Entity + DeserializeOwned + Default,
    {
        self.types.insert(
            name.to_string(),
            RegisteredType {
                deserialize: Arc::new(|payload: &JsonValue| -> Result<EntityHandle> {
                    let entity: E = serde_json::from_value(payload.clone())?;
                    Ok(entity_handle(entity))
                }),
                instantiate: Arc::new(|| -> EntityHandle { entity_handle(E::default()) }),
            },
        );
        self
    }

    /// Blank instance of a registered type.
    pub fn instantiate(&self, target: &str) -> Result<EntityHandle> {
        let registered = self.lookup(target)?;
        Ok((registered.instantiate)())
    }

    fn lookup(&self, target: &str) -> Result<&RegisteredType> {
        self.types
            .get(target)
            .ok_or_else(|| CrudError::UnknownEntity(target.to_string()))
    }
}

impl EntityDeserializer for EntityTypeRegistry {
    fn deserialize(&self, payload: &JsonValue, target: &str) -> Result<EntityHandle> {
        let registered = self.lookup(target)?;
        (registered.deserialize)(payload)
    }
}

impl fmt::Debug for EntityTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.types.keys().collect();
        names.sort();
        f.debug_struct("EntityTypeRegistry")
            .field("types", &names)
            .finish()
    }
}
