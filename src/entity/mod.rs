//! Entity capability contracts.
//!
//! Writable entity types implement [`Entity`]: they declare the setter names
//! they answer to and apply resolved [`PropertyValue`]s through one uniform
//! method, so the transformer never needs runtime reflection.

pub mod collection;
pub mod reference;

pub use collection::EntityCollection;
pub use reference::EntityReference;

use crate::core::{CrudError, Result, getter_name};
use crate::store::EntityStore;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Shared, lockable entity instance. Identity is pointer identity.
pub type EntityHandle = Arc<RwLock<dyn Entity>>;

/// Wraps an entity into a shared handle.
pub fn entity_handle<E: Entity>(entity: E) -> EntityHandle {
    Arc::new(RwLock::new(entity))
}

/// Core trait for entities that can be patched from request payloads.
pub trait Entity: fmt::Debug + Send + Sync + 'static {
    /// Returns the registered type name of the entity.
    fn entity_type(&self) -> &'static str;
    /// Setter names (`setName`, `setCategory`, ...) this type recognizes.
    fn setters(&self) -> &'static [&'static str];
    /// Applies a resolved value through the named setter.
    fn apply(&mut self, setter: &str, value: PropertyValue) -> Result<()>;
    /// Reads a scalar through the named getter (`getId`, ...).
    fn read(&self, getter: &str) -> Option<JsonValue>;
    /// Renders the entity; `embed` selects full nested associations over identifiers.
    fn render(&self, embed: bool, store: &dyn EntityStore) -> Result<JsonValue>;
    fn as_any(&self) -> &dyn Any;

    /// Members of a to-many association already attached to this entity.
    fn related_collection(&self, _getter: &str) -> Option<EntityCollection> {
        None
    }

    /// Value of the conventional `id` field.
    fn identifier(&self) -> Option<JsonValue> {
        self.read(&getter_name("id"))
    }

    fn supports_setter(&self, setter: &str) -> bool {
        self.setters().contains(&setter)
    }
}

/// Entity reached through an association.
#[derive(Debug, Clone)]
pub enum Related {
    /// Instance already in memory (persisted, transient or a collection member)
    Loaded(EntityHandle),
    /// Not yet fetched; resolved on first load
    Lazy(EntityReference),
}

impl Related {
    pub fn identifier(&self) -> Result<Option<JsonValue>> {
        match self {
            Self::Loaded(handle) => Ok(handle.read()?.identifier()),
            Self::Lazy(reference) => Ok(Some(reference.identifier().clone())),
        }
    }

    /// Returns the in-memory handle, fetching a lazy reference if needed.
    pub fn load(&self, store: &dyn EntityStore) -> Result<EntityHandle> {
        match self {
            Self::Loaded(handle) => Ok(handle.clone()),
            Self::Lazy(reference) => reference.load(store),
        }
    }

    pub fn as_handle(&self) -> Option<&EntityHandle> {
        match self {
            Self::Loaded(handle) => Some(handle),
            Self::Lazy(_) => None,
        }
    }

    /// Full nested rendering when `embed`, bare identifier otherwise.
    pub fn render(&self, embed: bool, store: &dyn EntityStore) -> Result<JsonValue> {
        if embed {
            let handle = self.load(store)?;
            let entity = handle.read()?;
            entity.render(false, store)
        } else {
            Ok(self.identifier()?.unwrap_or(JsonValue::Null))
        }
    }
}

/// Value handed to an entity setter after transformation.
#[derive(Debug, Clone)]
pub enum PropertyValue {
    Scalar(JsonValue),
    Related(Related),
    Collection(Vec<Related>),
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(JsonValue::Null))
    }

    pub fn as_scalar(&self) -> Option<&JsonValue> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Decodes a scalar payload into `T`.
    pub fn into_scalar<T: DeserializeOwned>(self, property: &str) -> Result<T> {
        match self {
            Self::Scalar(value) => serde_json::from_value(value)
                .map_err(|err| CrudError::invalid_value(property, err.to_string())),
            _ => Err(CrudError::invalid_value(property, "expected a scalar value")),
        }
    }

    /// `None` for an explicit null, otherwise the related entity.
    pub fn into_related(self, property: &str) -> Result<Option<Related>> {
        match self {
            Self::Scalar(JsonValue::Null) => Ok(None),
            Self::Related(related) => Ok(Some(related)),
            _ => Err(CrudError::invalid_value(property, "expected an association")),
        }
    }

    pub fn into_collection(self, property: &str) -> Result<Vec<Related>> {
        match self {
            Self::Scalar(JsonValue::Null) => Ok(Vec::new()),
            Self::Collection(items) => Ok(items),
            Self::Related(related) => Ok(vec![related]),
            _ => Err(CrudError::invalid_value(
                property,
                "expected a collection of associations",
            )),
        }
    }
}
