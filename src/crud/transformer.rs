use crate::core::{CrudError, Result, camelize, getter_name, setter_name, ucfirst};
use crate::entity::{Entity, EntityCollection, EntityHandle, PropertyValue, Related};
use crate::metadata::{AssociationMapping, EntityDescriptor, MetadataRegistry};
use crate::restriction::Action;
use crate::serializer::EntityDeserializer;
use crate::store::EntityStore;
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Result of applying one payload property to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyOutcome {
    /// The setter was called with the resolved value
    Applied,
    /// Unknown property or action not granted; the value was never resolved
    Denied,
    /// Allowed, but the entity declares no matching setter
    NoSetter,
}

/// Maps request payload properties onto entities.
///
/// Shared across requests; per-entity work happens in a [`TransformSession`]
/// bound to one descriptor.
#[derive(Clone)]
pub struct CrudTransformer {
    metadata: MetadataRegistry,
    deserializer: Arc<dyn EntityDeserializer>,
    store: Arc<dyn EntityStore>,
}

impl CrudTransformer {
    pub fn new(
        metadata: MetadataRegistry,
        deserializer: Arc<dyn EntityDeserializer>,
        store: Arc<dyn EntityStore>,
    ) -> Self {
        Self {
            metadata,
            deserializer,
            store,
        }
    }

    /// Opens a session for one entity type.
    pub fn session(&self, entity_type: &str) -> Result<TransformSession<'_>> {
        let descriptor = self.metadata.descriptor(entity_type)?;
        Ok(TransformSession {
            transformer: self,
            descriptor,
        })
    }

    pub fn metadata(&self) -> &MetadataRegistry {
        &self.metadata
    }

    pub fn store(&self) -> &dyn EntityStore {
        self.store.as_ref()
    }

    /// Setter name for a payload property (`category_id` -> `setCategoryId`).
    pub fn property_setter(property: &str) -> String {
        setter_name(property)
    }

    /// Getter name for a payload property (`id` -> `getId`).
    pub fn property_getter(property: &str) -> String {
        getter_name(property)
    }
}

impl fmt::Debug for CrudTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrudTransformer")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Transformation scope for one entity type.
pub struct TransformSession<'a> {
    transformer: &'a CrudTransformer,
    descriptor: Arc<EntityDescriptor>,
}

impl<'a> TransformSession<'a> {
    pub fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }

    /// Canonical metadata spelling of a payload property.
    ///
    /// The camel-cased name, or its capitalized form when an association is
    /// registered under that spelling.
    pub fn canonical_property(&self, property: &str) -> String {
        let camel = camelize(property);
        let capitalized = ucfirst(&camel);
        if self.descriptor.has_association(&capitalized) {
            capitalized
        } else {
            camel
        }
    }

    fn association(&self, property: &str) -> Option<&AssociationMapping> {
        self.descriptor.association(&self.canonical_property(property))
    }

    /// Whether `action` may write `property`. Unknown properties are never accessible.
    pub fn is_property_accessible(&self, property: &str, action: Action) -> bool {
        let canonical = self.canonical_property(property);
        if !self.descriptor.has_field(&canonical) && !self.descriptor.has_association(&canonical) {
            return false;
        }

        match self.descriptor.restriction(&canonical) {
            Some(restriction) => restriction.is_granted(action),
            None => true,
        }
    }

    /// Resolves a raw payload value into what the setter receives.
    ///
    /// Scalars and nulls pass through untouched; association values become
    /// collection members, persisted or transient instances, or lazy references.
    pub fn transform_property_value(
        &self,
        property: &str,
        value: JsonValue,
        collection: Option<&EntityCollection>,
    ) -> Result<PropertyValue> {
        if value.is_null() {
            return Ok(PropertyValue::Scalar(value));
        }
        let Some(association) = self.association(property) else {
            return Ok(PropertyValue::Scalar(value));
        };
        let target = association.target.as_str();

        match value {
            JsonValue::Array(items) if association.is_collection() => items
                .into_iter()
                .map(|item| self.resolve_association(target, item, collection))
                .collect::<Result<Vec<_>>>()
                .map(PropertyValue::Collection),
            value => self
                .resolve_association(target, value, collection)
                .map(PropertyValue::Related),
        }
    }

    fn resolve_association(
        &self,
        target: &str,
        value: JsonValue,
        collection: Option<&EntityCollection>,
    ) -> Result<Related> {
        if let Some(collection) = collection {
            if let Some(member) = self.find_by_identifier(collection, &value)? {
                trace!(target_type = target, %value, "reusing collection member");
                return Ok(Related::Loaded(member));
            }
        }
        self.resolve_detached(target, value)
    }

    fn resolve_detached(&self, target: &str, value: JsonValue) -> Result<Related> {
        if !value.is_object() {
            trace!(target_type = target, %value, "lazy reference");
            return Ok(Related::Lazy(self.transformer.store.reference(target, value)));
        }

        let transient = self.transformer.deserializer.deserialize(&value, target)?;
        let identifier = {
            let target_descriptor = self.transformer.metadata.descriptor(target)?;
            let getter = getter_name(target_descriptor.identifier_field());
            transient.read()?.read(&getter)
        };

        if let Some(identifier) = identifier.filter(|id| !id.is_null()) {
            if let Some(persisted) = self.transformer.store.find(target, &identifier)? {
                trace!(target_type = target, %identifier, "using persisted instance");
                return Ok(Related::Loaded(persisted));
            }
        }

        trace!(target_type = target, "using transient instance");
        Ok(Related::Loaded(transient))
    }

    /// Last collection member whose identifier equals `value`.
    fn find_by_identifier(
        &self,
        collection: &EntityCollection,
        value: &JsonValue,
    ) -> Result<Option<EntityHandle>> {
        let getter = getter_name(self.descriptor.identifier_field());
        collection.find_by(&getter, value)
    }

    /// Checks access, resolves the value and applies it through the setter.
    ///
    /// Access is always decided before the value is resolved: a denied
    /// property triggers no deserialization and no store lookup.
    pub fn process_property_value(
        &self,
        object: &mut dyn Entity,
        property: &str,
        value: JsonValue,
        action: Action,
        collection: Option<&EntityCollection>,
    ) -> Result<PropertyOutcome> {
        if !self.is_property_accessible(property, action) {
            debug!(
                entity = self.descriptor.name(),
                property,
                %action,
                "property not accessible"
            );
            return Ok(PropertyOutcome::Denied);
        }

        let value = self.transform_property_value(property, value, collection)?;
        let setter = CrudTransformer::property_setter(property);
        if !object.supports_setter(&setter) {
            debug!(entity = self.descriptor.name(), property, setter = %setter, "no setter");
            return Ok(PropertyOutcome::NoSetter);
        }

        object.apply(&setter, value)?;
        Ok(PropertyOutcome::Applied)
    }

    /// Applies every entry of an object payload, in key order.
    ///
    /// To-many associations are resolved against the members the entity
    /// already holds.
    pub fn process_payload(
        &self,
        object: &mut dyn Entity,
        payload: &JsonMap<String, JsonValue>,
        action: Action,
    ) -> Result<Vec<(String, PropertyOutcome)>> {
        let mut outcomes = Vec::with_capacity(payload.len());
        for (property, value) in payload {
            let existing = match self.association(property) {
                Some(association) if association.is_collection() => {
                    object.related_collection(&CrudTransformer::property_getter(property))
                }
                _ => None,
            };
            let outcome = self.process_property_value(
                object,
                property,
                value.clone(),
                action,
                existing.as_ref(),
            )?;
            outcomes.push((property.clone(), outcome));
        }
        Ok(outcomes)
    }

    /// Like [`process_payload`](Self::process_payload) for a JSON value that must be an object.
    pub fn process_value(
        &self,
        object: &mut dyn Entity,
        payload: &JsonValue,
        action: Action,
    ) -> Result<Vec<(String, PropertyOutcome)>> {
        let map = payload.as_object().ok_or_else(|| {
            CrudError::invalid_value(self.descriptor.name(), "payload must be a JSON object")
        })?;
        self.process_payload(object, map, action)
    }
}
