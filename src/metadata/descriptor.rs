use crate::restriction::{Action, PropertyRestriction};
use std::collections::BTreeMap;

/// Cardinality of an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationKind {
    /// Single related entity (many-to-one, one-to-one)
    ToOne,
    /// Collection of related entities (one-to-many, many-to-many)
    ToMany,
}

/// Mapping of one scalar field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    pub restriction: Option<PropertyRestriction>,
}

/// Mapping of one association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationMapping {
    /// Type name of the related entity
    pub target: String,
    pub kind: AssociationKind,
    pub restriction: Option<PropertyRestriction>,
}

impl AssociationMapping {
    pub fn is_collection(&self) -> bool {
        self.kind == AssociationKind::ToMany
    }
}

/// Mapping metadata for one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    name: String,
    identifier: String,
    fields: BTreeMap<String, FieldMapping>,
    associations: BTreeMap<String, AssociationMapping>,
}

impl EntityDescriptor {
    /// Starts a descriptor whose identifier field is `id`.
    pub fn builder(name: impl Into<String>) -> EntityDescriptorBuilder {
        EntityDescriptorBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the single identifier field
    pub fn identifier_field(&self) -> &str {
        &self.identifier
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn has_association(&self, name: &str) -> bool {
        self.associations.contains_key(name)
    }

    pub fn association(&self, name: &str) -> Option<&AssociationMapping> {
        self.associations.get(name)
    }

    /// Restriction declared on a field or association, if any.
    pub fn restriction(&self, property: &str) -> Option<&PropertyRestriction> {
        if let Some(field) = self.fields.get(property) {
            return field.restriction.as_ref();
        }
        self.associations
            .get(property)
            .and_then(|a| a.restriction.as_ref())
    }
}

/// Fluent builder for [`EntityDescriptor`].
#[derive(Debug, Clone)]
pub struct EntityDescriptorBuilder {
    descriptor: EntityDescriptor,
}

impl EntityDescriptorBuilder {
    fn new(name: impl Into<String>) -> Self {
        let identifier = "id".to_string();
        let mut fields = BTreeMap::new();
        fields.insert(identifier.clone(), FieldMapping::default());
        Self {
            descriptor: EntityDescriptor {
                name: name.into(),
                identifier,
                fields,
                associations: BTreeMap::new(),
            },
        }
    }

    /// Set the identifier field (registered as a field as well)
    pub fn identifier(mut self, name: &str) -> Self {
        let previous = std::mem::replace(&mut self.descriptor.identifier, name.to_string());
        if previous != name {
            self.descriptor.fields.remove(&previous);
        }
        self.descriptor
            .fields
            .entry(name.to_string())
            .or_default();
        self
    }

    pub fn field(mut self, name: &str) -> Self {
        self.descriptor
            .fields
            .insert(name.to_string(), FieldMapping::default());
        self
    }

    /// Field writable only by the listed actions
    pub fn restricted_field(
        mut self,
        name: &str,
        granted: impl IntoIterator<Item = Action>,
    ) -> Self {
        self.descriptor.fields.insert(
            name.to_string(),
            FieldMapping {
                restriction: Some(PropertyRestriction::new(granted)),
            },
        );
        self
    }

    pub fn association(mut self, name: &str, target: &str, kind: AssociationKind) -> Self {
        self.descriptor.associations.insert(
            name.to_string(),
            AssociationMapping {
                target: target.to_string(),
                kind,
                restriction: None,
            },
        );
        self
    }

    /// Association writable only by the listed actions
    pub fn restricted_association(
        mut self,
        name: &str,
        target: &str,
        kind: AssociationKind,
        granted: impl IntoIterator<Item = Action>,
    ) -> Self {
        self.descriptor.associations.insert(
            name.to_string(),
            AssociationMapping {
                target: target.to_string(),
                kind,
                restriction: Some(PropertyRestriction::new(granted)),
            },
        );
        self
    }

    pub fn build(self) -> EntityDescriptor {
        self.descriptor
    }
}
