use super::EntityDescriptor;
use crate::core::{CrudError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of entity descriptors.
///
/// Immutable once built and cheap to clone: adding a descriptor produces a new
/// registry (copy-on-write), so sessions can hold descriptors without locks.
#[derive(Clone, Debug, Default)]
pub struct MetadataRegistry {
    descriptors: Arc<HashMap<String, Arc<EntityDescriptor>>>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor, returning a NEW registry
    pub fn with_descriptor(self, descriptor: EntityDescriptor) -> Result<Self> {
        let name = descriptor.name().to_string();
        if self.descriptors.contains_key(&name) {
            return Err(CrudError::EntityExists(name));
        }

        let mut descriptors = (*self.descriptors).clone();
        descriptors.insert(name, Arc::new(descriptor));

        Ok(Self {
            descriptors: Arc::new(descriptors),
        })
    }

    pub fn descriptor(&self, name: &str) -> Result<Arc<EntityDescriptor>> {
        self.descriptors
            .get(name)
            .cloned()
            .ok_or_else(|| CrudError::UnknownEntity(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    /// Registered type names, sorted.
    pub fn entity_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.descriptors.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}
