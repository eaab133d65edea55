use super::EntityHandle;
use crate::core::Result;
use serde_json::Value as JsonValue;

/// Ordered set of entities already attached to an owner.
#[derive(Debug, Clone, Default)]
pub struct EntityCollection {
    items: Vec<EntityHandle>,
}

impl EntityCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: EntityHandle) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityHandle> {
        self.items.iter()
    }

    /// Member whose `getter` returns exactly `value`.
    ///
    /// Every member is inspected and the LAST match wins when identifiers repeat.
    pub fn find_by(&self, getter: &str, value: &JsonValue) -> Result<Option<EntityHandle>> {
        let mut found = None;
        for item in &self.items {
            if item.read()?.read(getter).as_ref() == Some(value) {
                found = Some(item.clone());
            }
        }
        Ok(found)
    }
}

impl From<Vec<EntityHandle>> for EntityCollection {
    fn from(items: Vec<EntityHandle>) -> Self {
        Self { items }
    }
}

impl FromIterator<EntityHandle> for EntityCollection {
    fn from_iter<I: IntoIterator<Item = EntityHandle>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for EntityCollection {
    type Item = EntityHandle;
    type IntoIter = std::vec::IntoIter<EntityHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
