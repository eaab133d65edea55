use super::{EmbeddedFlag, InheritedEmbedding, RenderableResult};
use crate::core::Result;
use crate::entity::EntityHandle;
use crate::store::EntityStore;
use serde_json::{Value as JsonValue, json};

/// Results that know how to turn themselves into JSON.
pub trait Render {
    /// `inherited` is the display mode handed down by an enclosing collection.
    fn render(&self, inherited: Option<bool>, store: &dyn EntityStore) -> Result<JsonValue>;
}

/// Single entity result.
#[derive(Debug, Clone)]
pub struct EntityResponse {
    entity: EntityHandle,
    show_associations: Option<bool>,
}

impl EntityResponse {
    pub fn new(entity: EntityHandle) -> Self {
        Self {
            entity,
            show_associations: None,
        }
    }

    /// Preset display mode; the query parameter no longer applies.
    pub fn with_show_associations(mut self, show: bool) -> Self {
        self.show_associations = Some(show);
        self
    }

    pub fn entity(&self) -> &EntityHandle {
        &self.entity
    }
}

impl EmbeddedFlag for EntityResponse {
    fn show_associations(&self) -> Option<bool> {
        self.show_associations
    }

    fn set_show_associations(&mut self, show: bool) {
        self.show_associations = Some(show);
    }
}

impl RenderableResult for EntityResponse {
    fn embedded_flag(&mut self) -> Option<&mut dyn EmbeddedFlag> {
        Some(self)
    }
}

impl Render for EntityResponse {
    fn render(&self, inherited: Option<bool>, store: &dyn EntityStore) -> Result<JsonValue> {
        let embed = self.show_associations.or(inherited).unwrap_or(false);
        let entity = self.entity.read()?;
        entity.render(embed, store)
    }
}

/// Collection result wrapper.
///
/// Members without their own preference render with the inherited flag.
#[derive(Debug, Clone)]
pub struct CollectionResponse<T> {
    items: Vec<T>,
    show_associations: Option<bool>,
    inherited_show_associations: Option<bool>,
}

impl<T> CollectionResponse<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            show_associations: None,
            inherited_show_associations: None,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn inherited_show_associations(&self) -> Option<bool> {
        self.inherited_show_associations
    }
}

impl<T> FromIterator<T> for CollectionResponse<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> EmbeddedFlag for CollectionResponse<T> {
    fn show_associations(&self) -> Option<bool> {
        self.show_associations
    }

    fn set_show_associations(&mut self, show: bool) {
        self.show_associations = Some(show);
    }
}

impl<T> InheritedEmbedding for CollectionResponse<T> {
    fn set_inherited_show_associations(&mut self, show: bool) {
        self.inherited_show_associations = Some(show);
    }
}

impl<T> RenderableResult for CollectionResponse<T> {
    fn embedded_flag(&mut self) -> Option<&mut dyn EmbeddedFlag> {
        Some(self)
    }

    fn inherited_embedding(&mut self) -> Option<&mut dyn InheritedEmbedding> {
        Some(self)
    }
}

impl<T: Render> Render for CollectionResponse<T> {
    fn render(&self, _inherited: Option<bool>, store: &dyn EntityStore) -> Result<JsonValue> {
        let items = self
            .items
            .iter()
            .map(|item| item.render(self.inherited_show_associations, store))
            .collect::<Result<Vec<_>>>()?;

        Ok(json!({
            "count": items.len(),
            "items": items,
        }))
    }
}
