//! Demo catalog: categories, tags and products.
//!
//! Used by the `crudrest` binary and by the test suites.

use crate::core::{CrudError, Result};
use crate::entity::{Entity, EntityCollection, EntityHandle, PropertyValue, Related, entity_handle};
use crate::metadata::{AssociationKind, EntityDescriptor, MetadataRegistry};
use crate::restriction::Action;
use crate::serializer::EntityTypeRegistry;
use crate::store::EntityStore;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use std::any::Any;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Category {
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
}

impl Category {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id: Some(id),
            name: name.to_string(),
        }
    }
}

impl Entity for Category {
    fn entity_type(&self) -> &'static str {
        "Category"
    }

    fn setters(&self) -> &'static [&'static str] {
        &["setId", "setName"]
    }

    fn apply(&mut self, setter: &str, value: PropertyValue) -> Result<()> {
        match setter {
            "setId" => self.id = value.into_scalar("id")?,
            "setName" => self.name = value.into_scalar("name")?,
            other => return Err(CrudError::invalid_value(other, "unknown setter")),
        }
        Ok(())
    }

    fn read(&self, getter: &str) -> Option<JsonValue> {
        match getter {
            "getId" => self.id.map(JsonValue::from),
            "getName" => Some(json!(self.name)),
            _ => None,
        }
    }

    fn render(&self, _embed: bool, _store: &dyn EntityStore) -> Result<JsonValue> {
        Ok(json!({ "id": self.id, "name": self.name }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Tag {
    pub id: Option<i64>,
    #[serde(default)]
    pub label: String,
}

impl Tag {
    pub fn new(id: i64, label: &str) -> Self {
        Self {
            id: Some(id),
            label: label.to_string(),
        }
    }
}

impl Entity for Tag {
    fn entity_type(&self) -> &'static str {
        "Tag"
    }

    fn setters(&self) -> &'static [&'static str] {
        &["setId", "setLabel"]
    }

    fn apply(&mut self, setter: &str, value: PropertyValue) -> Result<()> {
        match setter {
            "setId" => self.id = value.into_scalar("id")?,
            "setLabel" => self.label = value.into_scalar("label")?,
            other => return Err(CrudError::invalid_value(other, "unknown setter")),
        }
        Ok(())
    }

    fn read(&self, getter: &str) -> Option<JsonValue> {
        match getter {
            "getId" => self.id.map(JsonValue::from),
            "getLabel" => Some(json!(self.label)),
            _ => None,
        }
    }

    fn render(&self, _embed: bool, _store: &dyn EntityStore) -> Result<JsonValue> {
        Ok(json!({ "id": self.id, "label": self.label }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Product with a to-one category and to-many tags.
///
/// `status` is writable on update only; `sku` is a mapped field without a setter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Product {
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(skip)]
    pub category: Option<Related>,
    #[serde(skip)]
    pub tags: Vec<Related>,
}

impl Product {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id: Some(id),
            name: name.to_string(),
            ..Self::default()
        }
    }
}

impl Entity for Product {
    fn entity_type(&self) -> &'static str {
        "Product"
    }

    fn setters(&self) -> &'static [&'static str] {
        &[
            "setId",
            "setName",
            "setStatus",
            "setPrice",
            "setCategory",
            "setTags",
        ]
    }

    fn apply(&mut self, setter: &str, value: PropertyValue) -> Result<()> {
        match setter {
            "setId" => self.id = value.into_scalar("id")?,
            "setName" => self.name = value.into_scalar("name")?,
            "setStatus" => self.status = value.into_scalar("status")?,
            "setPrice" => self.price = value.into_scalar("price")?,
            "setCategory" => self.category = value.into_related("category")?,
            "setTags" => self.tags = value.into_collection("tags")?,
            other => return Err(CrudError::invalid_value(other, "unknown setter")),
        }
        Ok(())
    }

    fn read(&self, getter: &str) -> Option<JsonValue> {
        match getter {
            "getId" => self.id.map(JsonValue::from),
            "getName" => Some(json!(self.name)),
            "getStatus" => Some(json!(self.status)),
            "getPrice" => Some(json!(self.price)),
            "getSku" => Some(json!(self.sku)),
            _ => None,
        }
    }

    fn related_collection(&self, getter: &str) -> Option<EntityCollection> {
        match getter {
            "getTags" => Some(
                self.tags
                    .iter()
                    .filter_map(|tag| tag.as_handle().cloned())
                    .collect(),
            ),
            _ => None,
        }
    }

    fn render(&self, embed: bool, store: &dyn EntityStore) -> Result<JsonValue> {
        let category = match &self.category {
            Some(category) => category.render(embed, store)?,
            None => JsonValue::Null,
        };
        let tags = self
            .tags
            .iter()
            .map(|tag| tag.render(embed, store))
            .collect::<Result<Vec<_>>>()?;

        Ok(json!({
            "id": self.id,
            "name": self.name,
            "status": self.status,
            "price": self.price,
            "sku": self.sku,
            "category": category,
            "tags": tags,
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Descriptors of the demo catalog.
pub fn metadata() -> Result<MetadataRegistry> {
    MetadataRegistry::new()
        .with_descriptor(EntityDescriptor::builder("Category").field("name").build())?
        .with_descriptor(EntityDescriptor::builder("Tag").field("label").build())?
        .with_descriptor(
            EntityDescriptor::builder("Product")
                .field("name")
                .field("price")
                .field("sku")
                .restricted_field("status", [Action::Update])
                .association("Category", "Category", AssociationKind::ToOne)
                .association("Tags", "Tag", AssociationKind::ToMany)
                .build(),
        )
}

/// serde registrations of the demo catalog.
pub fn types() -> EntityTypeRegistry {
    EntityTypeRegistry::new()
        .register::<Category>("Category")
        .register::<Tag>("Tag")
        .register::<Product>("Product")
}

/// Seeds two categories, two tags and one product.
pub fn seed(store: &dyn EntityStore) -> Result<()> {
    let tools = entity_handle(Category::new(1, "Tools"));
    store.persist("Category", json!(1), tools.clone())?;
    store.persist("Category", json!(2), entity_handle(Category::new(2, "Garden")))?;

    let steel = entity_handle(Tag::new(1, "steel"));
    store.persist("Tag", json!(1), steel.clone())?;
    store.persist("Tag", json!(2), entity_handle(Tag::new(2, "sale")))?;

    let mut hammer = Product::new(1, "Hammer");
    hammer.status = Some("active".to_string());
    hammer.price = Some(19.5);
    hammer.category = Some(Related::Loaded(tools));
    hammer.tags = vec![Related::Loaded(steel)];
    store.persist("Product", json!(1), entity_handle(hammer))?;
    Ok(())
}

/// Downcasts a handle for inspection in tests and tools.
pub fn with_entity<E: Entity, R>(
    handle: &EntityHandle,
    f: impl FnOnce(&E) -> R,
) -> Result<Option<R>> {
    let guard = handle.read()?;
    Ok(guard.as_any().downcast_ref::<E>().map(f))
}
