// ============================================================================
// crudrest Library
// ============================================================================

pub mod config;
pub mod core;
pub mod crud;
pub mod demo;
pub mod embedded;
pub mod entity;
pub mod metadata;
pub mod restriction;
pub mod serializer;
pub mod store;
pub mod web;

// Re-export main types for convenience
pub use core::{CrudError, Result};
pub use crud::{CrudTransformer, PropertyOutcome, TransformSession};
pub use embedded::{
    CollectionResponse, EmbeddedFlag, EmbeddedResponseListener, EntityResponse,
    InheritedEmbedding, Render, RenderableResult, parse_embedded_flag,
};
pub use entity::{
    Entity, EntityCollection, EntityHandle, EntityReference, PropertyValue, Related, entity_handle,
};
pub use metadata::{AssociationKind, EntityDescriptor, MetadataRegistry};
pub use restriction::{Action, PropertyRestriction};
pub use serializer::{EntityDeserializer, EntityTypeRegistry};
pub use store::{EntityStore, InMemoryEntityStore};
