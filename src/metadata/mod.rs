pub mod descriptor;
pub mod registry;

pub use descriptor::{
    AssociationKind, AssociationMapping, EntityDescriptor, EntityDescriptorBuilder, FieldMapping,
};
pub use registry::MetadataRegistry;
