pub mod transformer;

pub use transformer::{CrudTransformer, PropertyOutcome, TransformSession};
