pub mod error;
pub mod naming;

pub use error::{CrudError, Result};
pub use naming::{camelize, getter_name, lcfirst, setter_name, ucfirst};
