use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrudError {
    #[error("Entity type '{0}' is not registered")]
    UnknownEntity(String),

    #[error("Entity type '{0}' already registered")]
    EntityExists(String),

    #[error("Deserialization error: {0}")]
    Deserialize(String),

    #[error("Entity '{0}' with identifier {1} not found")]
    EntityNotFound(String, String),

    #[error("Entity '{0}' with identifier {1} already exists")]
    DuplicateIdentifier(String, String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Invalid value for '{0}': {1}")]
    InvalidValue(String, String),

    #[error("Lock error: {0}")]
    LockError(String),
}

impl CrudError {
    pub fn invalid_value(property: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue(property.to_string(), message.into())
    }
}

pub type Result<T> = std::result::Result<T, CrudError>;

impl<T> From<std::sync::PoisonError<T>> for CrudError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

impl From<serde_json::Error> for CrudError {
    fn from(err: serde_json::Error) -> Self {
        Self::Deserialize(err.to_string())
    }
}
