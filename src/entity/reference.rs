use super::EntityHandle;
use crate::core::{CrudError, Result};
use crate::store::EntityStore;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Lazy reference to a persisted entity.
///
/// Created without any existence check; the record is fetched on the first
/// [`load`](Self::load) and the handle is cached for every clone of the reference.
#[derive(Clone)]
pub struct EntityReference {
    inner: Arc<ReferenceInner>,
}

struct ReferenceInner {
    target: String,
    identifier: JsonValue,
    loaded: OnceLock<EntityHandle>,
}

impl EntityReference {
    pub fn new(target: impl Into<String>, identifier: JsonValue) -> Self {
        Self {
            inner: Arc::new(ReferenceInner {
                target: target.into(),
                identifier,
                loaded: OnceLock::new(),
            }),
        }
    }

    pub fn target(&self) -> &str {
        &self.inner.target
    }

    pub fn identifier(&self) -> &JsonValue {
        &self.inner.identifier
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.loaded.get().is_some()
    }

    /// Resolves the reference, failing if the record does not exist.
    pub fn load(&self, store: &dyn EntityStore) -> Result<EntityHandle> {
        if let Some(handle) = self.inner.loaded.get() {
            return Ok(handle.clone());
        }

        let handle = store
            .find(self.target(), self.identifier())?
            .ok_or_else(|| {
                CrudError::EntityNotFound(self.target().to_string(), self.identifier().to_string())
            })?;

        Ok(self.inner.loaded.get_or_init(|| handle).clone())
    }
}

impl fmt::Debug for EntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityReference")
            .field("target", &self.inner.target)
            .field("identifier", &self.inner.identifier)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl PartialEq for EntityReference {
    fn eq(&self, other: &Self) -> bool {
        self.target() == other.target() && self.identifier() == other.identifier()
    }
}
