use super::EntityStore;
use crate::core::{CrudError, Result};
use crate::entity::EntityHandle;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::trace;

#[derive(Default)]
struct TypeTable {
    order: Vec<String>,
    rows: HashMap<String, EntityHandle>,
    sequence: u64,
}

impl TypeTable {
    fn put(&mut self, key: String, identifier: &JsonValue, entity: EntityHandle) {
        if let Some(numeric) = identifier.as_u64() {
            self.sequence = self.sequence.max(numeric);
        }
        if self.rows.insert(key.clone(), entity).is_none() {
            self.order.push(key);
        }
    }
}

/// Identity map keyed by entity type and identifier.
///
/// Identifiers are compared by their JSON encoding, so `1` and `"1"` are
/// different keys.
#[derive(Default)]
pub struct InMemoryEntityStore {
    tables: RwLock<HashMap<String, TypeTable>>,
    lookups: AtomicUsize,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `find` calls served so far
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    pub fn len(&self, target: &str) -> Result<usize> {
        let tables = self.tables.read()?;
        Ok(tables.get(target).map_or(0, |table| table.rows.len()))
    }

    fn key(identifier: &JsonValue) -> String {
        identifier.to_string()
    }
}

impl EntityStore for InMemoryEntityStore {
    fn find(&self, target: &str, identifier: &JsonValue) -> Result<Option<EntityHandle>> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let tables = self.tables.read()?;
        let found = tables
            .get(target)
            .and_then(|table| table.rows.get(&Self::key(identifier)))
            .cloned();
        trace!(target_type = target, %identifier, hit = found.is_some(), "store lookup");
        Ok(found)
    }

    fn persist(&self, target: &str, identifier: JsonValue, entity: EntityHandle) -> Result<()> {
        let mut tables = self.tables.write()?;
        let table = tables.entry(target.to_string()).or_default();
        table.put(Self::key(&identifier), &identifier, entity);
        Ok(())
    }

    fn insert(&self, target: &str, identifier: JsonValue, entity: EntityHandle) -> Result<()> {
        let mut tables = self.tables.write()?;
        let table = tables.entry(target.to_string()).or_default();
        let key = Self::key(&identifier);
        if table.rows.contains_key(&key) {
            return Err(CrudError::DuplicateIdentifier(target.to_string(), key));
        }
        table.put(key, &identifier, entity);
        Ok(())
    }

    fn all(&self, target: &str) -> Result<Vec<EntityHandle>> {
        let tables = self.tables.read()?;
        let Some(table) = tables.get(target) else {
            return Ok(Vec::new());
        };
        Ok(table
            .order
            .iter()
            .filter_map(|key| table.rows.get(key).cloned())
            .collect())
    }

    fn next_identifier(&self, target: &str) -> Result<JsonValue> {
        let mut tables = self.tables.write()?;
        let table = tables.entry(target.to_string()).or_default();
        table.sequence += 1;
        Ok(JsonValue::from(table.sequence))
    }
}
