use super::{EmbeddedQuery, Result, View, WebError};
use crate::core::{CrudError, getter_name, setter_name};
use crate::crud::CrudTransformer;
use crate::embedded::{CollectionResponse, EntityResponse};
use crate::entity::{EntityHandle, PropertyValue};
use crate::metadata::MetadataRegistry;
use crate::restriction::Action;
use crate::serializer::EntityTypeRegistry;
use crate::store::EntityStore;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Shared state of the CRUD router.
#[derive(Clone)]
pub struct CrudState {
    transformer: Arc<CrudTransformer>,
    types: Arc<EntityTypeRegistry>,
    store: Arc<dyn EntityStore>,
}

impl CrudState {
    pub fn new(
        metadata: MetadataRegistry,
        types: EntityTypeRegistry,
        store: Arc<dyn EntityStore>,
    ) -> Self {
        let types = Arc::new(types);
        let transformer = CrudTransformer::new(metadata, types.clone(), store.clone());
        Self {
            transformer: Arc::new(transformer),
            types,
            store,
        }
    }

    pub fn transformer(&self) -> &CrudTransformer {
        &self.transformer
    }

    pub fn store(&self) -> &dyn EntityStore {
        self.store.as_ref()
    }
}

/// Generic routes over every registered entity type:
/// - `GET /:entity`
/// - `POST /:entity`
/// - `GET /:entity/:id`
/// - `PATCH /:entity/:id`
///
/// Reads honour `?_embedded=`.
pub fn crud_router(state: CrudState) -> Router {
    Router::new()
        .route("/:entity", get(list_entities).post(create_entity))
        .route("/:entity/:id", get(get_entity).patch(update_entity))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Path identifiers are integers when they parse as such, strings otherwise.
pub fn parse_identifier(raw: &str) -> JsonValue {
    raw.parse::<i64>()
        .map(JsonValue::from)
        .unwrap_or_else(|_| JsonValue::String(raw.to_string()))
}

fn ensure_known(state: &CrudState, entity: &str) -> Result<()> {
    if state.transformer.metadata().contains(entity) {
        Ok(())
    } else {
        Err(CrudError::UnknownEntity(entity.to_string()).into())
    }
}

fn find_existing(state: &CrudState, entity: &str, id: &JsonValue) -> Result<EntityHandle> {
    state
        .store
        .find(entity, id)?
        .ok_or_else(|| WebError::NotFound(format!("{entity} not found: {id}")))
}

async fn list_entities(
    State(state): State<CrudState>,
    Path(entity): Path<String>,
    embedded: EmbeddedQuery,
) -> Result<Response> {
    ensure_known(&state, &entity)?;
    let items: CollectionResponse<EntityResponse> = state
        .store
        .all(&entity)?
        .into_iter()
        .map(EntityResponse::new)
        .collect();
    View::new(items).render(&embedded, state.store())
}

async fn get_entity(
    State(state): State<CrudState>,
    Path((entity, id)): Path<(String, String)>,
    embedded: EmbeddedQuery,
) -> Result<Response> {
    ensure_known(&state, &entity)?;
    let handle = find_existing(&state, &entity, &parse_identifier(&id))?;
    View::new(EntityResponse::new(handle)).render(&embedded, state.store())
}

async fn create_entity(
    State(state): State<CrudState>,
    Path(entity): Path<String>,
    embedded: EmbeddedQuery,
    axum::Json(payload): axum::Json<JsonValue>,
) -> Result<Response> {
    let session = state.transformer.session(&entity)?;
    let identifier_field = session.descriptor().identifier_field().to_string();
    let handle = state.types.instantiate(&entity)?;

    let identifier = {
        let mut guard = handle.write().map_err(CrudError::from)?;
        let outcomes = session.process_value(&mut *guard, &payload, Action::Create)?;
        debug!(entity = %entity, ?outcomes, "create payload applied");

        match guard.read(&getter_name(&identifier_field)) {
            Some(id) if !id.is_null() => id,
            _ => {
                let id = state.store.next_identifier(&entity)?;
                guard.apply(&setter_name(&identifier_field), PropertyValue::Scalar(id.clone()))?;
                id
            }
        }
    };

    state.store.insert(&entity, identifier, handle.clone())?;

    View::new(EntityResponse::new(handle))
        .with_status(StatusCode::CREATED)
        .render(&embedded, state.store())
}

async fn update_entity(
    State(state): State<CrudState>,
    Path((entity, id)): Path<(String, String)>,
    embedded: EmbeddedQuery,
    axum::Json(payload): axum::Json<JsonValue>,
) -> Result<Response> {
    let session = state.transformer.session(&entity)?;
    let handle = find_existing(&state, &entity, &parse_identifier(&id))?;

    {
        let mut guard = handle.write().map_err(CrudError::from)?;
        let outcomes = session.process_value(&mut *guard, &payload, Action::Update)?;
        debug!(entity = %entity, id = %id, ?outcomes, "update payload applied");
    }

    View::new(EntityResponse::new(handle)).render(&embedded, state.store())
}
