use crate::embedded::{EMBEDDED_QUERY_PARAM, EmbeddedResponseListener, Render, RenderableResult};
use crate::store::EntityStore;
use axum::Json;
use axum::extract::{FromRequestParts, Query};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::convert::Infallible;

/// Raw `_embedded` query value. Extraction never fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedQuery(pub Option<String>);

impl EmbeddedQuery {
    pub fn raw(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for EmbeddedQuery
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let raw = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(mut params)| params.remove(EMBEDDED_QUERY_PARAM));
        Ok(Self(raw))
    }
}

/// Handler result rendered through the embedded listener.
#[derive(Debug, Clone)]
pub struct View<T> {
    data: T,
    status: StatusCode,
}

impl<T> View<T>
where
    T: RenderableResult + Render,
{
    pub fn new(data: T) -> Self {
        Self {
            data,
            status: StatusCode::OK,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Applies the `_embedded` flag and renders the JSON response.
    pub fn render(
        mut self,
        query: &EmbeddedQuery,
        store: &dyn EntityStore,
    ) -> super::Result<Response> {
        EmbeddedResponseListener.on_view(query.raw(), &mut self.data);
        let body = self.data.render(None, store)?;
        Ok((self.status, Json(body)).into_response())
    }
}
