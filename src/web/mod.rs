//! HTTP surface.
//!
//! Error mapping, the `_embedded` extractor, the [`View`] result wrapper the
//! embedded listener acts on, and a generic CRUD router over registered
//! entity types.

pub mod router;
pub mod view;

pub use router::{CrudState, crud_router};
pub use view::{EmbeddedQuery, View};

use crate::core::CrudError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug)]
pub enum WebError {
    Crud(CrudError),
    NotFound(String),
}

impl From<CrudError> for WebError {
    fn from(err: CrudError) -> Self {
        WebError::Crud(err)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            WebError::Crud(CrudError::UnknownEntity(name)) => (
                StatusCode::NOT_FOUND,
                format!("unknown entity type '{}'", name),
                "not_found".to_string(),
            ),
            WebError::Crud(err @ CrudError::EntityNotFound(..)) => {
                (StatusCode::NOT_FOUND, err.to_string(), "not_found".to_string())
            }
            WebError::Crud(
                err @ (CrudError::EntityExists(_) | CrudError::DuplicateIdentifier(..)),
            ) => (StatusCode::CONFLICT, err.to_string(), "conflict".to_string()),
            WebError::Crud(
                err @ (CrudError::Deserialize(_)
                | CrudError::InvalidValue(..)
                | CrudError::InvalidAction(_)),
            ) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                err.to_string(),
                "input_error".to_string(),
            ),
            WebError::Crud(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
                "internal_error".to_string(),
            ),

            WebError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "not_found".to_string()),
        };

        let body = Json(ErrorResponse {
            error: message,
            code,
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::WebError;
    use crate::core::CrudError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn crud_errors_map_to_http_statuses() {
        let cases = [
            (CrudError::UnknownEntity("Nope".into()), StatusCode::NOT_FOUND),
            (
                CrudError::EntityNotFound("Product".into(), "9".into()),
                StatusCode::NOT_FOUND,
            ),
            (CrudError::EntityExists("Product".into()), StatusCode::CONFLICT),
            (
                CrudError::DuplicateIdentifier("Product".into(), "1".into()),
                StatusCode::CONFLICT,
            ),
            (
                CrudError::Deserialize("bad".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                CrudError::invalid_value("price", "expected number"),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                CrudError::LockError("poisoned".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = WebError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
