//! Error types for cachew
//!
//! Provides unified error handling using thiserror. Library misses are
//! `Option::None`, not errors; `NotFound` and `InvalidRequest` only come
//! from the HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the caches, the range index and the server.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// Key not found
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Range index is at its entry limit
    #[error("Index full: capacity of {capacity} entries reached")]
    IndexFull { capacity: usize },

    /// Document cache lookup through an index that was never declared
    #[error("Unknown index: {0}")]
    UnknownIndex(String),

    /// Range index key that cannot be ordered
    #[error("Invalid index key: {0}")]
    InvalidKey(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_)
            | CacheError::UnknownIndex(_)
            | CacheError::InvalidKey(_) => StatusCode::BAD_REQUEST,
            CacheError::IndexFull { .. } => StatusCode::SERVICE_UNAVAILABLE,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for cachew.
pub type Result<T> = std::result::Result<T, CacheError>;
