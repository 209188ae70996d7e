//! Server and HTTP boundary error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::api::ErrorResponse;
use crate::catalog::CatalogError;

/// Errors that can occur while starting or running the server.
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    /// Failed to bind to address.
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Error returned by a request handler, rendered as a JSON body.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The requested entity does not exist (404).
    #[error("{0}")]
    NotFound(String),

    /// The request was malformed (400).
    #[error("{0}")]
    BadRequest(String),

    /// The store failed (500).
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code used in the response body.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "validation_error",
            Self::Internal(_) => "storage_error",
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        if err.is_not_found() {
            Self::NotFound(err.to_string())
        } else if err.is_validation() {
            Self::BadRequest(err.to_string())
        } else {
            tracing::error!(error = %err, "Catalog query failed");
            Self::Internal("Internal storage error".to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse::new(self.code(), self.to_string());
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EntityKind;

    #[test]
    fn test_bind_error_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");
        let error = ServerError::Bind {
            address: "127.0.0.1:3000".to_string(),
            source: io_error,
        };
        assert!(error
            .to_string()
            .contains("Failed to bind to 127.0.0.1:3000"));
        assert!(error.to_string().contains("address in use"));
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err: ApiError = CatalogError::NotFound {
            kind: EntityKind::Quality,
            key: "Patience".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "not_found");
        assert_eq!(err.to_string(), "quality not found: Patience");
    }

    #[test]
    fn test_validation_maps_to_400() {
        let err: ApiError = CatalogError::Validation("bad".to_string()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn test_storage_fault_maps_to_500_without_details() {
        let err: ApiError = CatalogError::Query(rusqlite::Error::InvalidQuery).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "storage_error");
        assert_eq!(err.to_string(), "Internal storage error");

        let err: ApiError = CatalogError::TaskCancelled.into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::BadRequest("Invalid role id: abc".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
