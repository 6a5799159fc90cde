//! API error taxonomy and its mapping onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use orgcal_core::WindowError;
use orgcal_engine::ResolverError;
use orgcal_store::StoreError;

/// Result type for request handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Window validation failed.
    #[error(transparent)]
    Window(#[from] WindowError),

    /// Missing or unknown credential.
    #[error("a valid bearer token is required")]
    Unauthorized,

    /// The caller has no active membership in the organization.
    #[error("no active membership in organization {organization_id}")]
    Forbidden { organization_id: String },

    /// A request parameter is missing or malformed.
    #[error("{message}")]
    BadRequest { message: String },

    /// The targeted event does not exist.
    #[error("no such event: {id}")]
    NotFound { id: String },

    /// A series delete failed past validation.
    #[error(transparent)]
    Resolver(ResolverError),

    /// Unexpected internal failure.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ApiError {
    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a forbidden error for the organization.
    pub fn forbidden(organization_id: impl Into<String>) -> Self {
        Self::Forbidden {
            organization_id: organization_id.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Window(_) | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Resolver(_) | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Window(inner) => inner.code(),
            Self::Unauthorized => "unauthorized",
            Self::Forbidden { .. } => "forbidden",
            Self::BadRequest { .. } => "invalid_request",
            Self::NotFound { .. } => "not_found",
            Self::Resolver(inner) => inner.code(),
            Self::Internal { .. } => "internal_error",
        }
    }
}

impl From<ResolverError> for ApiError {
    fn from(err: ResolverError) -> Self {
        match err {
            ResolverError::NotFound { id } => Self::NotFound { id },
            ResolverError::Store(StoreError::NotFound { id }) => Self::NotFound { id },
            other => Self::Resolver(other),
        }
    }
}

/// JSON body sent with every error status.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
            code: self.code(),
        };
        (status, Json(body)).into_response()
    }
}
