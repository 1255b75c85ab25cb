use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::ValidationError;
use identity::{AuthError, BackendError};
use library::LibraryError;
use preferences::PreferenceError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(AuthError),

    #[error("Not signed in")]
    Unauthorized,

    #[error("Not found")]
    NotFound,

    /// Backend failure. The detail is logged, never sent to the client.
    #[error("{0}")]
    Unavailable(&'static str),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(e) => Self::Validation(e),
            other => Self::Auth(other),
        }
    }
}

impl From<LibraryError> for ApiError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::Validation(e) => Self::Validation(e),
            LibraryError::NotFound(_) | LibraryError::NoteNotFound(_) => Self::NotFound,
            LibraryError::Store(_) => Self::Unavailable("Failed to load or save videos"),
        }
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        error!(error = %err, "identity backend failure");
        Self::Unavailable("Identity service unavailable")
    }
}

impl From<PreferenceError> for ApiError {
    fn from(err: PreferenceError) -> Self {
        error!(error = %err, "preference store failure");
        Self::Unavailable("Failed to load or save preferences")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(AuthError::RegistrationFailed) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
