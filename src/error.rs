//! Errors returned by the REST handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::api::Envelope;
use crate::validation::ValidationError;

pub const DATABASE_ERROR: &str = "Erro de banco de dados";

/// Every variant renders as `{success: false, message}` with a matching status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Body could not be read as the expected JSON shape.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    /// The cause is logged, only `message` reaches the caller.
    #[error("{message}")]
    Storage {
        message: &'static str,
        cause: anyhow::Error,
    },
}

impl ApiError {
    /// Adapter for `map_err` on database calls.
    pub fn storage(message: &'static str) -> impl FnOnce(anyhow::Error) -> ApiError {
        move |cause| ApiError::Storage { message, cause }
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            Self::Storage { message, cause } => {
                tracing::error!("{message}: {cause:#}");
            }
            other => {
                tracing::debug!(status = status.as_u16(), "rejected request: {other}");
            }
        }

        (status, Envelope::failure(self.to_string())).into_response()
    }
}
