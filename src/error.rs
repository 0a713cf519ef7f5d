// Application error types and their HTTP mappings.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

/// The inventory store could not be read. Never fatal: the caller clears the
/// snapshot, reports the message and offers a manual retry.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("inventory store unavailable: {0}")]
    Store(#[from] reqwest::Error),
    #[error("inventory store authentication failed: {0}")]
    Auth(String),
    #[error("malformed inventory response: {0}")]
    Malformed(String),
}

#[derive(Debug)]
pub enum AppError {
    InternalServerError(anyhow::Error),
    Fetch(FetchError),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::InternalServerError(error)
    }
}

impl From<FetchError> for AppError {
    fn from(error: FetchError) -> Self {
        AppError::Fetch(error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(e) => {
                tracing::error!("Internal server error: {:?}", e);
                // Don't expose internal details to the client.
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Fetch(e) => {
                tracing::error!("Inventory fetch failed: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Não foi possível conectar ao banco de dados".to_string(),
                )
            }
        };

        (status, Json(json!({ "success": false, "error": error_message }))).into_response()
    }
}
