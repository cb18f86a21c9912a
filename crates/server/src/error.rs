use api_types::ErrorBody;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use geohunt_core::error::HuntError;
use thiserror::Error;
use tracing::error;

use crate::verify::VerifyError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Hunt not found")]
    HuntNotFound,

    #[error(transparent)]
    Hunt(#[from] HuntError),

    #[error("Photo verification is not configured")]
    VerifierUnavailable,

    #[error("Photo verification failed: {0}")]
    Verifier(#[from] VerifyError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            AppError::HuntNotFound => StatusCode::NOT_FOUND,
            AppError::Hunt(err) => match err {
                HuntError::CheckpointNotFound(_) => StatusCode::NOT_FOUND,
                HuntError::AlreadyCollected(_) => StatusCode::CONFLICT,
                HuntError::OutOfRange { .. } | HuntError::HuntExpired => StatusCode::FORBIDDEN,
                HuntError::InvalidOption(_) | HuntError::WrongTask(_) | HuntError::InvalidInput(_) => {
                    StatusCode::BAD_REQUEST
                }
                HuntError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::VerifierUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Verifier(_) => StatusCode::BAD_GATEWAY,
        };

        if status.is_server_error() {
            error!("{self}");
        }

        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
