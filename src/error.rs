use std::any::Any;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::{
    auth::TokenError,
    models::ErrorResponse,
    service::MovieError,
    validation::ValidationErrors,
};

pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred on the server.";
pub const VALIDATION_MESSAGE: &str = "One or more validation errors occurred.";
pub const UNAUTHORIZED_MESSAGE: &str = "Authentication is required to access this resource.";

/// Every failure a handler can produce. [`IntoResponse`] is the one place
/// that decides which status and message a caller sees.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Movie(#[from] MovieError),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(ValidationErrors::single("body", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(ValidationErrors::single("id", rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = ?self, "request failed: {self}");

        match self {
            AppError::Movie(err @ MovieError::AlreadyExists { .. }) => {
                envelope(ErrorResponse::new(StatusCode::CONFLICT.as_u16(), err.to_string()))
            },
            AppError::Movie(err @ MovieError::NotFound(_)) => {
                envelope(ErrorResponse::new(StatusCode::NOT_FOUND.as_u16(), err.to_string()))
            },
            AppError::Validation(ValidationErrors(violations)) => {
                let mut body =
                    ErrorResponse::new(StatusCode::BAD_REQUEST.as_u16(), VALIDATION_MESSAGE);
                body.errors = violations;
                envelope(body)
            },
            AppError::Token(TokenError::MissingSecret) => envelope(ErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                TokenError::MissingSecret.to_string(),
            )),
            AppError::Token(TokenError::MissingBearer | TokenError::Rejected(_)) => {
                let mut resp = envelope(ErrorResponse::new(
                    StatusCode::UNAUTHORIZED.as_u16(),
                    UNAUTHORIZED_MESSAGE,
                ));
                resp.headers_mut().insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                resp
            },
            AppError::Movie(MovieError::Store(_))
            | AppError::Token(TokenError::Signing(_))
            | AppError::Unexpected(_) => unexpected(),
        }
    }
}

fn envelope(body: ErrorResponse) -> Response {
    let status = StatusCode::from_u16(body.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body)).into_response()
}

fn unexpected() -> Response {
    envelope(ErrorResponse::new(StatusCode::INTERNAL_SERVER_ERROR.as_u16(), UNEXPECTED_MESSAGE))
}

/// Panics escaping a handler get the same treatment as any other
/// unexpected failure.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    error!(panic = %detail, "request handler panicked");
    unexpected()
}

pub type AppResult<T> = Result<T, AppError>;
