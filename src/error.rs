use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failure kinds the API can report to a caller.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// JSON error body: stable machine code plus a safe message.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            // Duplicate email on signup is reported as 400 to match the
            // public API contract, distinguished by the error code.
            Self::Conflict(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "conflict",
                    message: msg,
                },
            ),
            Self::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "validation_error",
                    message: msg,
                },
            ),
            Self::Unauthorized(msg) => {
                let body = ErrorBody {
                    error: "unauthorized",
                    message: msg,
                };
                return (
                    StatusCode::UNAUTHORIZED,
                    [(header::WWW_AUTHENTICATE, "Bearer")],
                    Json(body),
                )
                    .into_response();
            }
            Self::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "not_found",
                    message: msg,
                },
            ),
            Self::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "internal_error",
                        message: "Internal server error".into(),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
