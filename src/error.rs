/*
 * Responsibility
 * - App-wide AppError definition
 * - IntoResponse impl (HTTP status / JSON error body)
 * - Map forward-auth failures (transport, broken identity) onto 5xx responses
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::forward_auth::verdict::INVALID_IDENTITY_MESSAGE;
use crate::services::forward_auth::{ForwardAuthError, TransportError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    AuthTransport(#[from] TransportError),
    #[error("{}", INVALID_IDENTITY_MESSAGE)]
    InvalidIdentity,
    #[error("internal server error")]
    Internal,
}

impl From<ForwardAuthError> for AppError {
    fn from(e: ForwardAuthError) -> Self {
        match e {
            ForwardAuthError::Transport(e) => AppError::AuthTransport(e),
            // The target is validated at startup; reaching this is a bug.
            ForwardAuthError::InvalidTarget(_) => AppError::Internal,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::AuthTransport(e) if e.is_timeout() => {
                (StatusCode::GATEWAY_TIMEOUT, "AUTH_TIMEOUT")
            }
            AppError::AuthTransport(_) => (StatusCode::BAD_GATEWAY, "AUTH_UNAVAILABLE"),
            AppError::InvalidIdentity => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INVALID_AUTH_RESPONSE")
            }
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_errors_to_statuses() {
        let cases = [
            (AppError::from(TransportError::Timeout), StatusCode::GATEWAY_TIMEOUT),
            (
                AppError::from(TransportError::Connect("refused".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (AppError::InvalidIdentity, StatusCode::INTERNAL_SERVER_ERROR),
            (
                AppError::from(ForwardAuthError::InvalidTarget("bad".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
