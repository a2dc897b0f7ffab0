use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::layout::LayoutError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Auth provider error: {0}")]
    Auth(String),

    /// Stored data that the layout code cannot interpret.
    #[error("Configuration error: {0}")]
    Configuration(#[from] LayoutError),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCode | AuthError::Api { status: 401, .. } => AppError::Unauthorized,
            other => AppError::Auth(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Auth(msg) => {
                tracing::error!("Auth provider error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "AUTH_PROVIDER_ERROR",
                    "The sign-in service is unavailable".to_string(),
                )
            }
            AppError::Configuration(e) => {
                tracing::error!("Configuration error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    e.to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AppError::Auth("down".into()), StatusCode::BAD_GATEWAY),
            (
                AppError::Configuration(LayoutError::UnknownLabelStyle("x".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_auth_error_mapping() {
        assert!(matches!(
            AppError::from(AuthError::InvalidCode),
            AppError::Unauthorized
        ));
        assert!(matches!(
            AppError::from(AuthError::Api {
                status: 401,
                message: "expired".into()
            }),
            AppError::Unauthorized
        ));
        assert!(matches!(
            AppError::from(AuthError::Api {
                status: 503,
                message: "down".into()
            }),
            AppError::Auth(_)
        ));
    }
}
