use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::auth::{AuthUser, CurrentUser, Session};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CodeRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub email: String,
    pub code: String,
}

fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::Validation(format!("'{email}' is not an email address"))),
    }
}

/// POST /api/v1/auth/code
pub async fn handle_request_code(
    State(state): State<AppState>,
    Json(req): Json<CodeRequest>,
) -> Result<StatusCode, AppError> {
    let email = normalize_email(&req.email)?;
    state.auth.request_sign_in_code(&email).await?;
    Ok(StatusCode::ACCEPTED)
}

/// POST /api/v1/auth/verify
pub async fn handle_verify_code(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<Session>, AppError> {
    let email = normalize_email(&req.email)?;
    let code = req.code.trim();
    if code.is_empty() {
        return Err(AppError::Validation("code is required".to_string()));
    }
    Ok(Json(state.auth.verify_sign_in_code(&email, code).await?))
}

/// POST /api/v1/auth/signout
pub async fn handle_sign_out(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<StatusCode, AppError> {
    state.auth.sign_out(&current.access_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn handle_me(current: CurrentUser) -> Json<AuthUser> {
    Json(current.user)
}
