//! Passwordless sign-in through the hosted account provider.
//!
//! Handlers never talk to the provider directly: they go through the
//! `SessionProvider` held in `AppState`, and authenticated routes take a
//! `CurrentUser` extractor that resolves the bearer token.

pub mod client;
pub mod handlers;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

pub use client::HostedAuthClient;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("sign-in code is invalid or expired")]
    InvalidCode,

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Seconds until `access_token` expires.
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

/// The account provider as seen by this service.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Emails a one-time sign-in code.
    async fn request_sign_in_code(&self, email: &str) -> Result<(), AuthError>;

    async fn verify_sign_in_code(&self, email: &str, code: &str) -> Result<Session, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// `Ok(None)` when the token is not (or no longer) valid.
    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError>;
}

/// The signed-in user behind a request's bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: AuthUser,
    pub access_token: String,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        let user = state
            .auth
            .current_user(token)
            .await?
            .ok_or(AppError::Unauthorized)?;
        Ok(CurrentUser {
            user,
            access_token: token.to_string(),
        })
    }
}
