use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::{AuthError, AuthUser, Session, SessionProvider};

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct OtpRequest<'a> {
    email: &'a str,
    create_user: bool,
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    email: &'a str,
    token: &'a str,
}

/// REST client for the hosted auth provider (`/auth/v1/*`).
/// No retries: failures surface to the caller as-is.
#[derive(Clone)]
pub struct HostedAuthClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HostedAuthClient {
    pub fn new(base_url: &str, api_key: String) -> Result<Self, AuthError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn api_error(response: Response) -> AuthError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        warn!("Auth provider returned {status}: {body}");
        AuthError::Api {
            status,
            message: error_message(&body),
        }
    }
}

/// Pulls a human-readable message out of a provider error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|k| v.get(k).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl SessionProvider for HostedAuthClient {
    async fn request_sign_in_code(&self, email: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(self.url("otp"))
            .header("apikey", &self.api_key)
            .json(&OtpRequest {
                email,
                create_user: true,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        debug!("Sign-in code requested");
        Ok(())
    }

    async fn verify_sign_in_code(&self, email: &str, code: &str) -> Result<Session, AuthError> {
        let response = self
            .client
            .post(self.url("verify"))
            .header("apikey", &self.api_key)
            .json(&VerifyRequest {
                kind: "email",
                email,
                token: code,
            })
            .send()
            .await?;

        match response.status() {
            s if s.is_success() => {
                let body = response.text().await?;
                Ok(serde_json::from_str(&body)?)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(AuthError::InvalidCode)
            }
            _ => Err(Self::api_error(response).await),
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(self.url("logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(())
    }

    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError> {
        let response = self
            .client
            .get(self.url("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            s if s.is_success() => {
                let body = response.text().await?;
                Ok(Some(serde_json::from_str(&body)?))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            _ => Err(Self::api_error(response).await),
        }
    }
}
