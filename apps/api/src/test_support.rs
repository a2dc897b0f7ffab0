//! In-process app wiring for router tests: memory store plus a fake provider.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use crate::auth::{AuthError, AuthUser, Session, SessionProvider};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::MemoryGoalStore;

/// The only code `FakeSessionProvider` accepts.
pub const VALID_CODE: &str = "424242";

#[derive(Default)]
pub struct FakeSessionProvider {
    users: Mutex<HashMap<String, Uuid>>,
    sessions: Mutex<HashMap<String, AuthUser>>,
}

#[async_trait]
impl SessionProvider for FakeSessionProvider {
    async fn request_sign_in_code(&self, _email: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn verify_sign_in_code(&self, email: &str, code: &str) -> Result<Session, AuthError> {
        if code != VALID_CODE {
            return Err(AuthError::InvalidCode);
        }
        let id = *self
            .users
            .lock()
            .unwrap()
            .entry(email.to_string())
            .or_insert_with(Uuid::new_v4);
        let user = AuthUser {
            id,
            email: Some(email.to_string()),
        };
        let token = Uuid::new_v4().to_string();
        self.sessions
            .lock()
            .unwrap()
            .insert(token.clone(), user.clone());
        Ok(Session {
            access_token: token,
            refresh_token: None,
            expires_in: Some(3600),
            user,
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.sessions.lock().unwrap().remove(access_token);
        Ok(())
    }

    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError> {
        Ok(self.sessions.lock().unwrap().get(access_token).cloned())
    }
}

pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState {
            store: Arc::new(MemoryGoalStore::new()),
            auth: Arc::new(FakeSessionProvider::default()),
        };
        Self {
            router: build_router(state),
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    fn request(method: &str, path: &str, token: Option<&str>) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match token {
            Some(t) => builder.header(header::AUTHORIZATION, format!("Bearer {t}")),
            None => builder,
        }
    }

    fn parse(bytes: &[u8]) -> Value {
        if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(bytes).unwrap_or(Value::Null)
        }
    }

    pub async fn get_json(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        let request = Self::request("GET", path, token).body(Body::empty()).unwrap();
        let (status, bytes) = self.send(request).await;
        (status, Self::parse(&bytes))
    }

    pub async fn get_text(&self, path: &str, token: Option<&str>) -> (StatusCode, String) {
        let request = Self::request("GET", path, token).body(Body::empty()).unwrap();
        let (status, bytes) = self.send(request).await;
        (status, String::from_utf8(bytes).unwrap())
    }

    /// Sends `body` as JSON; `Value::Null` sends no body at all.
    pub async fn send_json(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        let builder = Self::request(method, path, token);
        let request = if body.is_null() {
            builder.body(Body::empty()).unwrap()
        } else {
            builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap()
        };
        let (status, bytes) = self.send(request).await;
        (status, Self::parse(&bytes))
    }

    /// Signs `email` in and returns its access token.
    pub async fn sign_in(&self, email: &str) -> String {
        let (status, session) = self
            .send_json(
                "POST",
                "/api/v1/auth/verify",
                None,
                json!({"email": email, "code": VALID_CODE}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        session["access_token"].as_str().unwrap().to_string()
    }

    /// Creates a goal list and returns its id.
    pub async fn create_list(&self, token: &str, title: &str) -> String {
        let (status, list) = self
            .send_json(
                "POST",
                "/api/v1/goal-lists",
                Some(token),
                json!({"title": title}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        list["id"].as_str().unwrap().to_string()
    }
}
