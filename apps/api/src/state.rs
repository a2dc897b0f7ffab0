use std::sync::Arc;

use crate::auth::SessionProvider;
use crate::store::GoalStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Record store. Postgres when `DATABASE_URL` is set, in-memory otherwise.
    pub store: Arc<dyn GoalStore>,
    /// Hosted account provider for one-time-code sign-in.
    pub auth: Arc<dyn SessionProvider>,
}
