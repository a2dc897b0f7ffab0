mod auth;
mod config;
mod db;
mod errors;
mod goals;
mod layout;
mod models;
mod routes;
mod state;
mod store;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::HostedAuthClient;
use crate::config::Config;
use crate::db::create_pool;
use crate::routes::{build_router, cors_layer};
use crate::state::AppState;
use crate::store::{GoalStore, MemoryGoalStore, PgGoalStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Goalsheet API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize record store
    let store: Arc<dyn GoalStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url, config.database_max_connections).await?;
            Arc::new(PgGoalStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; goal lists are kept in memory and lost on restart");
            Arc::new(MemoryGoalStore::new())
        }
    };

    // Initialize auth provider client
    let auth = HostedAuthClient::new(&config.auth_url, config.auth_api_key.clone())?;
    info!("Auth client initialized ({})", config.auth_url);

    let state = AppState {
        store,
        auth: Arc::new(auth),
    };

    if config.cors_allowed_origins.is_empty() {
        warn!("CORS_ALLOWED_ORIGINS not set; accepting requests from any origin");
    }
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_allowed_origins)?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
