mod auth;
mod config;
mod db;
mod errors;
mod reflections;
mod routes;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::{RemoteIdentityVerifier, TokenVerifier};
use crate::config::{Config, StorageBackend};
use crate::db::{create_pool, run_migrations};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{JsonFileStore, PgReflectionStore, ReflectionStore};

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

    info!("Starting Journal API v{}", env!("CARGO_PKG_VERSION"));

    let store = build_store(&config.storage).await?;
    info!("Reflection store initialized (backend: {})", config.storage.name());

    let verifier: Arc<dyn TokenVerifier> = Arc::new(RemoteIdentityVerifier::new(
        &config.auth_service_url,
        config.auth_service_key.clone(),
    )?);
    info!("Identity verifier initialized ({})", config.auth_service_url);

    if config.trend_fallback {
        info!("Placeholder trend enabled for users without recent reflections");
    }

    let state = AppState {
        store,
        verifier,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the mobile app's origin is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Opens the configured backend. PostgreSQL gets its schema applied first.
async fn build_store(storage: &StorageBackend) -> Result<Arc<dyn ReflectionStore>> {
    Ok(match storage {
        StorageBackend::Json { path } => Arc::new(JsonFileStore::open(path.clone()).await?),
        StorageBackend::Postgres { database_url } => {
            let pool = create_pool(database_url).await?;
            run_migrations(&pool).await?;
            Arc::new(PgReflectionStore::new(pool))
        }
    })
}
