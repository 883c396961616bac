use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::config::Config;
use crate::store::ReflectionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Flat-file or PostgreSQL backend, picked via STORAGE_BACKEND.
    pub store: Arc<dyn ReflectionStore>,
    /// Identity service client, built once at startup.
    pub verifier: Arc<dyn TokenVerifier>,
    pub config: Config,
}
