pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::reflections::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/reflections",
            post(handlers::handle_create_reflection).get(handlers::handle_list_reflections),
        )
        .route(
            "/api/reflections/:id",
            get(handlers::handle_get_reflection).delete(handlers::handle_delete_reflection),
        )
        .route("/api/reflections/:id/trend", get(handlers::handle_get_trend))
        .with_state(state)
}
