//! Axum route handlers for the Reflections API.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::reflections::models::{CreateReflectionRequest, Reflection, ReflectionId};
use crate::reflections::trend::{parse_window_days, TrendReport};
use crate::reflections::validation::{validate_new_reflection, validate_page};
use crate::state::AppState;
use crate::store::Page;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct TrendParams {
    pub days: Option<i64>,
}

/// POST /api/reflections
pub async fn handle_create_reflection(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateReflectionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Reflection>), AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let new_reflection = validate_new_reflection(request, &user.user_id, Utc::now())?;

    let stored = state.store.create(new_reflection).await?;
    info!("Stored reflection {} for user {}", stored.id, stored.user_id);

    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /api/reflections?limit&offset
///
/// The caller's own reflections, newest first.
pub async fn handle_list_reflections(
    State(state): State<AppState>,
    user: AuthUser,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Reflection>>, AppError> {
    let Query(params) = params.map_err(|e| AppError::Validation(e.body_text()))?;
    let (limit, offset) = validate_page(params.limit, params.offset)?;

    let reflections = state
        .store
        .list_for_user(&user.user_id, Page { limit, offset })
        .await?;
    Ok(Json(reflections))
}

/// GET /api/reflections/:id
pub async fn handle_get_reflection(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Reflection>, AppError> {
    let reflection = find_owned(&state, &user, &id).await?;
    Ok(Json(reflection))
}

/// DELETE /api/reflections/:id
pub async fn handle_delete_reflection(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let reflection = find_owned(&state, &user, &id).await?;

    if !state.store.delete(reflection.id).await? {
        return Err(AppError::NotFound(format!(
            "Reflection {} not found or already deleted",
            reflection.id
        )));
    }
    info!("Deleted reflection {} for user {}", reflection.id, user.user_id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/reflections/:id/trend?days
///
/// The path segment is the user id here; it shares the `:id` slot with the
/// single-reflection routes.
pub async fn handle_get_trend(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<String>,
    params: Result<Query<TrendParams>, QueryRejection>,
) -> Result<Json<TrendReport>, AppError> {
    user.ensure_owner(&user_id)?;

    let Query(params) = params.map_err(|e| AppError::Validation(e.body_text()))?;
    let window_days = parse_window_days(params.days)?;

    let points = state
        .store
        .emotion_trend(&user_id, window_days, Utc::now())
        .await?;
    let report = TrendReport::build(user_id, window_days, points, state.config.trend_fallback);
    if report.is_fallback {
        info!(
            "No reflections for user {} in the last {} days; serving fallback trend",
            report.user_id, window_days
        );
    }
    Ok(Json(report))
}

/// Loads a reflection by path id and checks that the caller owns it.
async fn find_owned(state: &AppState, user: &AuthUser, raw_id: &str) -> Result<Reflection, AppError> {
    let id = raw_id
        .parse::<ReflectionId>()
        .map_err(|e| AppError::Validation(format!("id: {e}")))?;

    let reflection = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Reflection {id} not found")))?;

    user.ensure_owner(&reflection.user_id)?;
    Ok(reflection)
}
