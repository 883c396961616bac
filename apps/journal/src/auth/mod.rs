pub mod identity;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

pub use identity::{AuthError, RemoteIdentityVerifier, TokenVerifier};

use crate::errors::AppError;
use crate::state::AppState;

/// The user a request's bearer token was issued to.
///
/// Extracting it performs the full check: header present, `Bearer` scheme,
/// token accepted by the identity service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
}

impl AuthUser {
    /// Forbids access to resources owned by someone else.
    pub fn ensure_owner(&self, owner_id: &str) -> Result<(), AppError> {
        if self.user_id == owner_id {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Cannot access other users' data".to_string(),
            ))
        }
    }
}

/// Pulls the token out of an `Authorization` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AppError> {
    let header =
        header.ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;
    match header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AppError::Unauthorized(
            "Invalid authorization header format".to_string(),
        )),
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .map(|value| {
                value.to_str().map_err(|_| {
                    AppError::Unauthorized("Invalid authorization header format".to_string())
                })
            })
            .transpose()?;

        let token = bearer_token(header)?;
        let user_id = state.verifier.verify(token).await?;
        Ok(AuthUser { user_id })
    }
}
