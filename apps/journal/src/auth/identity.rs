//! Token verification, delegated to the external identity service.
//!
//! `AppState` carries an `Arc<dyn TokenVerifier>`; the production verifier is
//! built once at startup from config and shared by every request.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Identity service error: {0}")]
    Upstream(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Resolves a bearer token to the id of the user it was issued to.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<String, AuthError>;
}

#[derive(Debug, Deserialize)]
struct IdentityUser {
    id: String,
}

/// Verifies tokens against `GET {base_url}/auth/v1/user`.
#[derive(Clone)]
pub struct RemoteIdentityVerifier {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RemoteIdentityVerifier {
    pub fn new(base_url: &str, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(VERIFY_TIMEOUT)
            .build()
            .context("Failed to build identity service HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn user_endpoint(&self) -> String {
        format!("{}/auth/v1/user", self.base_url)
    }
}

#[async_trait]
impl TokenVerifier for RemoteIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        let response = self
            .client
            .get(self.user_endpoint())
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            debug!("Identity service rejected token ({status})");
            return Err(AuthError::InvalidToken);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Identity service returned {status}: {body}");
            return Err(AuthError::Upstream(format!("status {status}")));
        }

        let user: IdentityUser = response.json().await?;
        if user.id.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        Ok(user.id)
    }
}
