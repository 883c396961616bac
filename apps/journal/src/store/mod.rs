//! Reflection persistence.
//!
//! `AppState` holds an `Arc<dyn ReflectionStore>`, chosen at startup from
//! `STORAGE_BACKEND`. Handlers never know which backend they talk to.

pub mod json;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::reflections::models::{NewReflection, Reflection, ReflectionId};
use crate::reflections::trend::TrendPoint;

pub use json::JsonFileStore;
pub use postgres::PgReflectionStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Limit/offset window over a user's reflections, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

#[async_trait]
pub trait ReflectionStore: Send + Sync {
    /// Short backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;

    /// Assigns an identifier and persists the reflection.
    async fn create(&self, reflection: NewReflection) -> Result<Reflection, StoreError>;

    async fn list_for_user(&self, user_id: &str, page: Page)
        -> Result<Vec<Reflection>, StoreError>;

    async fn get(&self, id: ReflectionId) -> Result<Option<Reflection>, StoreError>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: ReflectionId) -> Result<bool, StoreError>;

    /// Emotion counts for `user_id` over the trailing `window_days` ending at
    /// `now`, sorted by tag name. Empty when nothing matches.
    async fn emotion_trend(
        &self,
        user_id: &str,
        window_days: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<TrendPoint>, StoreError>;
}
