use std::path::PathBuf;

use anyhow::{bail, Context, Result};

const DEFAULT_REFLECTIONS_PATH: &str = "data/reflections.json";

/// Where reflections live.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    /// Flat JSON array, rewritten wholesale on every write.
    Json { path: PathBuf },
    /// Managed PostgreSQL store with server-side trend aggregation.
    Postgres { database_url: String },
}

impl StorageBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::Json { .. } => "json",
            StorageBackend::Postgres { .. } => "postgres",
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub storage: StorageBackend,
    pub auth_service_url: String,
    pub auth_service_key: String,
    /// Serve the placeholder trend when a user has no reflections in the window.
    pub trend_fallback: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let storage = match lookup("STORAGE_BACKEND")
            .unwrap_or_else(|| "json".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "json" => StorageBackend::Json {
                path: lookup("REFLECTIONS_PATH")
                    .unwrap_or_else(|| DEFAULT_REFLECTIONS_PATH.to_string())
                    .into(),
            },
            "postgres" => StorageBackend::Postgres {
                database_url: require("DATABASE_URL")?,
            },
            other => bail!("STORAGE_BACKEND must be 'json' or 'postgres', got '{other}'"),
        };

        let trend_fallback = match lookup("TREND_FALLBACK") {
            None => true,
            Some(raw) => raw
                .trim()
                .parse::<bool>()
                .context("TREND_FALLBACK must be 'true' or 'false'")?,
        };

        Ok(Config {
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            storage,
            auth_service_url: require("AUTH_SERVICE_URL")?,
            auth_service_key: require("AUTH_SERVICE_KEY")?,
            trend_fallback,
        })
    }
}
