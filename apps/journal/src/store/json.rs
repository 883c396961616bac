use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::reflections::models::{NewReflection, Reflection, ReflectionId};
use crate::reflections::trend::{aggregate_emotions, TrendPoint};
use crate::store::{Page, ReflectionStore, StoreError};

/// Flat-file store: a JSON array of reflections, loaded once and rewritten
/// wholesale after every write. Identifiers are sequential integers.
pub struct JsonFileStore {
    path: PathBuf,
    records: Mutex<Vec<Reflection>>,
}

impl JsonFileStore {
    /// Loads the record set from `path`. A missing or empty file is an empty set.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = load_records(&path).await?;
        info!(
            "Loaded {} reflections from {}",
            records.len(),
            path.display()
        );
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    async fn persist(&self, records: &[Reflection]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let data = serde_json::to_vec_pretty(records)?;
        // Readers only ever see the old file or the complete new one.
        let staging = staging_path(&self.path);
        tokio::fs::write(&staging, data).await?;
        if let Err(e) = tokio::fs::rename(&staging, &self.path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }
        debug!("Rewrote {} ({} records)", self.path.display(), records.len());
        Ok(())
    }
}

/// Sibling of `path` with a `.tmp` suffix, on the same filesystem so the
/// final rename is atomic.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

async fn load_records(path: &Path) -> Result<Vec<Reflection>, StoreError> {
    match tokio::fs::read(path).await {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Next integer after the current maximum sequential id.
fn next_id(records: &[Reflection]) -> i64 {
    records
        .iter()
        .filter_map(|r| match r.id {
            ReflectionId::Sequential(n) => Some(n),
            ReflectionId::Uuid(_) => None,
        })
        .max()
        .unwrap_or(0)
        + 1
}

#[async_trait]
impl ReflectionStore for JsonFileStore {
    fn backend(&self) -> &'static str {
        "json"
    }

    async fn create(&self, reflection: NewReflection) -> Result<Reflection, StoreError> {
        let mut records = self.records.lock().await;
        let stored = reflection.into_reflection(ReflectionId::Sequential(next_id(&records)));
        records.push(stored.clone());

        // The in-memory set must never run ahead of the file.
        if let Err(e) = self.persist(&records).await {
            records.pop();
            return Err(e);
        }
        Ok(stored)
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        page: Page,
    ) -> Result<Vec<Reflection>, StoreError> {
        let records = self.records.lock().await;
        let mut owned: Vec<&Reflection> = records.iter().filter(|r| r.user_id == user_id).collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn get(&self, id: ReflectionId) -> Result<Option<Reflection>, StoreError> {
        let records = self.records.lock().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn delete(&self, id: ReflectionId) -> Result<bool, StoreError> {
        let mut records = self.records.lock().await;
        let Some(index) = records.iter().position(|r| r.id == id) else {
            return Ok(false);
        };
        let removed = records.remove(index);

        if let Err(e) = self.persist(&records).await {
            records.insert(index, removed);
            return Err(e);
        }
        Ok(true)
    }

    async fn emotion_trend(
        &self,
        user_id: &str,
        window_days: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<TrendPoint>, StoreError> {
        let records = self.records.lock().await;
        Ok(aggregate_emotions(records.iter(), user_id, window_days, now))
    }
}
