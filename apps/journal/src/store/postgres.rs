use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::reflections::models::{EmotionTag, NewReflection, Reflection, ReflectionId};
use crate::reflections::trend::{sort_by_name, TrendPoint};
use crate::store::{Page, ReflectionStore, StoreError};

#[derive(Debug, Clone, FromRow)]
struct ReflectionRow {
    id: Uuid,
    user_id: String,
    prompt_id: String,
    body: String,
    emotions: Vec<String>,
    insights: Option<String>,
    facilitator_visible: bool,
    voice_note_url: Option<String>,
    voice_note_duration: Option<i32>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReflectionRow> for Reflection {
    type Error = StoreError;

    fn try_from(row: ReflectionRow) -> Result<Self, Self::Error> {
        let emotions = parse_stored_emotions(&row.emotions)?;
        Ok(Reflection {
            id: ReflectionId::Uuid(row.id),
            user_id: row.user_id,
            prompt_id: row.prompt_id,
            body: row.body,
            emotions,
            insights: row.insights,
            facilitator_visible: row.facilitator_visible,
            voice_note_url: row.voice_note_url,
            voice_note_duration: row.voice_note_duration,
            created_at: row.created_at,
        })
    }
}

fn parse_stored_emotions(raw: &[String]) -> Result<Vec<EmotionTag>, StoreError> {
    raw.iter()
        .map(|s| s.parse::<EmotionTag>().map_err(|e| StoreError::Corrupt(format!("{e}"))))
        .collect()
}

/// Managed PostgreSQL store. Identifiers are UUIDs generated by the database;
/// trend aggregation runs server-side in `get_emotion_trend`.
pub struct PgReflectionStore {
    pool: PgPool,
}

impl PgReflectionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReflectionStore for PgReflectionStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn create(&self, reflection: NewReflection) -> Result<Reflection, StoreError> {
        let emotions: Vec<String> = reflection
            .emotions
            .iter()
            .map(|e| e.as_str().to_string())
            .collect();

        let row = sqlx::query_as::<_, ReflectionRow>(
            r#"
            INSERT INTO reflections
                (user_id, prompt_id, body, emotions, insights,
                 facilitator_visible, voice_note_url, voice_note_duration, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&reflection.user_id)
        .bind(&reflection.prompt_id)
        .bind(&reflection.body)
        .bind(&emotions)
        .bind(&reflection.insights)
        .bind(reflection.facilitator_visible)
        .bind(&reflection.voice_note_url)
        .bind(reflection.voice_note_duration)
        .bind(reflection.created_at)
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted reflection {} for user {}", row.id, row.user_id);
        row.try_into()
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        page: Page,
    ) -> Result<Vec<Reflection>, StoreError> {
        let rows = sqlx::query_as::<_, ReflectionRow>(
            r#"
            SELECT * FROM reflections
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Reflection::try_from).collect()
    }

    async fn get(&self, id: ReflectionId) -> Result<Option<Reflection>, StoreError> {
        let ReflectionId::Uuid(id) = id else {
            return Ok(None);
        };
        sqlx::query_as::<_, ReflectionRow>("SELECT * FROM reflections WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Reflection::try_from)
            .transpose()
    }

    async fn delete(&self, id: ReflectionId) -> Result<bool, StoreError> {
        let ReflectionId::Uuid(id) = id else {
            return Ok(false);
        };
        let result = sqlx::query("DELETE FROM reflections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn emotion_trend(
        &self,
        user_id: &str,
        window_days: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<TrendPoint>, StoreError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT emotion, count FROM get_emotion_trend($1, $2, $3)")
                .bind(user_id)
                .bind(window_days as i32)
                .bind(now)
                .fetch_all(&self.pool)
                .await?;

        let mut trend = rows
            .into_iter()
            .map(|(emotion, count)| {
                Ok(TrendPoint {
                    emotion: emotion
                        .parse::<EmotionTag>()
                        .map_err(|e| StoreError::Corrupt(format!("{e}")))?,
                    count: u32::try_from(count)
                        .map_err(|_| StoreError::Corrupt(format!("count {count} out of range")))?,
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;
        // Database collation may not match byte order.
        sort_by_name(&mut trend);
        Ok(trend)
    }
}


/// Round trips against a live database. Run with
/// `DATABASE_URL=postgres://... cargo test -- --ignored`.
#[cfg(test)]
mod pg_tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use EmotionTag::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
    }

    fn new_reflection(user: &str, days_ago: i64, emotions: &[EmotionTag]) -> NewReflection {
        NewReflection {
            user_id: user.to_string(),
            prompt_id: "daily-1".to_string(),
            body: "Counted to ten".to_string(),
            emotions: emotions.to_vec(),
            insights: None,
            facilitator_visible: true,
            voice_note_url: None,
            voice_note_duration: Some(30),
            created_at: now() - Duration::days(days_ago),
        }
    }

    async fn trend(store: &PgReflectionStore, user: &str) -> Vec<(EmotionTag, u32)> {
        store
            .emotion_trend(user, 7, now())
            .await
            .unwrap()
            .into_iter()
            .map(|p| (p.emotion, p.count))
            .collect()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
    async fn test_create_list_trend_delete(pool: PgPool) {
        let store = PgReflectionStore::new(pool);

        let recent = store
            .create(new_reflection("alice", 1, &[Calm, Hope]))
            .await
            .unwrap();
        let older = store
            .create(new_reflection("alice", 2, &[Calm]))
            .await
            .unwrap();
        store
            .create(new_reflection("alice", 10, &[Anger]))
            .await
            .unwrap();
        store
            .create(new_reflection("bob", 1, &[Guilt]))
            .await
            .unwrap();

        assert!(matches!(recent.id, ReflectionId::Uuid(_)));
        assert_eq!(recent.emotions, vec![Calm, Hope]);
        assert_eq!(recent.voice_note_duration, Some(30));

        let listed = store
            .list_for_user("alice", Page { limit: 20, offset: 0 })
            .await
            .unwrap();
        let created: Vec<_> = listed.iter().map(|r| r.created_at).collect();
        assert_eq!(
            created,
            vec![
                now() - Duration::days(1),
                now() - Duration::days(2),
                now() - Duration::days(10)
            ]
        );

        assert_eq!(trend(&store, "alice").await, vec![(Calm, 2), (Hope, 1)]);
        assert_eq!(trend(&store, "bob").await, vec![(Guilt, 1)]);
        assert!(trend(&store, "carol").await.is_empty());

        assert_eq!(store.get(older.id).await.unwrap(), Some(older.clone()));
        assert!(store.delete(older.id).await.unwrap());
        assert!(!store.delete(older.id).await.unwrap());
        assert!(store.get(older.id).await.unwrap().is_none());
        assert_eq!(trend(&store, "alice").await, vec![(Calm, 1), (Hope, 1)]);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
    async fn test_list_pages_and_sequential_ids_miss(pool: PgPool) {
        let store = PgReflectionStore::new(pool);
        for day in 0..4 {
            store
                .create(new_reflection("alice", day, &[]))
                .await
                .unwrap();
        }

        let page = store
            .list_for_user("alice", Page { limit: 2, offset: 1 })
            .await
            .unwrap();
        let created: Vec<_> = page.iter().map(|r| r.created_at).collect();
        assert_eq!(created, vec![now() - Duration::days(1), now() - Duration::days(2)]);

        assert!(store.get(ReflectionId::Sequential(1)).await.unwrap().is_none());
        assert!(!store.delete(ReflectionId::Sequential(1)).await.unwrap());
    }
}
