use crate::domain::generation::{Generation, GenerationQuery, GenerationStatus, UploadedAudio};
use crate::infrastructure::db::{check_connection, DbPool};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Row store for generation records.
///
/// Every state transition is a single UPDATE so readers never observe a
/// half-written record. Writes bump `updated_at`.
#[async_trait]
pub trait GenerationRepository: Send + Sync {
    async fn create(&self, generation: &Generation) -> Result<Generation, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Generation>, StoreError>;

    /// Newest first, optionally filtered by status
    async fn list(&self, query: GenerationQuery) -> Result<Vec<Generation>, StoreError>;

    /// Ids of records still `pending` or `processing`, oldest first
    async fn find_unfinished_ids(&self) -> Result<Vec<Uuid>, StoreError>;

    /// Enter `processing`, clearing anything a previous attempt left behind
    async fn mark_processing(&self, id: Uuid) -> Result<(), StoreError>;

    async fn mark_completed(&self, id: Uuid, audio: &UploadedAudio) -> Result<(), StoreError>;

    async fn mark_failed(&self, id: Uuid, error_message: &str) -> Result<(), StoreError>;

    async fn check_connection(&self) -> Result<(), StoreError>;
}

pub struct PgGenerationRepository {
    pool: Arc<DbPool>,
}

impl PgGenerationRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: GenerationStatus,
        audio: Option<&UploadedAudio>,
        error_message: Option<&str>,
    ) -> Result<(), StoreError> {
        let pool = self.pool.as_ref();
        sqlx::query(
            r#"
            UPDATE audio_generations
            SET status = $1,
                audio_url = $2,
                storage_public_id = $3,
                duration = $4,
                file_size = $5,
                error_message = $6,
                updated_at = $7
            WHERE id = $8
            "#,
        )
        .bind(status)
        .bind(audio.map(|a| a.url.as_str()))
        .bind(audio.map(|a| a.public_id.as_str()))
        .bind(audio.and_then(|a| a.duration))
        .bind(audio.and_then(|a| a.byte_size))
        .bind(error_message)
        .bind(chrono::Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl GenerationRepository for PgGenerationRepository {
    async fn create(&self, generation: &Generation) -> Result<Generation, StoreError> {
        let pool = self.pool.as_ref();
        let created = sqlx::query_as::<_, Generation>(
            r#"
            INSERT INTO audio_generations (id, text, voice_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(generation.id)
        .bind(&generation.text)
        .bind(&generation.voice_id)
        .bind(generation.status)
        .bind(generation.created_at)
        .bind(generation.updated_at)
        .fetch_one(pool)
        .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Generation>, StoreError> {
        let pool = self.pool.as_ref();
        let generation =
            sqlx::query_as::<_, Generation>("SELECT * FROM audio_generations WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;

        Ok(generation)
    }

    async fn list(&self, query: GenerationQuery) -> Result<Vec<Generation>, StoreError> {
        let pool = self.pool.as_ref();
        let generations = sqlx::query_as::<_, Generation>(
            r#"
            SELECT *
            FROM audio_generations
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(query.status)
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(pool)
        .await?;

        Ok(generations)
    }

    async fn find_unfinished_ids(&self) -> Result<Vec<Uuid>, StoreError> {
        let pool = self.pool.as_ref();
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id
            FROM audio_generations
            WHERE status IN ('pending', 'processing')
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(ids)
    }

    async fn mark_processing(&self, id: Uuid) -> Result<(), StoreError> {
        self.set_status(id, GenerationStatus::Processing, None, None)
            .await
    }

    async fn mark_completed(&self, id: Uuid, audio: &UploadedAudio) -> Result<(), StoreError> {
        self.set_status(id, GenerationStatus::Completed, Some(audio), None)
            .await
    }

    async fn mark_failed(&self, id: Uuid, error_message: &str) -> Result<(), StoreError> {
        self.set_status(id, GenerationStatus::Failed, None, Some(error_message))
            .await
    }

    async fn check_connection(&self) -> Result<(), StoreError> {
        check_connection(&self.pool).await?;
        Ok(())
    }
}
