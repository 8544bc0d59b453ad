use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;
use voicegen_backend::domain::generation::{
    Generation, GenerationQuery, GenerationStatus, UploadedAudio,
};
use voicegen_backend::infrastructure::repositories::{GenerationRepository, StoreError};

/// Generation store held in memory so the HTTP suite runs without Docker
#[derive(Default)]
pub struct InMemoryGenerationRepository {
    records: RwLock<HashMap<Uuid, Generation>>,
    unavailable: AtomicBool,
}

impl InMemoryGenerationRepository {
    pub fn insert(&self, generation: Generation) {
        self.records.write().insert(generation.id, generation);
    }

    pub fn get(&self, id: Uuid) -> Option<Generation> {
        self.records.read().get(&id).cloned()
    }

    pub fn count(&self) -> usize {
        self.records.read().len()
    }

    /// Make every call fail the way a lost database connection would
    pub fn set_unavailable(&self) {
        self.unavailable.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }

    fn set(
        &self,
        id: Uuid,
        status: GenerationStatus,
        audio: Option<&UploadedAudio>,
        error_message: Option<&str>,
    ) -> Result<(), StoreError> {
        self.check()?;
        if let Some(record) = self.records.write().get_mut(&id) {
            record.status = status;
            record.audio_url = audio.map(|a| a.url.clone());
            record.storage_public_id = audio.map(|a| a.public_id.clone());
            record.duration = audio.and_then(|a| a.duration);
            record.file_size = audio.and_then(|a| a.byte_size);
            record.error_message = error_message.map(str::to_string);
            record.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[async_trait]
impl GenerationRepository for InMemoryGenerationRepository {
    async fn create(&self, generation: &Generation) -> Result<Generation, StoreError> {
        self.check()?;
        self.insert(generation.clone());
        Ok(generation.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Generation>, StoreError> {
        self.check()?;
        Ok(self.get(id))
    }

    async fn list(&self, query: GenerationQuery) -> Result<Vec<Generation>, StoreError> {
        self.check()?;
        let mut records: Vec<Generation> = self
            .records
            .read()
            .values()
            .filter(|r| query.status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect())
    }

    async fn find_unfinished_ids(&self) -> Result<Vec<Uuid>, StoreError> {
        self.check()?;
        let mut records: Vec<Generation> = self
            .records
            .read()
            .values()
            .filter(|r| !r.status.is_terminal())
            .cloned()
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records.into_iter().map(|r| r.id).collect())
    }

    async fn mark_processing(&self, id: Uuid) -> Result<(), StoreError> {
        self.set(id, GenerationStatus::Processing, None, None)
    }

    async fn mark_completed(&self, id: Uuid, audio: &UploadedAudio) -> Result<(), StoreError> {
        self.set(id, GenerationStatus::Completed, Some(audio), None)
    }

    async fn mark_failed(&self, id: Uuid, error_message: &str) -> Result<(), StoreError> {
        self.set(id, GenerationStatus::Failed, None, Some(error_message))
    }

    async fn check_connection(&self) -> Result<(), StoreError> {
        self.check()
    }
}
