//! In-memory collaborators for unit tests.

use super::model::{Generation, GenerationQuery, GenerationStatus, UploadedAudio};
use crate::infrastructure::queue::{GenerationQueue, QueueError};
use crate::infrastructure::repositories::{GenerationRepository, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryGenerations {
    records: Mutex<HashMap<Uuid, Generation>>,
    writes: Mutex<Vec<(Uuid, GenerationStatus)>>,
    fail_completed_write: AtomicBool,
}

impl InMemoryGenerations {
    pub fn with(generation: Generation) -> Self {
        let store = Self::default();
        store.records.lock().insert(generation.id, generation);
        store
    }

    pub fn get(&self, id: Uuid) -> Generation {
        self.records.lock().get(&id).cloned().expect("record exists")
    }

    pub fn all(&self) -> Vec<Generation> {
        self.records.lock().values().cloned().collect()
    }

    /// Status transitions in the order they were written
    pub fn writes(&self) -> Vec<(Uuid, GenerationStatus)> {
        self.writes.lock().clone()
    }

    pub fn fail_completed_write(&self) {
        self.fail_completed_write.store(true, Ordering::SeqCst);
    }

    fn update(&self, id: Uuid, f: impl FnOnce(&mut Generation)) {
        if let Some(record) = self.records.lock().get_mut(&id) {
            f(record);
            record.updated_at = Utc::now();
            self.writes.lock().push((id, record.status));
        }
    }
}

#[async_trait]
impl GenerationRepository for InMemoryGenerations {
    async fn create(&self, generation: &Generation) -> Result<Generation, StoreError> {
        self.records.lock().insert(generation.id, generation.clone());
        Ok(generation.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Generation>, StoreError> {
        Ok(self.records.lock().get(&id).cloned())
    }

    async fn list(&self, query: GenerationQuery) -> Result<Vec<Generation>, StoreError> {
        let mut records: Vec<Generation> = self
            .all()
            .into_iter()
            .filter(|r| query.status.map_or(true, |s| r.status == s))
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect())
    }

    async fn find_unfinished_ids(&self) -> Result<Vec<Uuid>, StoreError> {
        let mut records: Vec<Generation> = self
            .all()
            .into_iter()
            .filter(|r| !r.status.is_terminal())
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records.into_iter().map(|r| r.id).collect())
    }

    async fn mark_processing(&self, id: Uuid) -> Result<(), StoreError> {
        self.update(id, |r| {
            r.status = GenerationStatus::Processing;
            r.audio_url = None;
            r.storage_public_id = None;
            r.duration = None;
            r.file_size = None;
            r.error_message = None;
        });
        Ok(())
    }

    async fn mark_completed(&self, id: Uuid, audio: &UploadedAudio) -> Result<(), StoreError> {
        if self.fail_completed_write.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        self.update(id, |r| {
            r.status = GenerationStatus::Completed;
            r.audio_url = Some(audio.url.clone());
            r.storage_public_id = Some(audio.public_id.clone());
            r.duration = audio.duration;
            r.file_size = audio.byte_size;
            r.error_message = None;
        });
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, error_message: &str) -> Result<(), StoreError> {
        self.update(id, |r| {
            r.status = GenerationStatus::Failed;
            r.audio_url = None;
            r.storage_public_id = None;
            r.duration = None;
            r.file_size = None;
            r.error_message = Some(error_message.to_string());
        });
        Ok(())
    }

    async fn check_connection(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Remembers enqueued ids without running anything
#[derive(Default)]
pub struct RecordingQueue {
    enqueued: Mutex<Vec<Uuid>>,
    closed: AtomicBool,
}

impl RecordingQueue {
    pub fn enqueued(&self) -> Vec<Uuid> {
        self.enqueued.lock().clone()
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl GenerationQueue for RecordingQueue {
    async fn enqueue(&self, generation_id: Uuid) -> Result<(), QueueError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(QueueError::Closed);
        }
        self.enqueued.lock().push(generation_id);
        Ok(())
    }
}
