use super::dto::{
    GenerateRequest, GenerationCreatedResponse, GenerationListResponse, GenerationResponse,
    ListGenerationsQuery, Pagination,
};
use super::error::GenerationServiceError;
use super::model::{Generation, GenerationQuery, GenerationStatus, MAX_TEXT_LENGTH};
use crate::infrastructure::queue::GenerationQueue;
use crate::infrastructure::repositories::GenerationRepository;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub struct GenerationService {
    generation_repo: Arc<dyn GenerationRepository>,
    queue: Arc<dyn GenerationQueue>,
}

impl GenerationService {
    pub fn new(
        generation_repo: Arc<dyn GenerationRepository>,
        queue: Arc<dyn GenerationQueue>,
    ) -> Self {
        Self {
            generation_repo,
            queue,
        }
    }

    fn validate(request: &GenerateRequest) -> Result<(), GenerationServiceError> {
        let text = &request.text;
        let mut errors = Vec::new();

        if text.trim().is_empty() {
            errors.push("Text can't be blank".to_string());
        }
        if text.chars().count() > MAX_TEXT_LENGTH {
            errors.push(format!(
                "Text is too long (maximum is {} characters)",
                MAX_TEXT_LENGTH
            ));
        }
        // Blank falls back to the default voice
        let voice_id = request.voice_id.as_deref().map(str::trim).unwrap_or_default();
        if !voice_id.is_empty() && !is_valid_voice_id(voice_id) {
            errors.push(
                "Voice can only contain letters, numbers, underscores and hyphens".to_string(),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(GenerationServiceError::Invalid(errors))
        }
    }

    fn parse_status(status: Option<&str>) -> Result<Option<GenerationStatus>, GenerationServiceError> {
        match status.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                GenerationServiceError::Invalid(vec![
                    "Status must be one of: pending, processing, completed, failed".to_string(),
                ])
            }),
        }
    }
}

/// Voice ids end up as a URL path segment at the speech provider
fn is_valid_voice_id(voice_id: &str) -> bool {
    voice_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[async_trait]
pub trait GenerationServiceApi: Send + Sync {
    /// Persist a `pending` record and hand it to the queue
    async fn submit(
        &self,
        request: GenerateRequest,
    ) -> Result<GenerationCreatedResponse, GenerationServiceError>;

    async fn get(&self, generation_id: Uuid) -> Result<GenerationResponse, GenerationServiceError>;

    async fn list(
        &self,
        query: ListGenerationsQuery,
    ) -> Result<GenerationListResponse, GenerationServiceError>;

    /// Re-enqueue records a previous process left unfinished
    async fn requeue_unfinished(&self) -> Result<usize, GenerationServiceError>;
}

#[async_trait]
impl GenerationServiceApi for GenerationService {
    async fn submit(
        &self,
        request: GenerateRequest,
    ) -> Result<GenerationCreatedResponse, GenerationServiceError> {
        Self::validate(&request)?;

        let generation = Generation::new(request.text, request.voice_id);
        let created = self.generation_repo.create(&generation).await?;

        tracing::info!(
            generation_id = %created.id,
            voice_id = %created.voice_id,
            text_length = created.text.chars().count(),
            "Generation accepted"
        );

        if let Err(queue_err) = self.queue.enqueue(created.id).await {
            tracing::warn!(
                generation_id = %created.id,
                error = %queue_err,
                "Generation could not be enqueued, marking it failed"
            );
            let message = format!("QueueError: {}", queue_err);
            if let Err(store_err) = self.generation_repo.mark_failed(created.id, &message).await {
                tracing::error!(
                    generation_id = %created.id,
                    error = %store_err,
                    "Could not record enqueue failure"
                );
            }
            return Err(queue_err.into());
        }

        Ok(GenerationCreatedResponse::from(created))
    }

    async fn get(&self, generation_id: Uuid) -> Result<GenerationResponse, GenerationServiceError> {
        self.generation_repo
            .find_by_id(generation_id)
            .await?
            .map(GenerationResponse::from)
            .ok_or(GenerationServiceError::NotFound)
    }

    async fn list(
        &self,
        query: ListGenerationsQuery,
    ) -> Result<GenerationListResponse, GenerationServiceError> {
        let status = Self::parse_status(query.status.as_deref())?;
        let pagination = Pagination::from_params(query.page.as_deref(), query.per_page.as_deref());

        let generations = self
            .generation_repo
            .list(GenerationQuery {
                status,
                limit: pagination.per_page,
                offset: pagination.offset(),
            })
            .await?;

        Ok(GenerationListResponse {
            generations: generations.into_iter().map(GenerationResponse::from).collect(),
            page: pagination.page,
            per_page: pagination.per_page,
        })
    }

    async fn requeue_unfinished(&self) -> Result<usize, GenerationServiceError> {
        let ids = self.generation_repo.find_unfinished_ids().await?;

        for id in &ids {
            self.queue.enqueue(*id).await?;
        }

        if !ids.is_empty() {
            tracing::info!(count = ids.len(), "Re-enqueued unfinished generations");
        }

        Ok(ids.len())
    }
}
