use super::error::PipelineError;
use super::model::{Generation, UploadedAudio};
use crate::infrastructure::repositories::{GenerationRepository, MediaRepository, SpeechRepository};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Drives one generation record through synthesis and upload.
///
/// Write order for a run is fixed: `processing` is persisted before any
/// outbound call, and the `completed`/`failed` write is the last one.
pub struct GenerationWorker {
    generation_repo: Arc<dyn GenerationRepository>,
    speech_repo: Arc<dyn SpeechRepository>,
    media_repo: Arc<dyn MediaRepository>,
}

impl GenerationWorker {
    pub fn new(
        generation_repo: Arc<dyn GenerationRepository>,
        speech_repo: Arc<dyn SpeechRepository>,
        media_repo: Arc<dyn MediaRepository>,
    ) -> Self {
        Self {
            generation_repo,
            speech_repo,
            media_repo,
        }
    }

    /// Execute one attempt for `generation_id`.
    ///
    /// A missing record returns `NotFound` without writing anything. Any other
    /// failure is recorded on the record as `failed` and then returned so the
    /// caller can decide on redelivery.
    pub async fn run(&self, generation_id: Uuid) -> Result<(), PipelineError> {
        let generation = self
            .generation_repo
            .find_by_id(generation_id)
            .await?
            .ok_or(PipelineError::NotFound(generation_id))?;

        tracing::info!(
            generation_id = %generation_id,
            previous_status = %generation.status,
            voice_id = %generation.voice_id,
            "Starting audio generation"
        );

        self.generation_repo.mark_processing(generation_id).await?;

        match self.process(&generation).await {
            Ok(uploaded) => {
                tracing::info!(
                    generation_id = %generation_id,
                    audio_url = %uploaded.url,
                    "Audio generation completed"
                );
                Ok(())
            }
            Err(err) => {
                tracing::error!(
                    generation_id = %generation_id,
                    category = err.category(),
                    error = %err,
                    "Audio generation failed"
                );

                if let Err(store_err) = self
                    .generation_repo
                    .mark_failed(generation_id, &err.to_string())
                    .await
                {
                    tracing::error!(
                        generation_id = %generation_id,
                        error = %store_err,
                        "Could not record generation failure"
                    );
                }

                Err(err)
            }
        }
    }

    async fn process(&self, generation: &Generation) -> Result<UploadedAudio, PipelineError> {
        let audio = self
            .speech_repo
            .synthesize(&generation.text, &generation.voice_id)
            .await?;

        let name = storage_name(generation.id);
        let uploaded = self.media_repo.upload(audio, &name).await?;

        if let Err(store_err) = self
            .generation_repo
            .mark_completed(generation.id, &uploaded)
            .await
        {
            // The record will say `failed`; don't leave an orphaned file behind
            self.media_repo.delete(&uploaded.public_id).await;
            return Err(store_err.into());
        }

        Ok(uploaded)
    }
}

/// `audio_{id}_{unix seconds}`: unique per record and per attempt second
fn storage_name(generation_id: Uuid) -> String {
    format!("audio_{}_{}", generation_id, Utc::now().timestamp())
}
