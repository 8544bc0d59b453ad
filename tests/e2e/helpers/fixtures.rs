use chrono::{Duration, Utc};
use std::sync::Arc;
use voicegen_backend::domain::generation::{Generation, GenerationStatus};

use super::in_memory_store::InMemoryGenerationRepository;

pub struct TestFixtures {
    store: Arc<InMemoryGenerationRepository>,
}

impl TestFixtures {
    pub fn new(store: Arc<InMemoryGenerationRepository>) -> Self {
        Self { store }
    }

    /// Seed a record in `status`, created `minutes_ago` minutes in the past
    pub fn create_generation(
        &self,
        text: &str,
        status: GenerationStatus,
        minutes_ago: i64,
    ) -> Generation {
        let mut generation = Generation::new(text.to_string(), None);
        generation.status = status;
        generation.created_at = Utc::now() - Duration::minutes(minutes_ago);
        generation.updated_at = generation.created_at;

        if status == GenerationStatus::Completed {
            generation.audio_url = Some(format!("https://cdn.test/{}.mp3", generation.id));
            generation.storage_public_id = Some(format!("voice_generations/{}", generation.id));
            generation.duration = Some(1.5);
            generation.file_size = Some(2048);
        }
        if status == GenerationStatus::Failed {
            generation.error_message = Some("ProviderError: Rate limit exceeded".to_string());
        }

        self.store.insert(generation.clone());
        generation
    }
}
