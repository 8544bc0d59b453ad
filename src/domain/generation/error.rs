use crate::error::AppError;
use crate::infrastructure::queue::QueueError;
use crate::infrastructure::repositories::{SpeechError, StoreError, UploadError};
use uuid::Uuid;

/// Failure of one worker run. The display form is what lands in `error_message`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("NotFound: generation {0} does not exist")]
    NotFound(Uuid),
    #[error("ProviderError: {0}")]
    Provider(String),
    #[error("TransportError: {0}")]
    Transport(String),
    #[error("UploadError: {0}")]
    Upload(String),
    #[error("StoreError: {0}")]
    Store(String),
}

impl PipelineError {
    pub fn category(&self) -> &'static str {
        match self {
            PipelineError::NotFound(_) => "NotFound",
            PipelineError::Provider(_) => "ProviderError",
            PipelineError::Transport(_) => "TransportError",
            PipelineError::Upload(_) => "UploadError",
            PipelineError::Store(_) => "StoreError",
        }
    }

    /// Only a vanished record is permanent; everything else counts as an attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, PipelineError::NotFound(_))
    }
}

impl From<SpeechError> for PipelineError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::Provider(msg) => PipelineError::Provider(msg),
            SpeechError::Transport(msg) => PipelineError::Transport(msg),
        }
    }
}

impl From<UploadError> for PipelineError {
    fn from(err: UploadError) -> Self {
        PipelineError::Upload(err.0)
    }
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        PipelineError::Store(err.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationServiceError {
    #[error("invalid input: {}", .0.join(", "))]
    Invalid(Vec<String>),
    #[error("generation not found")]
    NotFound,
    #[error("dependency error: {0}")]
    Dependency(String),
}

impl From<StoreError> for GenerationServiceError {
    fn from(err: StoreError) -> Self {
        GenerationServiceError::Dependency(err.to_string())
    }
}

impl From<QueueError> for GenerationServiceError {
    fn from(err: QueueError) -> Self {
        GenerationServiceError::Dependency(err.to_string())
    }
}

impl From<GenerationServiceError> for AppError {
    fn from(err: GenerationServiceError) -> Self {
        match err {
            GenerationServiceError::Invalid(errors) => AppError::Validation(errors),
            GenerationServiceError::NotFound => {
                AppError::NotFound("Audio generation not found".to_string())
            }
            GenerationServiceError::Dependency(msg) => AppError::Internal(msg),
        }
    }
}
