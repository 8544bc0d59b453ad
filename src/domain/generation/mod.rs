pub mod dto;
pub mod error;
pub mod model;
pub mod service;
pub mod worker;

#[cfg(test)]
pub(crate) mod fakes;

pub use dto::{
    GenerateRequest, GenerationCreatedResponse, GenerationListResponse, GenerationResponse,
    ListGenerationsQuery, Pagination,
};
pub use error::{GenerationServiceError, PipelineError};
pub use model::{
    Generation, GenerationQuery, GenerationStatus, UploadedAudio, DEFAULT_VOICE_ID,
    MAX_TEXT_LENGTH,
};
pub use service::{GenerationService, GenerationServiceApi};
pub use worker::GenerationWorker;
