use crate::domain::generation::UploadedAudio;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct UploadError(pub String);

/// Repository for hosted audio files (Cloudinary today)
#[async_trait]
pub trait MediaRepository: Send + Sync {
    /// Store `audio` under `name` and return where it lives
    async fn upload(&self, audio: Vec<u8>, name: &str) -> Result<UploadedAudio, UploadError>;

    /// Best-effort removal. Failures are logged, never returned.
    async fn delete(&self, public_id: &str);
}
