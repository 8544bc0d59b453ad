use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpeechError {
    /// The provider answered but rejected the request or sent something unusable
    #[error("{0}")]
    Provider(String),
    /// Timeout, connection failure or a broken response stream
    #[error("{0}")]
    Transport(String),
}

/// Repository for speech synthesis.
/// Abstracts the underlying TTS provider (ElevenLabs today).
#[async_trait]
pub trait SpeechRepository: Send + Sync {
    /// Synthesize `text` with the given provider voice
    ///
    /// Returns the encoded audio (MP3) exactly as the provider sent it
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, SpeechError>;
}
