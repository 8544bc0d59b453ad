pub mod cloudinary_media_repository;
pub mod elevenlabs_speech_repository;
pub mod generation_repository;
pub mod media_repository;
pub mod speech_repository;

pub use cloudinary_media_repository::CloudinaryMediaRepository;
pub use elevenlabs_speech_repository::ElevenLabsSpeechRepository;
pub use generation_repository::{GenerationRepository, PgGenerationRepository, StoreError};
pub use media_repository::{MediaRepository, UploadError};
pub use speech_repository::{SpeechError, SpeechRepository};
