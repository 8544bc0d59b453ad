use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Maximum number of characters accepted for synthesis
pub const MAX_TEXT_LENGTH: usize = 5000;

/// Rachel - a popular ElevenLabs voice
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "lowercase")]
pub enum GenerationStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "processing")]
    Processing,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "failed")]
    Failed,
}

impl GenerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStatus::Pending => "pending",
            GenerationStatus::Processing => "processing",
            GenerationStatus::Completed => "completed",
            GenerationStatus::Failed => "failed",
        }
    }

    /// Completed and failed end an attempt
    pub fn is_terminal(&self) -> bool {
        matches!(self, GenerationStatus::Completed | GenerationStatus::Failed)
    }
}

impl std::fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for GenerationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(GenerationStatus::Pending),
            "processing" => Ok(GenerationStatus::Processing),
            "completed" => Ok(GenerationStatus::Completed),
            "failed" => Ok(GenerationStatus::Failed),
            other => Err(format!("unknown generation status: {}", other)),
        }
    }
}

/// A persisted text-to-speech request and its lifecycle
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Generation {
    pub id: Uuid,
    pub text: String,
    pub voice_id: String,
    pub status: GenerationStatus,
    pub audio_url: Option<String>,
    pub storage_public_id: Option<String>,
    pub duration: Option<f64>,
    pub file_size: Option<i64>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Generation {
    /// Build a fresh `pending` record. Blank voice ids fall back to the default voice.
    pub fn new(text: String, voice_id: Option<String>) -> Self {
        let voice_id = voice_id
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_VOICE_ID.to_string());
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            text,
            voice_id,
            status: GenerationStatus::Pending,
            audio_url: None,
            storage_public_id: None,
            duration: None,
            file_size: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Metadata returned by the media host after a successful upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedAudio {
    pub url: String,
    pub public_id: String,
    pub duration: Option<f64>,
    pub byte_size: Option<i64>,
}

/// Filter and window for listing generations, newest first
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationQuery {
    pub status: Option<GenerationStatus>,
    pub limit: i64,
    pub offset: i64,
}
