use super::model::{Generation, GenerationStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;

/// Body of `POST /generate`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub voice_id: Option<String>,
}

/// Returned right after a record is accepted
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationCreatedResponse {
    pub id: Uuid,
    pub status: GenerationStatus,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<Generation> for GenerationCreatedResponse {
    fn from(generation: Generation) -> Self {
        Self {
            id: generation.id,
            status: generation.status,
            text: generation.text,
            created_at: generation.created_at,
        }
    }
}

/// Public view of a record. Unset fields serialize as `null`; the storage id stays internal.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GenerationResponse {
    pub id: Uuid,
    pub text: String,
    pub status: GenerationStatus,
    pub audio_url: Option<String>,
    pub voice_id: String,
    pub duration: Option<f64>,
    pub file_size: Option<i64>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Generation> for GenerationResponse {
    fn from(generation: Generation) -> Self {
        Self {
            id: generation.id,
            text: generation.text,
            status: generation.status,
            audio_url: generation.audio_url,
            voice_id: generation.voice_id,
            duration: generation.duration,
            file_size: generation.file_size,
            error_message: generation.error_message,
            created_at: generation.created_at,
            updated_at: generation.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationListResponse {
    pub generations: Vec<GenerationResponse>,
    pub page: i64,
    pub per_page: i64,
}

/// Raw query string of `GET /generations`.
///
/// Kept as strings so that a non-numeric page falls back to the default
/// instead of rejecting the whole request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListGenerationsQuery {
    pub status: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn from_params(page: Option<&str>, per_page: Option<&str>) -> Self {
        let page = parse_number(page).unwrap_or(DEFAULT_PAGE).max(1);
        let per_page = parse_number(per_page)
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        Self { page, per_page }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

fn parse_number(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse::<i64>().ok())
}
