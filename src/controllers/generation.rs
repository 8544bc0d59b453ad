use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::generation::{
    GenerateRequest, GenerationCreatedResponse, GenerationListResponse, GenerationResponse,
    GenerationServiceApi, ListGenerationsQuery,
};
use crate::error::{AppError, AppResult};

pub struct GenerationController {
    generation_service: Arc<dyn GenerationServiceApi>,
}

impl GenerationController {
    pub fn new(generation_service: Arc<dyn GenerationServiceApi>) -> Self {
        Self { generation_service }
    }

    /// POST /generate - Accept text for background synthesis
    pub async fn generate(
        State(controller): State<Arc<GenerationController>>,
        payload: Result<Json<GenerateRequest>, JsonRejection>,
    ) -> AppResult<(StatusCode, Json<GenerationCreatedResponse>)> {
        let Json(request) = payload.map_err(|rejection| {
            AppError::Validation(vec![format!("Invalid request body: {}", rejection.body_text())])
        })?;

        let created = controller.generation_service.submit(request).await?;
        Ok((StatusCode::CREATED, Json(created)))
    }

    /// GET /generations - List generations, newest first
    pub async fn list_generations(
        State(controller): State<Arc<GenerationController>>,
        Query(query): Query<ListGenerationsQuery>,
    ) -> AppResult<Json<GenerationListResponse>> {
        let generations = controller.generation_service.list(query).await?;
        Ok(Json(generations))
    }

    /// GET /generations/:id - Fetch one generation
    pub async fn get_generation(
        State(controller): State<Arc<GenerationController>>,
        Path(generation_id): Path<String>,
    ) -> AppResult<Json<GenerationResponse>> {
        // A malformed id can't match any record
        let generation_id = Uuid::parse_str(&generation_id)
            .map_err(|_| AppError::NotFound("Audio generation not found".to_string()))?;

        let generation = controller.generation_service.get(generation_id).await?;
        Ok(Json(generation))
    }
}
