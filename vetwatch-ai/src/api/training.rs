//! Training data ingestion endpoints

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::forms::{record_submission, require_valid};
use crate::forms::{FieldValues, FormType};
use crate::store::models::{NewTrainingData, TrainingData};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub training_data: TrainingData,
    /// Non-blocking validation remarks (e.g. blank list items dropped)
    pub warnings: Vec<String>,
}

/// GET /api/training
pub async fn list_training_data(State(state): State<AppState>) -> Json<Vec<TrainingData>> {
    Json(state.store.training_data().await)
}

/// POST /api/training
///
/// Body uses the aiFeeding form fields.
pub async fn ingest_training_data(
    State(state): State<AppState>,
    Json(data): Json<FieldValues>,
) -> ApiResult<(StatusCode, Json<IngestResponse>)> {
    let outcome = require_valid(FormType::AiFeeding, &data)?;

    let new: NewTrainingData = serde_json::from_value(Value::Object(data.clone()))
        .map_err(|e| ApiError::BadRequest(format!("Invalid training payload: {}", e)))?;

    let training_data = state.store.add_training_data(TrainingData::ingest(new)).await;
    record_submission(&state, FormType::AiFeeding.as_str(), data).await;

    info!(
        training_id = %training_data.id,
        symptoms = training_data.symptoms.len(),
        animal_type = %training_data.animal_type,
        "Training data ingested"
    );

    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            training_data,
            warnings: outcome.warnings,
        }),
    ))
}

/// Build training routes
pub fn training_routes() -> Router<AppState> {
    Router::new().route("/api/training", get(list_training_data).post(ingest_training_data))
}
