//! Form engine endpoints
//!
//! Schemas, ad-hoc validation, submission history, per-record reports and
//! comparison of two records.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;
use vetwatch_common::events::VetEvent;

use crate::forms::{
    self, require_schema, FieldValues, FormComparison, FormData, FormReport, FormSchema, FormType,
    ValidationOutcome,
};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub form_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordRequest {
    pub form_type: String,
    #[serde(default)]
    pub data: FieldValues,
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub form_type: String,
    pub id1: Uuid,
    pub id2: Uuid,
}

/// Validate a submission, turning failures into a 400 with every problem listed
pub(crate) fn require_valid(form_type: FormType, data: &FieldValues) -> ApiResult<ValidationOutcome> {
    let outcome = forms::validate(form_type.as_str(), data);
    if outcome.is_valid {
        Ok(outcome)
    } else {
        Err(ApiError::Validation {
            errors: outcome.errors,
            warnings: outcome.warnings,
        })
    }
}

/// Append a submission to the history and announce it
pub(crate) async fn record_submission(state: &AppState, form_type: &str, data: FieldValues) -> FormData {
    let record = state.store.record_form(FormData::new(form_type, data)).await;

    state.event_bus.emit_lossy(VetEvent::FormRecorded {
        record_id: record.id,
        form_type: record.form_type.clone(),
        timestamp: record.timestamp,
    });

    record
}

async fn find_record(state: &AppState, id: Uuid) -> ApiResult<FormData> {
    state
        .store
        .find_form_record(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Form record {}", id)))
}

/// GET /api/forms/schemas
pub async fn list_schemas() -> Json<BTreeMap<&'static str, &'static FormSchema>> {
    Json(forms::all_schemas())
}

/// GET /api/forms/schemas/:form_type
pub async fn get_schema(Path(form_type): Path<String>) -> ApiResult<Json<&'static FormSchema>> {
    Ok(Json(require_schema(&form_type)?))
}

/// POST /api/forms/validate/:form_type
///
/// Always 200: the outcome itself says whether the data is valid.
pub async fn validate_form(
    Path(form_type): Path<String>,
    Json(data): Json<FieldValues>,
) -> Json<ValidationOutcome> {
    Json(forms::validate(&form_type, &data))
}

/// GET /api/forms/history
pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<Vec<FormData>> {
    Json(state.store.form_history(query.form_type.as_deref()).await)
}

/// POST /api/forms/history
///
/// Records a raw submission without validation; the form type must exist.
pub async fn record_form(
    State(state): State<AppState>,
    Json(request): Json<RecordRequest>,
) -> ApiResult<(StatusCode, Json<FormData>)> {
    let schema = require_schema(&request.form_type)?;
    let record = record_submission(&state, schema.form_type.as_str(), request.data).await;

    info!(record_id = %record.id, form_type = %record.form_type, "Form submission recorded");

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/forms/history/:id/report
pub async fn record_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FormReport>> {
    let record = find_record(&state, id).await?;
    Ok(Json(forms::report(&record.form_type, &record)?))
}

/// POST /api/forms/compare
pub async fn compare_records(
    State(state): State<AppState>,
    Json(request): Json<CompareRequest>,
) -> ApiResult<Json<FormComparison>> {
    let old = find_record(&state, request.id1).await?;
    let new = find_record(&state, request.id2).await?;

    Ok(Json(forms::compare(&request.form_type, &old, &new)?))
}

/// Build form engine routes
pub fn form_routes() -> Router<AppState> {
    Router::new()
        .route("/api/forms/schemas", get(list_schemas))
        .route("/api/forms/schemas/:form_type", get(get_schema))
        .route("/api/forms/validate/:form_type", post(validate_form))
        .route("/api/forms/history", get(list_history).post(record_form))
        .route("/api/forms/history/:id/report", get(record_report))
        .route("/api/forms/compare", post(compare_records))
}
