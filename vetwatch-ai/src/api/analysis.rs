//! Media analysis endpoints
//!
//! Uploads arrive as base64 JSON. A finished analysis is stored, announced
//! over SSE, and run through the alert rule.

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use vetwatch_common::events::VetEvent;

use crate::alerts::{build_alert, Alert};
use crate::vision::{AnalysisResult, MediaFile};
use crate::{ApiError, ApiResult, AppState};

/// Upload size limit for analysis requests (base64 inflates by a third)
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSource {
    #[default]
    Upload,
    Camera,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    pub file_name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Base64 payload, optionally as a full `data:` URL
    pub data: String,
    #[serde(default)]
    pub source: CaptureSource,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub result: AnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,
}

/// Split an optional `data:<mime>;base64,` prefix off the payload
fn split_data_url(data: &str) -> (Option<String>, &str) {
    if let Some(rest) = data.strip_prefix("data:") {
        if let Some((header, payload)) = rest.split_once(',') {
            let mime = header
                .strip_suffix(";base64")
                .unwrap_or(header)
                .trim();
            let mime = (!mime.is_empty()).then(|| mime.to_string());
            return (mime, payload);
        }
    }
    (None, data)
}

fn decode_upload(request: AnalysisRequest) -> ApiResult<MediaFile> {
    let (url_mime, payload) = split_data_url(request.data.trim());
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| ApiError::BadRequest(format!("Invalid base64 payload: {}", e)))?;

    if bytes.is_empty() {
        return Err(ApiError::BadRequest("Empty file".to_string()));
    }

    Ok(MediaFile::new(request.file_name, request.mime_type.or(url_mime), bytes))
}

/// POST /api/analysis
///
/// **Request:** `{"file_name": "...", "mime_type": "image/jpeg", "data": "<base64>", "source": "upload|camera"}`
///
/// **Errors:**
/// - 400 Bad Request: payload is not base64
/// - 415 Unsupported Media Type: neither image nor video
/// - 503 Service Unavailable: no vision API key configured
/// - 502 Bad Gateway: vision API unreachable or returned an error
pub async fn analyze_media(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> ApiResult<(StatusCode, Json<AnalysisResponse>)> {
    let source = request.source;
    let file = decode_upload(request)?;

    let outcome = match source {
        CaptureSource::Upload => state.analysis.analyze(&file).await,
        CaptureSource::Camera => state.analysis.analyze_camera_capture(&file).await,
    };

    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            warn!(file_name = %file.name, error = %e, "Analysis failed");
            state.record_error(format!("Analysis of {} failed: {}", file.name, e)).await;
            return Err(e.into());
        }
    };

    let result = state.store.add_analysis_result(result).await;

    state.event_bus.emit_lossy(VetEvent::AnalysisCompleted {
        analysis_id: result.id,
        file_name: result.file_name.clone(),
        symptom_count: result.symptoms.len(),
        alert_generated: result.alert_generated,
        timestamp: result.timestamp,
    });

    let users = state.store.users().await;
    let alert = match build_alert(&result, &users) {
        Some(alert) => {
            let alert = state.store.add_alert(alert).await;
            info!(alert_id = %alert.id, severity = %alert.severity, "Alert created");
            state.event_bus.emit_lossy(VetEvent::AlertCreated {
                alert_id: alert.id,
                severity: alert.severity.to_string(),
                title: alert.title.clone(),
                recipients: alert.sent_to_users.len(),
                timestamp: alert.timestamp,
            });
            Some(alert)
        }
        None => None,
    };

    Ok((StatusCode::CREATED, Json(AnalysisResponse { result, alert })))
}

/// GET /api/analysis
pub async fn list_analyses(State(state): State<AppState>) -> Json<Vec<AnalysisResult>> {
    Json(state.store.analysis_results().await)
}

/// Build analysis routes
pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/api/analysis", get(list_analyses).post(analyze_media))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_data_url() {
        let (mime, payload) = split_data_url("data:image/png;base64,AAAA");
        assert_eq!(mime.as_deref(), Some("image/png"));
        assert_eq!(payload, "AAAA");

        let (mime, payload) = split_data_url("AAAA");
        assert!(mime.is_none());
        assert_eq!(payload, "AAAA");
    }

    #[test]
    fn test_decode_upload_prefers_declared_mime() {
        let request = AnalysisRequest {
            file_name: "a.jpg".into(),
            mime_type: Some("image/jpeg".into()),
            data: "data:image/png;base64,YWJj".into(),
            source: CaptureSource::Upload,
        };
        let file = decode_upload(request).unwrap();
        assert_eq!(file.mime_type.as_deref(), Some("image/jpeg"));
        assert_eq!(file.bytes, b"abc");
    }

    #[test]
    fn test_decode_upload_rejects_garbage() {
        let request = AnalysisRequest {
            file_name: "a.jpg".into(),
            mime_type: None,
            data: "%%%".into(),
            source: CaptureSource::Upload,
        };
        assert!(matches!(decode_upload(request), Err(ApiError::BadRequest(_))));
    }
}
