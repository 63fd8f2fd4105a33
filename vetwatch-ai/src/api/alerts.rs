//! Alert endpoints

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;
use vetwatch_common::events::VetEvent;

use crate::alerts::Alert;
use crate::store::AlertFilter;
use crate::{ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct AlertListResponse {
    pub alerts: Vec<Alert>,
    /// Unread alerts overall, regardless of the filter
    pub unread_count: usize,
}

/// GET /api/alerts?search=&severity=&status=read|unread
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(filter): Query<AlertFilter>,
) -> Json<AlertListResponse> {
    let alerts = state.store.alerts(&filter).await;
    let unread_count = state.store.unread_alert_count().await;
    Json(AlertListResponse { alerts, unread_count })
}

/// POST /api/alerts/:id/read
pub async fn mark_alert_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Alert>> {
    let alert = state.store.mark_alert_read(id).await?;

    state.event_bus.emit_lossy(VetEvent::AlertRead {
        alert_id: alert.id,
        timestamp: Utc::now(),
    });

    Ok(Json(alert))
}

/// Build alert routes
pub fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/api/alerts", get(list_alerts))
        .route("/api/alerts/:id/read", post(mark_alert_read))
}
