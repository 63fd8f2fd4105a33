//! vetwatch-ai library interface
//!
//! Form engine, vision adapter, alert rule and in-memory store, exposed over
//! an axum router. The binary in `main.rs` only wires configuration and
//! starts the server.

pub mod alerts;
pub mod api;
pub mod config;
pub mod error;
pub mod forms;
pub mod store;
pub mod types;
pub mod vision;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use vetwatch_common::events::EventBus;

use crate::store::{AppStore, StoreSnapshot};
use crate::vision::AnalysisService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<AppStore>,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    pub analysis: AnalysisService,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(snapshot: StoreSnapshot, event_bus: EventBus, analysis: AnalysisService) -> Self {
        Self {
            store: Arc::new(AppStore::new(snapshot)),
            event_bus,
            analysis,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Remember a failure for the health endpoint
    pub async fn record_error(&self, message: impl Into<String>) {
        *self.last_error.write().await = Some(message.into());
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::form_routes())
        .merge(api::analysis_routes())
        .merge(api::alert_routes())
        .merge(api::user_routes())
        .merge(api::message_routes())
        .merge(api::training_routes())
        .merge(api::health_routes())
        .route("/events", get(api::event_stream))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
