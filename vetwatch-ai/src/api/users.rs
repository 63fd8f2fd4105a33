//! User directory endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tracing::info;
use vetwatch_common::events::VetEvent;

use super::forms::{record_submission, require_valid};
use crate::forms::{FieldValues, FormType};
use crate::store::models::{NewUser, User};
use crate::store::UserFilter;
use crate::{ApiError, ApiResult, AppState};

/// GET /api/users?search=&role=
pub async fn list_users(
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
) -> Json<Vec<User>> {
    Json(state.store.search_users(&filter).await)
}

/// POST /api/users
///
/// Body uses the userManagement form fields (`name`, `phone`, `email`,
/// `cargo`) plus an optional `role`.
///
/// **Errors:**
/// - 400 Bad Request: validation failed (all errors listed)
/// - 409 Conflict: email already registered
pub async fn register_user(
    State(state): State<AppState>,
    Json(data): Json<FieldValues>,
) -> ApiResult<(StatusCode, Json<User>)> {
    require_valid(FormType::UserManagement, &data)?;

    let new: NewUser = serde_json::from_value(Value::Object(data.clone()))
        .map_err(|e| ApiError::BadRequest(format!("Invalid user payload: {}", e)))?;

    let user = state.store.add_user(User::register(new)).await?;
    record_submission(&state, FormType::UserManagement.as_str(), data).await;

    info!(user_id = %user.id, role = %user.role, "User registered");

    state.event_bus.emit_lossy(VetEvent::UserRegistered {
        user_id: user.id,
        name: user.name.clone(),
        timestamp: user.created_at,
    });

    Ok((StatusCode::CREATED, Json(user)))
}

/// Build user routes
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/api/users", get(list_users).post(register_user))
}
