//! Notification read endpoints. Every route is scoped to the caller;
//! there is no way to read another user's notifications.

use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::auth::Actor;
use crate::models::Notification;
use crate::notify;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let conn = state.open_db()?;
    Ok(Json(notify::list_for(&conn, &actor.id)?))
}

pub async fn unread_count(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, ApiError> {
    let conn = state.open_db()?;
    let count = notify::unread_count(&conn, &actor.id)?;
    Ok(Json(json!({ "unread": count })))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let conn = state.open_db()?;
    // ownership check: the notification must belong to the caller
    let owned = notify::list_for(&conn, &actor.id)?.iter().any(|n| n.id == id);
    if !owned {
        return Err(crate::lifecycle::LifecycleError::NotFound {
            entity: "notification",
            id: id.to_string(),
        }
        .into());
    }
    notify::mark_read(&conn, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, ApiError> {
    let conn = state.open_db()?;
    let changed = notify::mark_all_read(&conn, &actor.id)?;
    Ok(Json(json!({ "marked": changed })))
}
