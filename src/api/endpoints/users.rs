//! Session and role administration. Identity lives in an external
//! system; these endpoints only bind tokens to actors and move roles.

use std::str::FromStr;

use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::activity;
use crate::api::error::ApiError;
use crate::auth::Actor;
use crate::lifecycle::LifecycleError;
use crate::models::enums::{EntityType, LogAction, Role};
use crate::roles::Capability;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct IssueSessionRequest {
    /// Omit to mint a fresh user id.
    pub user_id: Option<Uuid>,
    pub name: String,
    pub role: String,
}

/// Issue a bearer token for a user (admin only). The token is returned
/// once and stored only as a hash.
pub async fn issue_session(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<IssueSessionRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if !actor.role.allows(Capability::UpdateUserRole) {
        return Err(LifecycleError::Forbidden.into());
    }
    let role = Role::from_str(&req.role)
        .map_err(|_| ApiError::BadRequest(format!("invalid role: {}", req.role)))?;
    if req.name.trim().is_empty() {
        return Err(LifecycleError::Validation("name must not be empty".into()).into());
    }

    let user_id = req.user_id.unwrap_or_else(Uuid::new_v4);
    let token = {
        let mut sessions = state.sessions.write().map_err(|_| {
            ApiError::Lifecycle(LifecycleError::Validation("session store unavailable".into()))
        })?;
        sessions.issue(Actor {
            id: user_id,
            name: req.name.trim().to_string(),
            role,
        })
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "user_id": user_id,
            "role": role.as_str(),
            "token": token,
        })),
    ))
}

#[derive(Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

/// Change a user's role on all their live sessions (admin only).
pub async fn update_role(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<Value>, ApiError> {
    if !actor.role.allows(Capability::UpdateUserRole) {
        return Err(LifecycleError::Forbidden.into());
    }
    let role = Role::from_str(&req.role)
        .map_err(|_| ApiError::BadRequest(format!("invalid role: {}", req.role)))?;

    let previous = {
        let mut sessions = state.sessions.write().map_err(|_| {
            ApiError::Lifecycle(LifecycleError::Validation("session store unavailable".into()))
        })?;
        sessions.update_role(&id, role)
    };
    let previous = previous.ok_or(LifecycleError::NotFound {
        entity: "user",
        id: id.to_string(),
    })?;

    let conn = state.open_db()?;
    activity::record(
        &conn,
        &state.events,
        actor.id,
        LogAction::UpdateUserRole,
        EntityType::User,
        id,
        json!({
            "previous_role": previous.as_str(),
            "new_role": role.as_str(),
            "admin_name": actor.name,
        }),
    );

    Ok(Json(json!({
        "user_id": id,
        "previous_role": previous.as_str(),
        "role": role.as_str(),
    })))
}
