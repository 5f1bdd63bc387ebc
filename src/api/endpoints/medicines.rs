//! Medicine inventory endpoints.

use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::auth::Actor;
use crate::db::repository;
use crate::lifecycle::{self, LifecycleError};
use crate::models::Medicine;
use crate::roles::Capability;
use crate::state::AppState;

/// Anyone who can dispense can see the shelf.
pub async fn list(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<Medicine>>, ApiError> {
    if !actor.role.allows(Capability::DispenseMedicine) {
        return Err(LifecycleError::Forbidden.into());
    }
    let conn = state.open_db()?;
    Ok(Json(repository::list_medicines(&conn)?))
}

#[derive(Deserialize)]
pub struct CreateMedicineRequest {
    pub name: String,
    pub quantity_in_stock: i64,
    pub unit: String,
    pub expiry_date: Option<NaiveDate>,
}

pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateMedicineRequest>,
) -> Result<(StatusCode, Json<Medicine>), ApiError> {
    if !actor.role.allows(Capability::ManageInventory) {
        return Err(LifecycleError::Forbidden.into());
    }
    if req.name.trim().is_empty() {
        return Err(LifecycleError::Validation("name must not be empty".into()).into());
    }
    if req.quantity_in_stock < 0 {
        return Err(LifecycleError::Validation("stock must not be negative".into()).into());
    }

    let medicine = Medicine {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        quantity_in_stock: req.quantity_in_stock,
        unit: req.unit,
        expiry_date: req.expiry_date,
        created_at: chrono::Local::now().naive_local(),
    };
    let conn = state.open_db()?;
    repository::insert_medicine(&conn, &medicine)?;
    Ok((StatusCode::CREATED, Json(medicine)))
}

#[derive(Deserialize)]
pub struct QuantityRequest {
    pub quantity: i64,
}

pub async fn restock(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<QuantityRequest>,
) -> Result<Json<Medicine>, ApiError> {
    if !actor.role.allows(Capability::ManageInventory) {
        return Err(LifecycleError::Forbidden.into());
    }
    if req.quantity <= 0 {
        return Err(LifecycleError::Validation("restock quantity must be positive".into()).into());
    }

    let conn = state.open_db()?;
    if repository::restock(&conn, &id, req.quantity)? == 0 {
        return Err(LifecycleError::NotFound {
            entity: "medicine",
            id: id.to_string(),
        }
        .into());
    }
    let medicine = repository::get_medicine(&conn, &id)?.ok_or(LifecycleError::NotFound {
        entity: "medicine",
        id: id.to_string(),
    })?;
    Ok(Json(medicine))
}

pub async fn dispense(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<QuantityRequest>,
) -> Result<Json<Medicine>, ApiError> {
    let conn = state.open_db()?;
    lifecycle::dispense(&conn, &state.events, &actor, &id, req.quantity)?;
    let medicine = repository::get_medicine(&conn, &id)?.ok_or(LifecycleError::NotFound {
        entity: "medicine",
        id: id.to_string(),
    })?;
    Ok(Json(medicine))
}
