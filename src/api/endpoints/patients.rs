//! Patient directory endpoints. Patients manage their own profile;
//! staff and admins manage everyone's.

use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::auth::Actor;
use crate::db::repository;
use crate::lifecycle::LifecycleError;
use crate::models::{EmergencyContact, PatientProfile};
use crate::roles::Capability;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<PatientProfile>>, ApiError> {
    if !actor.role.allows(Capability::ManagePatients) {
        return Err(LifecycleError::Forbidden.into());
    }
    let conn = state.open_db()?;
    Ok(Json(repository::list_patients(&conn)?))
}

pub async fn detail(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<PatientProfile>, ApiError> {
    if actor.id != id && !actor.role.allows(Capability::ManagePatients) {
        return Err(LifecycleError::Forbidden.into());
    }
    let conn = state.open_db()?;
    let patient = repository::get_patient(&conn, &id)?.ok_or(LifecycleError::NotFound {
        entity: "patient",
        id: id.to_string(),
    })?;
    Ok(Json(patient))
}

#[derive(Deserialize)]
pub struct ProfileRequest {
    pub first_name: String,
    pub last_name: String,
    pub birthday: Option<NaiveDate>,
    pub home_address: Option<String>,
    pub sex: Option<String>,
    pub civil_status: Option<String>,
    pub contact_number: Option<String>,
    pub blood_type: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
}

/// Create the caller's profile (or, for staff, any patient's). The
/// profile id is the user id, so a patient can have at most one.
pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<ProfileRequest>,
) -> Result<(StatusCode, Json<PatientProfile>), ApiError> {
    create_with_id(state, actor.clone(), actor.id, req).await
}

pub async fn create_for(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<ProfileRequest>,
) -> Result<(StatusCode, Json<PatientProfile>), ApiError> {
    if !actor.role.allows(Capability::ManagePatients) {
        return Err(LifecycleError::Forbidden.into());
    }
    create_with_id(state, actor, id, req).await
}

async fn create_with_id(
    state: AppState,
    _actor: Actor,
    id: Uuid,
    req: ProfileRequest,
) -> Result<(StatusCode, Json<PatientProfile>), ApiError> {
    if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
        return Err(LifecycleError::Validation("first and last name are required".into()).into());
    }

    let patient = PatientProfile {
        id,
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        birthday: req.birthday,
        home_address: req.home_address,
        sex: req.sex,
        civil_status: req.civil_status,
        contact_number: req.contact_number,
        blood_type: req.blood_type,
        emergency_contact: req.emergency_contact,
        created_at: chrono::Local::now().naive_local(),
    };
    let conn = state.open_db()?;
    repository::insert_patient(&conn, &patient)?;
    Ok((StatusCode::CREATED, Json(patient)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<PatientProfile>, ApiError> {
    if actor.id != id && !actor.role.allows(Capability::ManagePatients) {
        return Err(LifecycleError::Forbidden.into());
    }
    if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
        return Err(LifecycleError::Validation("first and last name are required".into()).into());
    }

    let conn = state.open_db()?;
    let existing = repository::get_patient(&conn, &id)?.ok_or(LifecycleError::NotFound {
        entity: "patient",
        id: id.to_string(),
    })?;

    let patient = PatientProfile {
        id,
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        birthday: req.birthday,
        home_address: req.home_address,
        sex: req.sex,
        civil_status: req.civil_status,
        contact_number: req.contact_number,
        blood_type: req.blood_type,
        emergency_contact: req.emergency_contact,
        created_at: existing.created_at,
    };
    repository::update_patient(&conn, &patient)?;
    Ok(Json(patient))
}
