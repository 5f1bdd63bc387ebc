//! Appointment lifecycle endpoints.

use std::str::FromStr;

use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::auth::Actor;
use crate::lifecycle::{self, ConsultationInput, LifecycleError};
use crate::models::enums::{AppointmentStatus, Role};
use crate::models::{Appointment, AppointmentFilter};
use crate::query;
use crate::roles::Capability;
use crate::state::AppState;

pub(crate) fn parse_datetime(s: &str) -> Result<NaiveDateTime, ApiError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M"))
        .map_err(|_| ApiError::BadRequest(format!("invalid datetime: {s}")))
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("invalid date: {s}")))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub name: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub purpose: Option<String>,
    pub status: Option<String>,
}

/// Staff and admins see every appointment; patients see only their own.
pub async fn list(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    axum::extract::Query(q): axum::extract::Query<ListQuery>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    let filter = AppointmentFilter {
        name: q.name,
        date_from: q.date_from.as_deref().map(parse_date).transpose()?,
        date_to: q.date_to.as_deref().map(parse_date).transpose()?,
        purpose: q.purpose,
        status: q
            .status
            .as_deref()
            .map(|s| {
                AppointmentStatus::from_str(s)
                    .map_err(|_| ApiError::BadRequest(format!("invalid status: {s}")))
            })
            .transpose()?,
    };

    let conn = state.open_db()?;
    let appointments = if actor.role.allows(Capability::ViewAllAppointments) {
        crate::db::repository::list_appointments(&conn)?
    } else {
        crate::db::repository::list_appointments_by_patient(&conn, &actor.id)?
    };
    Ok(Json(query::filter_appointments(&appointments, &filter)))
}

pub async fn detail(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, ApiError> {
    let conn = state.open_db()?;
    let appointment = crate::db::repository::get_appointment(&conn, &id)?.ok_or(
        LifecycleError::NotFound {
            entity: "appointment",
            id: id.to_string(),
        },
    )?;
    if actor.role == Role::Patient && appointment.patient_id != actor.id {
        return Err(LifecycleError::Forbidden.into());
    }
    Ok(Json(appointment))
}

#[derive(Deserialize)]
pub struct BookRequest {
    /// Defaults to the calling patient; staff set it for walk-ins.
    pub patient_id: Option<Uuid>,
    pub appointment_date: String,
    pub purpose: String,
}

pub async fn book(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<BookRequest>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let date = parse_datetime(&req.appointment_date)?;
    let patient_id = req.patient_id.unwrap_or(actor.id);

    let conn = state.open_db()?;
    let appointment = lifecycle::book(
        &conn,
        &state.events,
        &actor,
        patient_id,
        date,
        &req.purpose,
    )?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn approve(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, ApiError> {
    let conn = state.open_db()?;
    let appointment = lifecycle::approve(&conn, &state.events, &actor, &id)?;
    Ok(Json(appointment))
}

#[derive(Deserialize)]
pub struct RescheduleRequest {
    pub new_date: String,
    pub new_purpose: String,
    pub reason: Option<String>,
}

pub async fn reschedule(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<RescheduleRequest>,
) -> Result<Json<Appointment>, ApiError> {
    let date = parse_datetime(&req.new_date)?;
    let conn = state.open_db()?;
    let appointment = lifecycle::reschedule(
        &conn,
        &state.events,
        &actor,
        &id,
        date,
        &req.new_purpose,
        req.reason.as_deref(),
    )?;
    Ok(Json(appointment))
}

pub async fn complete(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<ConsultationInput>,
) -> Result<Json<Appointment>, ApiError> {
    let conn = state.open_db()?;
    let appointment = lifecycle::complete_consultation(&conn, &state.events, &actor, &id, &input)?;
    Ok(Json(appointment))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let conn = state.open_db()?;
    lifecycle::delete(&conn, &state.events, &actor, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
