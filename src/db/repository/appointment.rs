use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::AppointmentStatus;
use crate::models::{Appointment, Consultation, PrescribedMedicine, Vitals};

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, patient_id, full_name, contact_number, appointment_date,
         purpose, status, reschedule_reason, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            appt.id.to_string(),
            appt.patient_id.to_string(),
            appt.full_name,
            appt.contact_number,
            appt.appointment_date.format(DATETIME_FMT).to_string(),
            appt.purpose,
            appt.status.as_str(),
            appt.reschedule_reason,
            appt.created_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_appointment(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;
    let mut rows = stmt.query_map(params![id.to_string()], appointment_row_from_rusqlite)?;

    match rows.next() {
        Some(row) => Ok(Some(appointment_from_row(row?)?)),
        None => Ok(None),
    }
}

pub fn list_appointments(conn: &Connection) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY appointment_date"))?;
    let rows = stmt.query_map([], appointment_row_from_rusqlite)?;

    let mut appts = Vec::new();
    for row in rows {
        appts.push(appointment_from_row(row?)?);
    }
    Ok(appts)
}

pub fn list_appointments_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS} WHERE patient_id = ?1 ORDER BY appointment_date"
    ))?;
    let rows = stmt.query_map(params![patient_id.to_string()], appointment_row_from_rusqlite)?;

    let mut appts = Vec::new();
    for row in rows {
        appts.push(appointment_from_row(row?)?);
    }
    Ok(appts)
}

/// Compare-and-set: pending → approved. Returns the number of rows changed
/// (0 means the appointment was missing or not pending).
pub fn approve_if_pending(conn: &Connection, id: &Uuid) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET status = 'approved' WHERE id = ?1 AND status = 'pending'",
        params![id.to_string()],
    )?;
    Ok(changed)
}

/// Compare-and-set reschedule: date and purpose mutate together, only while
/// the appointment is still pending or approved.
pub fn reschedule_if_active(
    conn: &Connection,
    id: &Uuid,
    new_date: &NaiveDateTime,
    new_purpose: &str,
    reason: Option<&str>,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments
         SET appointment_date = ?2, purpose = ?3, reschedule_reason = ?4
         WHERE id = ?1 AND status IN ('pending', 'approved')",
        params![
            id.to_string(),
            new_date.format(DATETIME_FMT).to_string(),
            new_purpose,
            reason,
        ],
    )?;
    Ok(changed)
}

/// Compare-and-set: approved → completed, storing the clinical fields.
pub fn complete_if_approved(
    conn: &Connection,
    id: &Uuid,
    consultation: &Consultation,
) -> Result<usize, DatabaseError> {
    let vitals = serde_json::to_string(&consultation.vitals)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
    let medicines = serde_json::to_string(&consultation.medicines_prescribed)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;

    let changed = conn.execute(
        "UPDATE appointments
         SET status = 'completed', diagnosis = ?2, management = ?3, vitals = ?4,
             medicines_prescribed = ?5, consultation_completed_at = ?6
         WHERE id = ?1 AND status = 'approved'",
        params![
            id.to_string(),
            consultation.diagnosis,
            consultation.management,
            vitals,
            medicines,
            consultation.completed_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(changed)
}

/// Hard removal. Returns the number of rows deleted.
pub fn delete_appointment(conn: &Connection, id: &Uuid) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM appointments WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(deleted)
}

const SELECT_COLUMNS: &str = "SELECT id, patient_id, full_name, contact_number, appointment_date,
     purpose, status, reschedule_reason, diagnosis, management, vitals, medicines_prescribed,
     consultation_completed_at, created_at FROM appointments";

// Internal row type for Appointment mapping
struct AppointmentRow {
    id: String,
    patient_id: String,
    full_name: String,
    contact_number: String,
    appointment_date: String,
    purpose: String,
    status: String,
    reschedule_reason: Option<String>,
    diagnosis: Option<String>,
    management: Option<String>,
    vitals: Option<String>,
    medicines_prescribed: Option<String>,
    consultation_completed_at: Option<String>,
    created_at: String,
}

fn appointment_row_from_rusqlite(
    row: &rusqlite::Row<'_>,
) -> Result<AppointmentRow, rusqlite::Error> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        full_name: row.get(2)?,
        contact_number: row.get(3)?,
        appointment_date: row.get(4)?,
        purpose: row.get(5)?,
        status: row.get(6)?,
        reschedule_reason: row.get(7)?,
        diagnosis: row.get(8)?,
        management: row.get(9)?,
        vitals: row.get(10)?,
        medicines_prescribed: row.get(11)?,
        consultation_completed_at: row.get(12)?,
        created_at: row.get(13)?,
    })
}

fn appointment_from_row(row: AppointmentRow) -> Result<Appointment, DatabaseError> {
    let consultation = match (row.diagnosis, row.consultation_completed_at) {
        (Some(diagnosis), Some(completed_at)) => {
            let vitals: Vitals = row
                .vitals
                .as_deref()
                .and_then(|v| serde_json::from_str(v).ok())
                .unwrap_or_default();
            let medicines: Vec<PrescribedMedicine> = row
                .medicines_prescribed
                .as_deref()
                .and_then(|m| serde_json::from_str(m).ok())
                .unwrap_or_default();
            Some(Consultation {
                diagnosis,
                management: row.management.unwrap_or_default(),
                vitals,
                medicines_prescribed: medicines,
                completed_at: parse_datetime(&completed_at)?,
            })
        }
        _ => None,
    };

    Ok(Appointment {
        id: parse_uuid(&row.id)?,
        patient_id: parse_uuid(&row.patient_id)?,
        full_name: row.full_name,
        contact_number: row.contact_number,
        appointment_date: parse_datetime(&row.appointment_date)?,
        purpose: row.purpose,
        status: AppointmentStatus::from_str(&row.status)?,
        reschedule_reason: row.reschedule_reason,
        consultation,
        created_at: parse_datetime(&row.created_at)?,
    })
}

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

pub(crate) fn parse_datetime(s: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(s, DATETIME_FMT)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}
