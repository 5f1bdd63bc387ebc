use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{EmergencyContact, PatientProfile};

use super::appointment::{parse_datetime, parse_uuid};

const DATE_FMT: &str = "%Y-%m-%d";

pub fn insert_patient(conn: &Connection, patient: &PatientProfile) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, first_name, last_name, birthday, home_address, sex,
         civil_status, contact_number, blood_type, emergency_contact_name,
         emergency_contact_phone, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            patient.id.to_string(),
            patient.first_name,
            patient.last_name,
            patient.birthday.map(|d| d.format(DATE_FMT).to_string()),
            patient.home_address,
            patient.sex,
            patient.civil_status,
            patient.contact_number,
            patient.blood_type,
            patient.emergency_contact.as_ref().map(|ec| ec.name.clone()),
            patient.emergency_contact.as_ref().map(|ec| ec.phone.clone()),
            patient.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<PatientProfile>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;
    let mut rows = stmt.query_map(params![id.to_string()], patient_row)?;

    match rows.next() {
        Some(row) => Ok(Some(patient_from_row(row?)?)),
        None => Ok(None),
    }
}

pub fn list_patients(conn: &Connection) -> Result<Vec<PatientProfile>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY last_name, first_name"))?;
    let rows = stmt.query_map([], patient_row)?;

    let mut patients = Vec::new();
    for row in rows {
        patients.push(patient_from_row(row?)?);
    }
    Ok(patients)
}

/// Full-row profile update (identity fields and demographics alike).
pub fn update_patient(conn: &Connection, patient: &PatientProfile) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE patients SET first_name = ?2, last_name = ?3, birthday = ?4, home_address = ?5,
         sex = ?6, civil_status = ?7, contact_number = ?8, blood_type = ?9,
         emergency_contact_name = ?10, emergency_contact_phone = ?11
         WHERE id = ?1",
        params![
            patient.id.to_string(),
            patient.first_name,
            patient.last_name,
            patient.birthday.map(|d| d.format(DATE_FMT).to_string()),
            patient.home_address,
            patient.sex,
            patient.civil_status,
            patient.contact_number,
            patient.blood_type,
            patient.emergency_contact.as_ref().map(|ec| ec.name.clone()),
            patient.emergency_contact.as_ref().map(|ec| ec.phone.clone()),
        ],
    )?;
    Ok(changed)
}

const SELECT_COLUMNS: &str = "SELECT id, first_name, last_name, birthday, home_address, sex,
     civil_status, contact_number, blood_type, emergency_contact_name, emergency_contact_phone,
     created_at FROM patients";

struct PatientRow {
    id: String,
    first_name: String,
    last_name: String,
    birthday: Option<String>,
    home_address: Option<String>,
    sex: Option<String>,
    civil_status: Option<String>,
    contact_number: Option<String>,
    blood_type: Option<String>,
    emergency_contact_name: Option<String>,
    emergency_contact_phone: Option<String>,
    created_at: String,
}

fn patient_row(row: &rusqlite::Row<'_>) -> Result<PatientRow, rusqlite::Error> {
    Ok(PatientRow {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        birthday: row.get(3)?,
        home_address: row.get(4)?,
        sex: row.get(5)?,
        civil_status: row.get(6)?,
        contact_number: row.get(7)?,
        blood_type: row.get(8)?,
        emergency_contact_name: row.get(9)?,
        emergency_contact_phone: row.get(10)?,
        created_at: row.get(11)?,
    })
}

fn patient_from_row(row: PatientRow) -> Result<PatientProfile, DatabaseError> {
    let birthday = match row.birthday {
        Some(s) => Some(
            NaiveDate::parse_from_str(&s, DATE_FMT)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        ),
        None => None,
    };
    let emergency_contact = match (row.emergency_contact_name, row.emergency_contact_phone) {
        (Some(name), Some(phone)) => Some(EmergencyContact { name, phone }),
        _ => None,
    };
    Ok(PatientProfile {
        id: parse_uuid(&row.id)?,
        first_name: row.first_name,
        last_name: row.last_name,
        birthday,
        home_address: row.home_address,
        sex: row.sex,
        civil_status: row.civil_status,
        contact_number: row.contact_number,
        blood_type: row.blood_type,
        emergency_contact,
        created_at: parse_datetime(&row.created_at)?,
    })
}
