use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::AppointmentStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub full_name: String,
    pub contact_number: String,
    pub appointment_date: NaiveDateTime,
    pub purpose: String,
    pub status: AppointmentStatus,
    pub reschedule_reason: Option<String>,
    pub consultation: Option<Consultation>,
    pub created_at: NaiveDateTime,
}

/// Clinical encounter record attached to an appointment once the
/// consultation is completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultation {
    pub diagnosis: String,
    pub management: String,
    pub vitals: Vitals,
    pub medicines_prescribed: Vec<PrescribedMedicine>,
    pub completed_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vitals {
    pub blood_pressure: Option<String>,
    pub temperature: Option<String>,
    pub pulse_rate: Option<String>,
    pub respiratory_rate: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescribedMedicine {
    pub medicine_id: Uuid,
    pub name: String,
    pub quantity: i64,
}
