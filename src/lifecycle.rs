//! Appointment lifecycle: pending → approved → completed.
//!
//! Every transition is a compare-and-set UPDATE keyed on the current
//! status, so two actors racing on the same appointment cannot both
//! win. Side effects (notifications, activity log, live events) run
//! only after the state change committed, and never fail the caller.

use chrono::NaiveDateTime;
use rusqlite::Connection;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::activity;
use crate::auth::Actor;
use crate::db::{repository, DatabaseError};
use crate::events::{LiveEvent, LiveEvents};
use crate::models::enums::{AppointmentStatus, EntityType, LogAction, NotificationTag, Role};
use crate::models::{Appointment, Consultation, PrescribedMedicine, Vitals};
use crate::notify;
use crate::roles::Capability;

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("cannot {action} an appointment in status '{from}'")]
    InvalidTransition {
        from: AppointmentStatus,
        action: &'static str,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("insufficient stock for {medicine}: requested {requested}, available {available}")]
    InsufficientStock {
        medicine: String,
        requested: i64,
        available: i64,
    },

    #[error("patient profile incomplete: missing {missing:?}")]
    ProfileIncomplete { missing: Vec<&'static str> },

    #[error("{0}")]
    Validation(String),

    #[error("not allowed for this role")]
    Forbidden,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Clinical outcome submitted when a consultation finishes.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsultationInput {
    pub diagnosis: String,
    pub management: String,
    #[serde(default)]
    pub vitals: Vitals,
    #[serde(default)]
    pub medicines: Vec<DispenseLine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DispenseLine {
    pub medicine_id: Uuid,
    pub quantity: i64,
}

fn require(actor: &Actor, capability: Capability) -> Result<(), LifecycleError> {
    if actor.role.allows(capability) {
        Ok(())
    } else {
        Err(LifecycleError::Forbidden)
    }
}

fn load_appointment(conn: &Connection, id: &Uuid) -> Result<Appointment, LifecycleError> {
    repository::get_appointment(conn, id)?.ok_or_else(|| LifecycleError::NotFound {
        entity: "appointment",
        id: id.to_string(),
    })
}

/// A CAS returned zero rows: report NotFound for a missing row,
/// otherwise the status the stale writer lost to.
fn cas_failure(
    conn: &Connection,
    id: &Uuid,
    action: &'static str,
) -> Result<LifecycleError, LifecycleError> {
    let current = load_appointment(conn, id)?;
    Ok(LifecycleError::InvalidTransition {
        from: current.status,
        action,
    })
}

// ═══════════════════════════════════════════════════════════
// Booking
// ═══════════════════════════════════════════════════════════

/// Book a new appointment for `patient_id`. Patients may only book for
/// themselves, and only once their profile is complete; staff and
/// admins can book on a patient's behalf (walk-ins, phone calls).
pub fn book(
    conn: &Connection,
    events: &LiveEvents,
    actor: &Actor,
    patient_id: Uuid,
    appointment_date: NaiveDateTime,
    purpose: &str,
) -> Result<Appointment, LifecycleError> {
    require(actor, Capability::BookAppointment)?;
    if actor.role == Role::Patient && actor.id != patient_id {
        return Err(LifecycleError::Forbidden);
    }
    if purpose.trim().is_empty() {
        return Err(LifecycleError::Validation("purpose must not be empty".into()));
    }
    let now = chrono::Local::now().naive_local();
    if appointment_date <= now {
        return Err(LifecycleError::Validation(
            "appointment date must be in the future".into(),
        ));
    }

    let profile =
        repository::get_patient(conn, &patient_id)?.ok_or_else(|| LifecycleError::NotFound {
            entity: "patient",
            id: patient_id.to_string(),
        })?;
    let missing = profile.missing_fields();
    if !missing.is_empty() {
        return Err(LifecycleError::ProfileIncomplete { missing });
    }

    let appointment = Appointment {
        id: Uuid::new_v4(),
        patient_id,
        full_name: profile.display_name(),
        contact_number: profile.contact_number.clone().unwrap_or_default(),
        appointment_date,
        purpose: purpose.trim().to_string(),
        status: AppointmentStatus::Pending,
        reschedule_reason: None,
        consultation: None,
        created_at: now,
    };
    repository::insert_appointment(conn, &appointment)?;

    events.emit(LiveEvent::NewAppointment {
        appointment_id: appointment.id,
    });
    Ok(appointment)
}

// ═══════════════════════════════════════════════════════════
// Approval
// ═══════════════════════════════════════════════════════════

pub fn approve(
    conn: &Connection,
    events: &LiveEvents,
    actor: &Actor,
    id: &Uuid,
) -> Result<Appointment, LifecycleError> {
    require(actor, Capability::ApproveAppointment)?;

    if repository::approve_if_pending(conn, id)? == 0 {
        return Err(cas_failure(conn, id, "approve")?);
    }
    let appointment = load_appointment(conn, id)?;

    notify::dispatch(
        conn,
        events,
        appointment.patient_id,
        NotificationTag::Approved,
        format!(
            "Your appointment on {} has been approved.",
            appointment.appointment_date.format("%Y-%m-%d %H:%M")
        ),
    );
    activity::record(
        conn,
        events,
        actor.id,
        LogAction::ApproveAppointment,
        EntityType::Appointment,
        appointment.id,
        serde_json::json!({
            "patient_name": appointment.full_name,
            "staff_name": actor.name,
            "appointment_date": appointment.appointment_date
                .format("%Y-%m-%d %H:%M:%S").to_string(),
        }),
    );
    Ok(appointment)
}

// ═══════════════════════════════════════════════════════════
// Reschedule
// ═══════════════════════════════════════════════════════════

/// Move an appointment to a new slot. Date and purpose change together;
/// valid only while the appointment is pending or approved.
pub fn reschedule(
    conn: &Connection,
    events: &LiveEvents,
    actor: &Actor,
    id: &Uuid,
    new_date: NaiveDateTime,
    new_purpose: &str,
    reason: Option<&str>,
) -> Result<Appointment, LifecycleError> {
    require(actor, Capability::RescheduleAppointment)?;
    if new_purpose.trim().is_empty() {
        return Err(LifecycleError::Validation("purpose must not be empty".into()));
    }

    if repository::reschedule_if_active(conn, id, &new_date, new_purpose.trim(), reason)? == 0 {
        return Err(cas_failure(conn, id, "reschedule")?);
    }
    let appointment = load_appointment(conn, id)?;

    let mut message = format!(
        "Your appointment has been rescheduled to {}.",
        new_date.format("%Y-%m-%d %H:%M")
    );
    if let Some(reason) = reason {
        message.push_str(&format!(" Reason: {reason}"));
    }
    notify::dispatch(
        conn,
        events,
        appointment.patient_id,
        NotificationTag::Rescheduled,
        message,
    );
    activity::record(
        conn,
        events,
        actor.id,
        LogAction::RescheduleAppointment,
        EntityType::Appointment,
        appointment.id,
        serde_json::json!({
            "patient_name": appointment.full_name,
            "staff_name": actor.name,
            "new_date": new_date.format("%Y-%m-%d %H:%M:%S").to_string(),
            "reason": reason,
        }),
    );
    Ok(appointment)
}

// ═══════════════════════════════════════════════════════════
// Consultation completion
// ═══════════════════════════════════════════════════════════

/// Finish a consultation: record the clinical outcome and deduct every
/// prescribed medicine from stock, all inside one transaction. If any
/// line cannot be covered, the whole operation rolls back and the
/// appointment stays approved.
pub fn complete_consultation(
    conn: &Connection,
    events: &LiveEvents,
    actor: &Actor,
    id: &Uuid,
    input: &ConsultationInput,
) -> Result<Appointment, LifecycleError> {
    require(actor, Capability::CompleteConsultation)?;
    if input.diagnosis.trim().is_empty() {
        return Err(LifecycleError::Validation("diagnosis must not be empty".into()));
    }
    for line in &input.medicines {
        if line.quantity <= 0 {
            return Err(LifecycleError::Validation(
                "dispense quantity must be positive".into(),
            ));
        }
    }

    let tx = conn.unchecked_transaction().map_err(DatabaseError::from)?;

    let mut prescribed = Vec::with_capacity(input.medicines.len());
    for line in &input.medicines {
        let medicine = repository::get_medicine(&tx, &line.medicine_id)?.ok_or_else(|| {
            LifecycleError::NotFound {
                entity: "medicine",
                id: line.medicine_id.to_string(),
            }
        })?;
        if repository::deduct_stock(&tx, &line.medicine_id, line.quantity)? == 0 {
            // tx dropped here → rollback
            return Err(LifecycleError::InsufficientStock {
                medicine: medicine.name,
                requested: line.quantity,
                available: medicine.quantity_in_stock,
            });
        }
        prescribed.push(PrescribedMedicine {
            medicine_id: medicine.id,
            name: medicine.name,
            quantity: line.quantity,
        });
    }

    let consultation = Consultation {
        diagnosis: input.diagnosis.trim().to_string(),
        management: input.management.trim().to_string(),
        vitals: input.vitals.clone(),
        medicines_prescribed: prescribed,
        completed_at: chrono::Local::now().naive_local(),
    };
    if repository::complete_if_approved(&tx, id, &consultation)? == 0 {
        drop(tx);
        return Err(cas_failure(conn, id, "complete")?);
    }
    tx.commit().map_err(DatabaseError::from)?;

    let appointment = load_appointment(conn, id)?;
    notify::dispatch(
        conn,
        events,
        appointment.patient_id,
        NotificationTag::Completed,
        format!(
            "Your consultation on {} has been completed.",
            appointment.appointment_date.format("%Y-%m-%d %H:%M")
        ),
    );
    activity::record(
        conn,
        events,
        actor.id,
        LogAction::CompleteConsultation,
        EntityType::Appointment,
        appointment.id,
        serde_json::json!({
            "patient_name": appointment.full_name,
            "staff_name": actor.name,
            "diagnosis": consultation.diagnosis,
        }),
    );
    Ok(appointment)
}

// ═══════════════════════════════════════════════════════════
// Deletion
// ═══════════════════════════════════════════════════════════

/// Remove an appointment in any state. Patients may only delete their
/// own. Deletion is silent: the activity log records it, but no
/// notification goes out.
pub fn delete(
    conn: &Connection,
    events: &LiveEvents,
    actor: &Actor,
    id: &Uuid,
) -> Result<(), LifecycleError> {
    require(actor, Capability::DeleteAppointment)?;
    let appointment = load_appointment(conn, id)?;
    if actor.role == Role::Patient && appointment.patient_id != actor.id {
        return Err(LifecycleError::Forbidden);
    }

    repository::delete_appointment(conn, id)?;

    activity::record(
        conn,
        events,
        actor.id,
        LogAction::DeleteAppointment,
        EntityType::Appointment,
        appointment.id,
        serde_json::json!({
            "patient_name": appointment.full_name,
            "status": appointment.status.as_str(),
        }),
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// Walk-in dispense
// ═══════════════════════════════════════════════════════════

/// Dispense stock outside a consultation (walk-in requests). Same
/// decrement-if-sufficient guard as prescriptions.
pub fn dispense(
    conn: &Connection,
    events: &LiveEvents,
    actor: &Actor,
    medicine_id: &Uuid,
    quantity: i64,
) -> Result<(), LifecycleError> {
    require(actor, Capability::DispenseMedicine)?;
    if quantity <= 0 {
        return Err(LifecycleError::Validation(
            "dispense quantity must be positive".into(),
        ));
    }

    let medicine =
        repository::get_medicine(conn, medicine_id)?.ok_or_else(|| LifecycleError::NotFound {
            entity: "medicine",
            id: medicine_id.to_string(),
        })?;
    if repository::deduct_stock(conn, medicine_id, quantity)? == 0 {
        return Err(LifecycleError::InsufficientStock {
            medicine: medicine.name,
            requested: quantity,
            available: medicine.quantity_in_stock,
        });
    }

    activity::record(
        conn,
        events,
        actor.id,
        LogAction::DispenseMedicine,
        EntityType::Medicine,
        medicine.id,
        serde_json::json!({
            "medicine_name": medicine.name,
            "quantity": quantity,
            "staff_name": actor.name,
        }),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::{open_database, open_memory_database};
    use crate::models::{EmergencyContact, Medicine, PatientProfile};
    use chrono::{Duration, NaiveDate};

    fn patient_actor(id: Uuid) -> Actor {
        Actor {
            id,
            name: "Maria Santos".into(),
            role: Role::Patient,
        }
    }

    fn staff_actor() -> Actor {
        Actor {
            id: Uuid::new_v4(),
            name: "Dr. Reyes".into(),
            role: Role::Staff,
        }
    }

    fn seed_patient(conn: &Connection) -> Uuid {
        let patient = PatientProfile {
            id: Uuid::new_v4(),
            first_name: "Maria".into(),
            last_name: "Santos".into(),
            birthday: NaiveDate::from_ymd_opt(1990, 5, 12),
            home_address: Some("12 Mabini St".into()),
            sex: Some("female".into()),
            civil_status: Some("single".into()),
            contact_number: Some("09171234567".into()),
            blood_type: Some("O+".into()),
            emergency_contact: Some(EmergencyContact {
                name: "Jose Santos".into(),
                phone: "09179876543".into(),
            }),
            created_at: chrono::Local::now().naive_local(),
        };
        repository::insert_patient(conn, &patient).unwrap();
        patient.id
    }

    fn seed_medicine(conn: &Connection, name: &str, stock: i64) -> Uuid {
        let medicine = Medicine {
            id: Uuid::new_v4(),
            name: name.into(),
            quantity_in_stock: stock,
            unit: "tablet".into(),
            expiry_date: None,
            created_at: chrono::Local::now().naive_local(),
        };
        repository::insert_medicine(conn, &medicine).unwrap();
        medicine.id
    }

    fn tomorrow() -> NaiveDateTime {
        chrono::Local::now().naive_local() + Duration::days(1)
    }

    fn booked(conn: &Connection, events: &LiveEvents) -> (Uuid, Appointment) {
        let patient_id = seed_patient(conn);
        let appt = book(
            conn,
            events,
            &patient_actor(patient_id),
            patient_id,
            tomorrow(),
            "Consultation: follow-up",
        )
        .unwrap();
        (patient_id, appt)
    }

    #[test]
    fn book_creates_pending_appointment_and_emits_event() {
        let conn = open_memory_database().unwrap();
        let events = LiveEvents::new();
        let mut rx = events.subscribe();

        let (_, appt) = booked(&conn, &events);
        assert_eq!(appt.status, AppointmentStatus::Pending);
        assert_eq!(appt.full_name, "Maria Santos");
        assert_eq!(appt.contact_number, "09171234567");

        match rx.try_recv().unwrap() {
            LiveEvent::NewAppointment { appointment_id } => assert_eq!(appointment_id, appt.id),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn book_rejects_incomplete_profile() {
        let conn = open_memory_database().unwrap();
        let events = LiveEvents::new();
        let patient_id = seed_patient(&conn);
        let mut profile = repository::get_patient(&conn, &patient_id).unwrap().unwrap();
        profile.blood_type = None;
        profile.emergency_contact = None;
        repository::update_patient(&conn, &profile).unwrap();

        let err = book(
            &conn,
            &events,
            &patient_actor(patient_id),
            patient_id,
            tomorrow(),
            "Consultation",
        )
        .unwrap_err();
        match err {
            LifecycleError::ProfileIncomplete { missing } => {
                assert!(missing.contains(&"blood_type"));
                assert!(missing.contains(&"emergency_contact"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(repository::list_appointments(&conn).unwrap().is_empty());
    }

    #[test]
    fn book_rejects_past_date_and_blank_purpose() {
        let conn = open_memory_database().unwrap();
        let events = LiveEvents::new();
        let patient_id = seed_patient(&conn);
        let actor = patient_actor(patient_id);

        let past = chrono::Local::now().naive_local() - Duration::days(1);
        assert!(matches!(
            book(&conn, &events, &actor, patient_id, past, "Consultation"),
            Err(LifecycleError::Validation(_))
        ));
        assert!(matches!(
            book(&conn, &events, &actor, patient_id, tomorrow(), "   "),
            Err(LifecycleError::Validation(_))
        ));
    }

    #[test]
    fn patient_cannot_book_for_someone_else() {
        let conn = open_memory_database().unwrap();
        let events = LiveEvents::new();
        let patient_id = seed_patient(&conn);

        let err = book(
            &conn,
            &events,
            &patient_actor(Uuid::new_v4()),
            patient_id,
            tomorrow(),
            "Consultation",
        )
        .unwrap_err();
        assert!(matches!(err, LifecycleError::Forbidden));
    }

    #[test]
    fn staff_can_book_on_behalf_of_patient() {
        let conn = open_memory_database().unwrap();
        let events = LiveEvents::new();
        let patient_id = seed_patient(&conn);

        let appt = book(
            &conn,
            &events,
            &staff_actor(),
            patient_id,
            tomorrow(),
            "Vaccination",
        )
        .unwrap();
        assert_eq!(appt.patient_id, patient_id);
    }

    #[test]
    fn approve_moves_pending_to_approved_with_side_effects() {
        let conn = open_memory_database().unwrap();
        let events = LiveEvents::new();
        let (patient_id, appt) = booked(&conn, &events);
        let staff = staff_actor();

        let approved = approve(&conn, &events, &staff, &appt.id).unwrap();
        assert_eq!(approved.status, AppointmentStatus::Approved);

        let notifications = notify::list_for(&conn, &patient_id).unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].status_tag, NotificationTag::Approved);
        assert!(notifications[0].message.contains("approved"));

        let logs = repository::list_activity_logs(&conn).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].action, LogAction::ApproveAppointment);
        assert_eq!(logs[0].details["staff_name"], "Dr. Reyes");
        assert_eq!(logs[0].details["patient_name"], "Maria Santos");
    }

    #[test]
    fn double_approve_fails_with_invalid_transition() {
        let conn = open_memory_database().unwrap();
        let events = LiveEvents::new();
        let (patient_id, appt) = booked(&conn, &events);
        let staff = staff_actor();

        approve(&conn, &events, &staff, &appt.id).unwrap();
        let err = approve(&conn, &events, &staff, &appt.id).unwrap_err();
        match err {
            LifecycleError::InvalidTransition { from, action } => {
                assert_eq!(from, AppointmentStatus::Approved);
                assert_eq!(action, "approve");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // exactly one notification despite two attempts
        assert_eq!(notify::list_for(&conn, &patient_id).unwrap().len(), 1);
    }

    #[test]
    fn concurrent_approvals_only_one_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clinic.db");
        let conn_a = open_database(&path).unwrap();
        let conn_b = open_database(&path).unwrap();
        let events = LiveEvents::new();
        let (_, appt) = booked(&conn_a, &events);
        let staff = staff_actor();

        let first = approve(&conn_a, &events, &staff, &appt.id);
        let second = approve(&conn_b, &events, &staff, &appt.id);

        assert!(first.is_ok());
        assert!(matches!(
            second,
            Err(LifecycleError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn approve_requires_staff_role() {
        let conn = open_memory_database().unwrap();
        let events = LiveEvents::new();
        let (patient_id, appt) = booked(&conn, &events);

        let err = approve(&conn, &events, &patient_actor(patient_id), &appt.id).unwrap_err();
        assert!(matches!(err, LifecycleError::Forbidden));
    }

    #[test]
    fn approve_unknown_appointment_is_not_found() {
        let conn = open_memory_database().unwrap();
        let events = LiveEvents::new();
        let err = approve(&conn, &events, &staff_actor(), &Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound { .. }));
    }

    #[test]
    fn reschedule_notifies_with_reason() {
        let conn = open_memory_database().unwrap();
        let events = LiveEvents::new();
        let (patient_id, appt) = booked(&conn, &events);
        let staff = staff_actor();

        let new_date = tomorrow() + Duration::days(7);
        let moved = reschedule(
            &conn,
            &events,
            &staff,
            &appt.id,
            new_date,
            "Consultation: lab results",
            Some("doctor unavailable"),
        )
        .unwrap();
        assert_eq!(moved.appointment_date, new_date);
        assert_eq!(moved.purpose, "Consultation: lab results");
        assert_eq!(moved.status, AppointmentStatus::Pending);

        let notifications = notify::list_for(&conn, &patient_id).unwrap();
        assert_eq!(notifications[0].status_tag, NotificationTag::Rescheduled);
        assert!(notifications[0].message.contains("doctor unavailable"));
    }

    #[test]
    fn completed_appointment_cannot_be_rescheduled() {
        let conn = open_memory_database().unwrap();
        let events = LiveEvents::new();
        let (_, appt) = booked(&conn, &events);
        let staff = staff_actor();

        approve(&conn, &events, &staff, &appt.id).unwrap();
        complete_consultation(
            &conn,
            &events,
            &staff,
            &appt.id,
            &ConsultationInput {
                diagnosis: "Healthy".into(),
                management: "None".into(),
                vitals: Vitals::default(),
                medicines: vec![],
            },
        )
        .unwrap();

        let err = reschedule(
            &conn,
            &events,
            &staff,
            &appt.id,
            tomorrow() + Duration::days(1),
            "Consultation",
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::InvalidTransition {
                from: AppointmentStatus::Completed,
                action: "reschedule",
            }
        ));
    }

    #[test]
    fn completion_deducts_stock_and_records_outcome() {
        let conn = open_memory_database().unwrap();
        let events = LiveEvents::new();
        let (patient_id, appt) = booked(&conn, &events);
        let staff = staff_actor();
        let amoxicillin = seed_medicine(&conn, "Amoxicillin 500mg", 30);
        let paracetamol = seed_medicine(&conn, "Paracetamol 500mg", 20);

        approve(&conn, &events, &staff, &appt.id).unwrap();
        let completed = complete_consultation(
            &conn,
            &events,
            &staff,
            &appt.id,
            &ConsultationInput {
                diagnosis: "Acute pharyngitis".into(),
                management: "Antibiotics for 7 days".into(),
                vitals: Vitals {
                    blood_pressure: Some("120/80".into()),
                    temperature: Some("38.1".into()),
                    pulse_rate: None,
                    respiratory_rate: None,
                },
                medicines: vec![
                    DispenseLine {
                        medicine_id: amoxicillin,
                        quantity: 21,
                    },
                    DispenseLine {
                        medicine_id: paracetamol,
                        quantity: 10,
                    },
                ],
            },
        )
        .unwrap();

        assert_eq!(completed.status, AppointmentStatus::Completed);
        let consultation = completed.consultation.unwrap();
        assert_eq!(consultation.diagnosis, "Acute pharyngitis");
        assert_eq!(consultation.medicines_prescribed.len(), 2);
        assert_eq!(consultation.medicines_prescribed[0].name, "Amoxicillin 500mg");

        assert_eq!(
            repository::get_medicine(&conn, &amoxicillin)
                .unwrap()
                .unwrap()
                .quantity_in_stock,
            9
        );
        assert_eq!(
            repository::get_medicine(&conn, &paracetamol)
                .unwrap()
                .unwrap()
                .quantity_in_stock,
            10
        );

        let notifications = notify::list_for(&conn, &patient_id).unwrap();
        assert_eq!(notifications[0].status_tag, NotificationTag::Completed);
    }

    #[test]
    fn insufficient_stock_rolls_back_everything() {
        let conn = open_memory_database().unwrap();
        let events = LiveEvents::new();
        let (patient_id, appt) = booked(&conn, &events);
        let staff = staff_actor();
        let amoxicillin = seed_medicine(&conn, "Amoxicillin 500mg", 30);
        let paracetamol = seed_medicine(&conn, "Paracetamol 500mg", 5);

        approve(&conn, &events, &staff, &appt.id).unwrap();
        let err = complete_consultation(
            &conn,
            &events,
            &staff,
            &appt.id,
            &ConsultationInput {
                diagnosis: "Acute pharyngitis".into(),
                management: "Antibiotics".into(),
                vitals: Vitals::default(),
                medicines: vec![
                    DispenseLine {
                        medicine_id: amoxicillin,
                        quantity: 21,
                    },
                    DispenseLine {
                        medicine_id: paracetamol,
                        quantity: 10,
                    },
                ],
            },
        )
        .unwrap_err();

        match err {
            LifecycleError::InsufficientStock {
                medicine,
                requested,
                available,
            } => {
                assert_eq!(medicine, "Paracetamol 500mg");
                assert_eq!(requested, 10);
                assert_eq!(available, 5);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // the first deduction rolled back too
        assert_eq!(
            repository::get_medicine(&conn, &amoxicillin)
                .unwrap()
                .unwrap()
                .quantity_in_stock,
            30
        );
        // appointment untouched
        let loaded = repository::get_appointment(&conn, &appt.id).unwrap().unwrap();
        assert_eq!(loaded.status, AppointmentStatus::Approved);
        assert!(loaded.consultation.is_none());
        // no completion notification
        assert_eq!(notify::list_for(&conn, &patient_id).unwrap().len(), 1);
    }

    #[test]
    fn completion_requires_approved_state() {
        let conn = open_memory_database().unwrap();
        let events = LiveEvents::new();
        let (_, appt) = booked(&conn, &events);
        let staff = staff_actor();

        let err = complete_consultation(
            &conn,
            &events,
            &staff,
            &appt.id,
            &ConsultationInput {
                diagnosis: "Healthy".into(),
                management: "None".into(),
                vitals: Vitals::default(),
                medicines: vec![],
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::InvalidTransition {
                from: AppointmentStatus::Pending,
                action: "complete",
            }
        ));
    }

    #[test]
    fn delete_is_silent_but_logged() {
        let conn = open_memory_database().unwrap();
        let events = LiveEvents::new();
        let (patient_id, appt) = booked(&conn, &events);

        delete(&conn, &events, &patient_actor(patient_id), &appt.id).unwrap();

        assert!(repository::get_appointment(&conn, &appt.id).unwrap().is_none());
        // silent: no notification for a deletion
        assert!(notify::list_for(&conn, &patient_id).unwrap().is_empty());

        let logs = repository::list_activity_logs(&conn).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].action, LogAction::DeleteAppointment);
    }

    #[test]
    fn patient_cannot_delete_someone_elses_appointment() {
        let conn = open_memory_database().unwrap();
        let events = LiveEvents::new();
        let (_, appt) = booked(&conn, &events);

        let err = delete(&conn, &events, &patient_actor(Uuid::new_v4()), &appt.id).unwrap_err();
        assert!(matches!(err, LifecycleError::Forbidden));
        assert!(repository::get_appointment(&conn, &appt.id).unwrap().is_some());
    }

    #[test]
    fn staff_can_delete_any_appointment() {
        let conn = open_memory_database().unwrap();
        let events = LiveEvents::new();
        let (_, appt) = booked(&conn, &events);

        delete(&conn, &events, &staff_actor(), &appt.id).unwrap();
        assert!(repository::get_appointment(&conn, &appt.id).unwrap().is_none());
    }

    #[test]
    fn walk_in_dispense_deducts_and_logs() {
        let conn = open_memory_database().unwrap();
        let events = LiveEvents::new();
        let staff = staff_actor();
        let medicine = seed_medicine(&conn, "Cetirizine 10mg", 15);

        dispense(&conn, &events, &staff, &medicine, 5).unwrap();
        assert_eq!(
            repository::get_medicine(&conn, &medicine)
                .unwrap()
                .unwrap()
                .quantity_in_stock,
            10
        );

        let logs = repository::list_activity_logs(&conn).unwrap();
        assert_eq!(logs[0].action, LogAction::DispenseMedicine);
        assert_eq!(logs[0].details["medicine_name"], "Cetirizine 10mg");
        assert_eq!(logs[0].details["quantity"], 5);

        let err = dispense(&conn, &events, &staff, &medicine, 11).unwrap_err();
        assert!(matches!(err, LifecycleError::InsufficientStock { .. }));
    }

    #[test]
    fn full_lifecycle_end_to_end() {
        let conn = open_memory_database().unwrap();
        let events = LiveEvents::new();
        let (patient_id, appt) = booked(&conn, &events);
        let staff = staff_actor();
        let medicine = seed_medicine(&conn, "Amoxicillin 500mg", 30);

        approve(&conn, &events, &staff, &appt.id).unwrap();
        reschedule(
            &conn,
            &events,
            &staff,
            &appt.id,
            tomorrow() + Duration::days(2),
            "Consultation: follow-up",
            Some("clinic closed"),
        )
        .unwrap();
        complete_consultation(
            &conn,
            &events,
            &staff,
            &appt.id,
            &ConsultationInput {
                diagnosis: "Resolved".into(),
                management: "Finish course".into(),
                vitals: Vitals::default(),
                medicines: vec![DispenseLine {
                    medicine_id: medicine,
                    quantity: 7,
                }],
            },
        )
        .unwrap();

        // three notifications, newest first
        let notifications = notify::list_for(&conn, &patient_id).unwrap();
        assert_eq!(notifications.len(), 3);
        let tags: Vec<_> = notifications.iter().map(|n| n.status_tag).collect();
        assert!(tags.contains(&NotificationTag::Approved));
        assert!(tags.contains(&NotificationTag::Rescheduled));
        assert!(tags.contains(&NotificationTag::Completed));

        // three log entries
        assert_eq!(repository::list_activity_logs(&conn).unwrap().len(), 3);
        assert_eq!(
            repository::get_medicine(&conn, &medicine)
                .unwrap()
                .unwrap()
                .quantity_in_stock,
            23
        );
    }
}
