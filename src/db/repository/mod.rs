//! Repository layer: free functions over a `rusqlite::Connection`.
//!
//! All identifiers are stored as UUID strings and datetimes as
//! `%Y-%m-%d %H:%M:%S` text. Status transitions are expressed as
//! conditional UPDATEs so a stale writer changes zero rows instead of
//! clobbering a newer state.

pub mod activity_log;
pub mod appointment;
pub mod medicine;
pub mod notification;
pub mod patient;

pub use activity_log::*;
pub use appointment::*;
pub use medicine::*;
pub use notification::*;
pub use patient::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::{AppointmentStatus, NotificationTag};
    use crate::models::{
        Appointment, Consultation, Medicine, Notification, PrescribedMedicine, Vitals,
    };
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn sample_appointment(patient_id: Uuid) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_id,
            full_name: "Maria Santos".into(),
            contact_number: "09171234567".into(),
            appointment_date: NaiveDate::from_ymd_opt(2026, 9, 14)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
            purpose: "Consultation: follow-up".into(),
            status: AppointmentStatus::Pending,
            reschedule_reason: None,
            consultation: None,
            created_at: NaiveDate::from_ymd_opt(2026, 9, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        }
    }

    fn sample_patient(conn: &rusqlite::Connection) -> Uuid {
        let patient = crate::models::PatientProfile {
            id: Uuid::new_v4(),
            first_name: "Maria".into(),
            last_name: "Santos".into(),
            birthday: NaiveDate::from_ymd_opt(1990, 5, 12),
            home_address: Some("12 Mabini St".into()),
            sex: Some("female".into()),
            civil_status: Some("single".into()),
            contact_number: Some("09171234567".into()),
            blood_type: Some("O+".into()),
            emergency_contact: Some(crate::models::EmergencyContact {
                name: "Jose Santos".into(),
                phone: "09179876543".into(),
            }),
            created_at: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        };
        insert_patient(conn, &patient).unwrap();
        patient.id
    }

    #[test]
    fn appointment_insert_and_get_round_trip() {
        let conn = open_memory_database().unwrap();
        let patient_id = sample_patient(&conn);
        let appt = sample_appointment(patient_id);
        insert_appointment(&conn, &appt).unwrap();

        let loaded = get_appointment(&conn, &appt.id).unwrap().unwrap();
        assert_eq!(loaded.full_name, "Maria Santos");
        assert_eq!(loaded.status, AppointmentStatus::Pending);
        assert_eq!(loaded.appointment_date, appt.appointment_date);
        assert!(loaded.consultation.is_none());
    }

    #[test]
    fn get_missing_appointment_returns_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_appointment(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn approve_is_a_compare_and_set() {
        let conn = open_memory_database().unwrap();
        let patient_id = sample_patient(&conn);
        let appt = sample_appointment(patient_id);
        insert_appointment(&conn, &appt).unwrap();

        assert_eq!(approve_if_pending(&conn, &appt.id).unwrap(), 1);
        // A second approval observes 'approved', not 'pending'
        assert_eq!(approve_if_pending(&conn, &appt.id).unwrap(), 0);

        let loaded = get_appointment(&conn, &appt.id).unwrap().unwrap();
        assert_eq!(loaded.status, AppointmentStatus::Approved);
    }

    #[test]
    fn reschedule_updates_date_and_purpose_together() {
        let conn = open_memory_database().unwrap();
        let patient_id = sample_patient(&conn);
        let appt = sample_appointment(patient_id);
        insert_appointment(&conn, &appt).unwrap();

        let new_date = NaiveDate::from_ymd_opt(2026, 9, 21)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap();
        let changed = reschedule_if_active(
            &conn,
            &appt.id,
            &new_date,
            "Consultation: lab results",
            Some("doctor unavailable"),
        )
        .unwrap();
        assert_eq!(changed, 1);

        let loaded = get_appointment(&conn, &appt.id).unwrap().unwrap();
        assert_eq!(loaded.appointment_date, new_date);
        assert_eq!(loaded.purpose, "Consultation: lab results");
        assert_eq!(loaded.reschedule_reason.as_deref(), Some("doctor unavailable"));
    }

    #[test]
    fn completed_appointment_rejects_reschedule() {
        let conn = open_memory_database().unwrap();
        let patient_id = sample_patient(&conn);
        let appt = sample_appointment(patient_id);
        insert_appointment(&conn, &appt).unwrap();
        approve_if_pending(&conn, &appt.id).unwrap();
        complete_if_approved(&conn, &appt.id, &sample_consultation()).unwrap();

        let new_date = NaiveDate::from_ymd_opt(2026, 10, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let changed =
            reschedule_if_active(&conn, &appt.id, &new_date, "Consultation", None).unwrap();
        assert_eq!(changed, 0);
    }

    fn sample_consultation() -> Consultation {
        Consultation {
            diagnosis: "Acute pharyngitis".into(),
            management: "Rest, fluids, antibiotics".into(),
            vitals: Vitals {
                blood_pressure: Some("120/80".into()),
                temperature: Some("38.1".into()),
                pulse_rate: Some("82".into()),
                respiratory_rate: None,
            },
            medicines_prescribed: vec![PrescribedMedicine {
                medicine_id: Uuid::new_v4(),
                name: "Amoxicillin".into(),
                quantity: 21,
            }],
            completed_at: NaiveDate::from_ymd_opt(2026, 9, 14)
                .unwrap()
                .and_hms_opt(11, 5, 0)
                .unwrap(),
        }
    }

    #[test]
    fn completion_persists_consultation_fields() {
        let conn = open_memory_database().unwrap();
        let patient_id = sample_patient(&conn);
        let appt = sample_appointment(patient_id);
        insert_appointment(&conn, &appt).unwrap();
        approve_if_pending(&conn, &appt.id).unwrap();

        let consultation = sample_consultation();
        assert_eq!(
            complete_if_approved(&conn, &appt.id, &consultation).unwrap(),
            1
        );

        let loaded = get_appointment(&conn, &appt.id).unwrap().unwrap();
        assert_eq!(loaded.status, AppointmentStatus::Completed);
        let stored = loaded.consultation.unwrap();
        assert_eq!(stored.diagnosis, "Acute pharyngitis");
        assert_eq!(stored.vitals.blood_pressure.as_deref(), Some("120/80"));
        assert_eq!(stored.medicines_prescribed.len(), 1);
        assert_eq!(stored.medicines_prescribed[0].quantity, 21);
    }

    #[test]
    fn completion_requires_approved_status() {
        let conn = open_memory_database().unwrap();
        let patient_id = sample_patient(&conn);
        let appt = sample_appointment(patient_id);
        insert_appointment(&conn, &appt).unwrap();

        // still pending
        assert_eq!(
            complete_if_approved(&conn, &appt.id, &sample_consultation()).unwrap(),
            0
        );
    }

    #[test]
    fn notifications_list_newest_first_and_mark_read() {
        let conn = open_memory_database().unwrap();
        let recipient = Uuid::new_v4();

        for (i, message) in ["approved", "rescheduled"].iter().enumerate() {
            let n = Notification {
                id: Uuid::new_v4(),
                recipient_id: recipient,
                message: message.to_string(),
                status_tag: NotificationTag::Approved,
                read: false,
                created_at: NaiveDate::from_ymd_opt(2026, 9, 1)
                    .unwrap()
                    .and_hms_opt(8 + i as u32, 0, 0)
                    .unwrap(),
            };
            insert_notification(&conn, &n).unwrap();
        }

        let listed = list_notifications_for(&conn, &recipient).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].message, "rescheduled");
        assert_eq!(count_unread(&conn, &recipient).unwrap(), 2);

        assert_eq!(mark_notification_read(&conn, &listed[0].id).unwrap(), 1);
        assert_eq!(count_unread(&conn, &recipient).unwrap(), 1);

        // idempotent
        assert_eq!(mark_notification_read(&conn, &listed[0].id).unwrap(), 1);
        assert_eq!(count_unread(&conn, &recipient).unwrap(), 1);

        assert_eq!(mark_all_read(&conn, &recipient).unwrap(), 1);
        assert_eq!(count_unread(&conn, &recipient).unwrap(), 0);
        assert_eq!(mark_all_read(&conn, &recipient).unwrap(), 0);
    }

    #[test]
    fn notifications_are_scoped_to_recipient() {
        let conn = open_memory_database().unwrap();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let n = Notification {
            id: Uuid::new_v4(),
            recipient_id: alice,
            message: "your appointment was approved".into(),
            status_tag: NotificationTag::Approved,
            read: false,
            created_at: NaiveDate::from_ymd_opt(2026, 9, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        };
        insert_notification(&conn, &n).unwrap();

        assert_eq!(list_notifications_for(&conn, &alice).unwrap().len(), 1);
        assert!(list_notifications_for(&conn, &bob).unwrap().is_empty());
    }

    fn sample_medicine(stock: i64) -> Medicine {
        Medicine {
            id: Uuid::new_v4(),
            name: "Amoxicillin 500mg".into(),
            quantity_in_stock: stock,
            unit: "capsule".into(),
            expiry_date: NaiveDate::from_ymd_opt(2027, 6, 30),
            created_at: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn deduct_stock_refuses_overdraw() {
        let conn = open_memory_database().unwrap();
        let med = sample_medicine(10);
        insert_medicine(&conn, &med).unwrap();

        assert_eq!(deduct_stock(&conn, &med.id, 11).unwrap(), 0);
        assert_eq!(
            get_medicine(&conn, &med.id)
                .unwrap()
                .unwrap()
                .quantity_in_stock,
            10
        );

        assert_eq!(deduct_stock(&conn, &med.id, 10).unwrap(), 1);
        assert_eq!(
            get_medicine(&conn, &med.id)
                .unwrap()
                .unwrap()
                .quantity_in_stock,
            0
        );
        // exhausted
        assert_eq!(deduct_stock(&conn, &med.id, 1).unwrap(), 0);
    }

    #[test]
    fn restock_adds_quantity() {
        let conn = open_memory_database().unwrap();
        let med = sample_medicine(3);
        insert_medicine(&conn, &med).unwrap();

        assert_eq!(restock(&conn, &med.id, 50).unwrap(), 1);
        assert_eq!(
            get_medicine(&conn, &med.id)
                .unwrap()
                .unwrap()
                .quantity_in_stock,
            53
        );
    }

    #[test]
    fn patient_round_trip_including_emergency_contact() {
        let conn = open_memory_database().unwrap();
        let id = sample_patient(&conn);

        let loaded = get_patient(&conn, &id).unwrap().unwrap();
        assert_eq!(loaded.display_name(), "Maria Santos");
        assert!(loaded.is_complete());
        assert_eq!(
            loaded.emergency_contact.as_ref().map(|ec| ec.name.as_str()),
            Some("Jose Santos")
        );
    }

    #[test]
    fn patient_update_persists_new_demographics() {
        let conn = open_memory_database().unwrap();
        let id = sample_patient(&conn);

        let mut patient = get_patient(&conn, &id).unwrap().unwrap();
        patient.civil_status = Some("married".into());
        patient.home_address = Some("7 Rizal Ave".into());
        assert_eq!(update_patient(&conn, &patient).unwrap(), 1);

        let loaded = get_patient(&conn, &id).unwrap().unwrap();
        assert_eq!(loaded.civil_status.as_deref(), Some("married"));
        assert_eq!(loaded.home_address.as_deref(), Some("7 Rizal Ave"));
    }
}
