use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birthday: Option<NaiveDate>,
    pub home_address: Option<String>,
    pub sex: Option<String>,
    pub civil_status: Option<String>,
    pub contact_number: Option<String>,
    pub blood_type: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
}

impl PatientProfile {
    /// Required fields that must be filled before a patient may book.
    /// Returns the names of every field still missing (empty = complete).
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.birthday.is_none() {
            missing.push("birthday");
        }
        if self.home_address.as_deref().unwrap_or("").trim().is_empty() {
            missing.push("home_address");
        }
        if self.sex.as_deref().unwrap_or("").trim().is_empty() {
            missing.push("sex");
        }
        if self.civil_status.as_deref().unwrap_or("").trim().is_empty() {
            missing.push("civil_status");
        }
        if self.contact_number.as_deref().unwrap_or("").trim().is_empty() {
            missing.push("contact_number");
        }
        if self.blood_type.as_deref().unwrap_or("").trim().is_empty() {
            missing.push("blood_type");
        }
        match &self.emergency_contact {
            None => missing.push("emergency_contact"),
            Some(ec) => {
                if ec.name.trim().is_empty() {
                    missing.push("emergency_contact.name");
                }
                if ec.phone.trim().is_empty() {
                    missing.push("emergency_contact.phone");
                }
            }
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
