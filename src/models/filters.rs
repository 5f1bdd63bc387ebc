use chrono::NaiveDate;
use uuid::Uuid;

use super::enums::{AppointmentStatus, LogAction};

#[derive(Debug, Default, Clone)]
pub struct AppointmentFilter {
    pub name: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub purpose: Option<String>,
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Default, Clone)]
pub struct LogFilter {
    pub action: Option<LogAction>,
    pub actor_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}
