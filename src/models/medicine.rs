use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medicine {
    pub id: Uuid,
    pub name: String,
    pub quantity_in_stock: i64,
    pub unit: String,
    pub expiry_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}
