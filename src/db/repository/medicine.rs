use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Medicine;

use super::appointment::{parse_datetime, parse_uuid};

const DATE_FMT: &str = "%Y-%m-%d";

pub fn insert_medicine(conn: &Connection, medicine: &Medicine) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medicines (id, name, quantity_in_stock, unit, expiry_date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            medicine.id.to_string(),
            medicine.name,
            medicine.quantity_in_stock,
            medicine.unit,
            medicine.expiry_date.map(|d| d.format(DATE_FMT).to_string()),
            medicine.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_medicine(conn: &Connection, id: &Uuid) -> Result<Option<Medicine>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;
    let mut rows = stmt.query_map(params![id.to_string()], medicine_row)?;

    match rows.next() {
        Some(row) => Ok(Some(medicine_from_row(row?)?)),
        None => Ok(None),
    }
}

pub fn list_medicines(conn: &Connection) -> Result<Vec<Medicine>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY name"))?;
    let rows = stmt.query_map([], medicine_row)?;

    let mut medicines = Vec::new();
    for row in rows {
        medicines.push(medicine_from_row(row?)?);
    }
    Ok(medicines)
}

/// Atomic decrement-if-sufficient. Returns the number of rows changed:
/// 0 means the medicine is missing or the remaining stock is below
/// `quantity`, and nothing was deducted.
pub fn deduct_stock(conn: &Connection, id: &Uuid, quantity: i64) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE medicines SET quantity_in_stock = quantity_in_stock - ?2
         WHERE id = ?1 AND quantity_in_stock >= ?2",
        params![id.to_string(), quantity],
    )?;
    Ok(changed)
}

pub fn restock(conn: &Connection, id: &Uuid, quantity: i64) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE medicines SET quantity_in_stock = quantity_in_stock + ?2 WHERE id = ?1",
        params![id.to_string(), quantity],
    )?;
    Ok(changed)
}

const SELECT_COLUMNS: &str =
    "SELECT id, name, quantity_in_stock, unit, expiry_date, created_at FROM medicines";

struct MedicineRow {
    id: String,
    name: String,
    quantity_in_stock: i64,
    unit: String,
    expiry_date: Option<String>,
    created_at: String,
}

fn medicine_row(row: &rusqlite::Row<'_>) -> Result<MedicineRow, rusqlite::Error> {
    Ok(MedicineRow {
        id: row.get(0)?,
        name: row.get(1)?,
        quantity_in_stock: row.get(2)?,
        unit: row.get(3)?,
        expiry_date: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn medicine_from_row(row: MedicineRow) -> Result<Medicine, DatabaseError> {
    let expiry_date = match row.expiry_date {
        Some(s) => Some(
            NaiveDate::parse_from_str(&s, DATE_FMT)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        ),
        None => None,
    };
    Ok(Medicine {
        id: parse_uuid(&row.id)?,
        name: row.name,
        quantity_in_stock: row.quantity_in_stock,
        unit: row.unit,
        expiry_date,
        created_at: parse_datetime(&row.created_at)?,
    })
}
