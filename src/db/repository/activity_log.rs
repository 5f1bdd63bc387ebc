use std::str::FromStr;

use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::enums::{EntityType, LogAction};
use crate::models::ActivityLog;

use super::appointment::{parse_datetime, parse_uuid};

pub fn insert_activity_log(conn: &Connection, log: &ActivityLog) -> Result<(), DatabaseError> {
    let details = serde_json::to_string(&log.details)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
    conn.execute(
        "INSERT INTO activity_logs (id, actor_id, action, entity_type, entity_id, details, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            log.id.to_string(),
            log.actor_id.to_string(),
            log.action.as_str(),
            log.entity_type.as_str(),
            log.entity_id.to_string(),
            details,
            log.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

/// Newest first. The table is append-only so this is the only read shape;
/// finer filtering happens in memory.
pub fn list_activity_logs(conn: &Connection) -> Result<Vec<ActivityLog>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, actor_id, action, entity_type, entity_id, details, created_at
         FROM activity_logs ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map([], activity_log_row)?;

    let mut logs = Vec::new();
    for row in rows {
        logs.push(activity_log_from_row(row?)?);
    }
    Ok(logs)
}

struct ActivityLogRow {
    id: String,
    actor_id: String,
    action: String,
    entity_type: String,
    entity_id: String,
    details: String,
    created_at: String,
}

fn activity_log_row(row: &rusqlite::Row<'_>) -> Result<ActivityLogRow, rusqlite::Error> {
    Ok(ActivityLogRow {
        id: row.get(0)?,
        actor_id: row.get(1)?,
        action: row.get(2)?,
        entity_type: row.get(3)?,
        entity_id: row.get(4)?,
        details: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn activity_log_from_row(row: ActivityLogRow) -> Result<ActivityLog, DatabaseError> {
    Ok(ActivityLog {
        id: parse_uuid(&row.id)?,
        actor_id: parse_uuid(&row.actor_id)?,
        action: LogAction::from_str(&row.action)?,
        entity_type: EntityType::from_str(&row.entity_type)?,
        entity_id: parse_uuid(&row.entity_id)?,
        details: serde_json::from_str(&row.details)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        created_at: parse_datetime(&row.created_at)?,
    })
}
