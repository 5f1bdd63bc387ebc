use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::NotificationTag;
use crate::models::Notification;

use super::appointment::{parse_datetime, parse_uuid};

pub fn insert_notification(
    conn: &Connection,
    notification: &Notification,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO notifications (id, recipient_id, message, status_tag, read, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            notification.id.to_string(),
            notification.recipient_id.to_string(),
            notification.message,
            notification.status_tag.as_str(),
            notification.read as i64,
            notification
                .created_at
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        ],
    )?;
    Ok(())
}

/// Newest first, scoped to a single recipient.
pub fn list_notifications_for(
    conn: &Connection,
    recipient_id: &Uuid,
) -> Result<Vec<Notification>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, recipient_id, message, status_tag, read, created_at
         FROM notifications WHERE recipient_id = ?1
         ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![recipient_id.to_string()], notification_row)?;

    let mut notifications = Vec::new();
    for row in rows {
        notifications.push(notification_from_row(row?)?);
    }
    Ok(notifications)
}

pub fn count_unread(conn: &Connection, recipient_id: &Uuid) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE recipient_id = ?1 AND read = 0",
        params![recipient_id.to_string()],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}

/// Returns the number of rows changed. Marking an already-read
/// notification is a no-op, not an error.
pub fn mark_notification_read(conn: &Connection, id: &Uuid) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE notifications SET read = 1 WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(changed)
}

pub fn notification_exists(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE id = ?1",
        params![id.to_string()],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count > 0)
}

pub fn mark_all_read(conn: &Connection, recipient_id: &Uuid) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE notifications SET read = 1 WHERE recipient_id = ?1 AND read = 0",
        params![recipient_id.to_string()],
    )?;
    Ok(changed)
}

struct NotificationRow {
    id: String,
    recipient_id: String,
    message: String,
    status_tag: String,
    read: i64,
    created_at: String,
}

fn notification_row(row: &rusqlite::Row<'_>) -> Result<NotificationRow, rusqlite::Error> {
    Ok(NotificationRow {
        id: row.get(0)?,
        recipient_id: row.get(1)?,
        message: row.get(2)?,
        status_tag: row.get(3)?,
        read: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn notification_from_row(row: NotificationRow) -> Result<Notification, DatabaseError> {
    Ok(Notification {
        id: parse_uuid(&row.id)?,
        recipient_id: parse_uuid(&row.recipient_id)?,
        message: row.message,
        status_tag: NotificationTag::from_str(&row.status_tag)?,
        read: row.read != 0,
        created_at: parse_datetime(&row.created_at)?,
    })
}
