//! Patient notifications: persist first, then push.
//!
//! A notification row is the source of truth; the WebSocket event that
//! follows is only a wake-up. Dispatch is best-effort from the caller's
//! point of view: the lifecycle operation has already committed, so a
//! failed insert is traced and swallowed.

use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{repository, DatabaseError};
use crate::events::{LiveEvent, LiveEvents};
use crate::models::enums::NotificationTag;
use crate::models::Notification;

/// Persist a notification and wake the recipient's connected clients.
/// Returns the notification id, or `None` if persistence failed.
pub fn dispatch(
    conn: &Connection,
    events: &LiveEvents,
    recipient_id: Uuid,
    status_tag: NotificationTag,
    message: String,
) -> Option<Uuid> {
    let notification = Notification {
        id: Uuid::new_v4(),
        recipient_id,
        message,
        status_tag,
        read: false,
        created_at: chrono::Local::now().naive_local(),
    };

    if let Err(e) = repository::insert_notification(conn, &notification) {
        tracing::error!(
            recipient_id = %recipient_id,
            tag = status_tag.as_str(),
            "failed to persist notification: {e}"
        );
        return None;
    }

    events.emit(LiveEvent::NewNotification {
        recipient_id,
        notification_id: notification.id,
    });
    Some(notification.id)
}

/// Newest first, all of them; clients render read state from the flag.
pub fn list_for(
    conn: &Connection,
    recipient_id: &Uuid,
) -> Result<Vec<Notification>, DatabaseError> {
    repository::list_notifications_for(conn, recipient_id)
}

pub fn unread_count(conn: &Connection, recipient_id: &Uuid) -> Result<i64, DatabaseError> {
    repository::count_unread(conn, recipient_id)
}

/// Idempotent: marking an already-read notification succeeds. Only an
/// unknown id is an error.
pub fn mark_read(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    if !repository::notification_exists(conn, id)? {
        return Err(DatabaseError::NotFound {
            entity_type: "notification".into(),
            id: id.to_string(),
        });
    }
    repository::mark_notification_read(conn, id)?;
    Ok(())
}

pub fn mark_all_read(conn: &Connection, recipient_id: &Uuid) -> Result<usize, DatabaseError> {
    repository::mark_all_read(conn, recipient_id)
}
