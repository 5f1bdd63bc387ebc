//! Append-only activity log for privileged mutations.
//!
//! Recording is best-effort by design: the business operation already
//! committed, so a logging failure must never surface to the caller.
//! Failures are traced and swallowed.

use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository;
use crate::events::{LiveEvent, LiveEvents};
use crate::models::enums::{EntityType, LogAction};
use crate::models::ActivityLog;

/// Append a log entry and wake connected clients. Returns the entry id,
/// or `None` if persistence failed (the failure is traced, not raised).
pub fn record(
    conn: &Connection,
    events: &LiveEvents,
    actor_id: Uuid,
    action: LogAction,
    entity_type: EntityType,
    entity_id: Uuid,
    details: serde_json::Value,
) -> Option<Uuid> {
    let log = ActivityLog {
        id: Uuid::new_v4(),
        actor_id,
        action,
        entity_type,
        entity_id,
        details,
        created_at: chrono::Local::now().naive_local(),
    };

    if let Err(e) = repository::insert_activity_log(conn, &log) {
        tracing::error!(
            action = action.as_str(),
            entity_id = %entity_id,
            "failed to record activity log: {e}"
        );
        return None;
    }

    events.emit(LiveEvent::NewLog { log_id: log.id });
    Some(log.id)
}
