use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{EntityType, LogAction};

/// Append-only audit record for a privileged mutation.
/// `details` is a free-form key/value snapshot of the acted-on entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub action: LogAction,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub details: serde_json::Value,
    pub created_at: NaiveDateTime,
}
