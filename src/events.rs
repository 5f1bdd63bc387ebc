//! Live event fan-out for connected WebSocket clients.
//!
//! Events are advisory wake-ups: clients re-fetch through the REST API
//! on receipt. Dropped events (no subscribers, lagging receiver) are
//! never an error for the emitting operation.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 256;

/// A payload pushed to every connected client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum LiveEvent {
    /// A patient booked a new appointment (wakes staff dashboards).
    #[serde(rename = "newAppointment")]
    NewAppointment { appointment_id: Uuid },
    /// A privileged action was recorded in the activity log.
    #[serde(rename = "new_log")]
    NewLog { log_id: Uuid },
    /// A notification was created for a patient.
    #[serde(rename = "new_notification")]
    NewNotification { recipient_id: Uuid, notification_id: Uuid },
}

/// Cloneable handle around a broadcast channel.
#[derive(Debug, Clone)]
pub struct LiveEvents {
    tx: broadcast::Sender<LiveEvent>,
}

impl LiveEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Fire-and-forget: a send error just means nobody is listening.
    pub fn emit(&self, event: LiveEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.tx.subscribe()
    }
}

impl Default for LiveEvents {
    fn default() -> Self {
        Self::new()
    }
}
