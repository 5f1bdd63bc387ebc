//! Shared application state.
//!
//! `rusqlite::Connection` is not `Sync`, so handlers open a short-lived
//! connection per request; WAL mode plus a busy timeout make that safe
//! across concurrent requests. Everything else in here is cheap to
//! clone and shared.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use rusqlite::Connection;

use crate::auth::SessionStore;
use crate::db::{sqlite, DatabaseError};
use crate::events::LiveEvents;

#[derive(Clone)]
pub struct AppState {
    db_path: PathBuf,
    pub events: LiveEvents,
    pub sessions: Arc<RwLock<SessionStore>>,
}

impl AppState {
    /// Open (and migrate) the database once, then hand out the state.
    pub fn new(db_path: PathBuf) -> Result<Self, DatabaseError> {
        sqlite::open_database(&db_path)?;
        Ok(Self {
            db_path,
            events: LiveEvents::new(),
            sessions: Arc::new(RwLock::new(SessionStore::new())),
        })
    }

    pub fn open_db(&self) -> Result<Connection, DatabaseError> {
        sqlite::open_database(&self.db_path)
    }
}
