//! Clinicore: appointment lifecycle service for a small clinic.
//!
//! A booked appointment moves pending → approved → completed; every
//! transition notifies the patient, lands in an append-only activity
//! log, and is pushed to connected dashboards over WebSocket. Medicine
//! stock is deducted atomically when consultations complete.

pub mod activity;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod events;
pub mod lifecycle;
pub mod models;
pub mod notify;
pub mod query;
pub mod roles;
pub mod state;
