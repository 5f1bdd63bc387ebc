use axum::Json;
use serde_json::{json, Value};

use crate::config;

pub async fn check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": config::APP_VERSION,
    }))
}
