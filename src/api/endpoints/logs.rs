//! Activity log listing (admin only).

use std::str::FromStr;

use axum::extract::{Extension, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::endpoints::appointments::parse_date;
use crate::api::error::ApiError;
use crate::auth::Actor;
use crate::db::repository;
use crate::lifecycle::LifecycleError;
use crate::models::enums::LogAction;
use crate::models::{ActivityLog, LogFilter};
use crate::query;
use crate::roles::Capability;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LogQuery {
    pub action: Option<String>,
    pub actor_id: Option<Uuid>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(q): Query<LogQuery>,
) -> Result<Json<Vec<ActivityLog>>, ApiError> {
    if !actor.role.allows(Capability::ViewActivityLogs) {
        return Err(LifecycleError::Forbidden.into());
    }

    let filter = LogFilter {
        action: q
            .action
            .as_deref()
            .map(|s| {
                LogAction::from_str(s)
                    .map_err(|_| ApiError::BadRequest(format!("invalid action: {s}")))
            })
            .transpose()?,
        actor_id: q.actor_id,
        date_from: q.date_from.as_deref().map(parse_date).transpose()?,
        date_to: q.date_to.as_deref().map(parse_date).transpose()?,
    };

    let conn = state.open_db()?;
    let logs = repository::list_activity_logs(&conn)?;
    Ok(Json(query::filter_logs(&logs, &filter)))
}
