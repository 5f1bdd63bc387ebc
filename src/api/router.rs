//! REST router. All routes live under `/api/`; everything except
//! `/api/health` requires a bearer token. The WebSocket upgrade sits at
//! `/ws` and authenticates through a `token` query parameter instead,
//! since browsers cannot set headers on WebSocket handshakes.

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::websocket;
use crate::state::AppState;

pub fn api_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/appointments",
            get(endpoints::appointments::list).post(endpoints::appointments::book),
        )
        .route(
            "/appointments/:id",
            get(endpoints::appointments::detail).delete(endpoints::appointments::remove),
        )
        .route(
            "/appointments/:id/approve",
            post(endpoints::appointments::approve),
        )
        .route(
            "/appointments/:id/reschedule",
            post(endpoints::appointments::reschedule),
        )
        .route(
            "/appointments/:id/complete",
            post(endpoints::appointments::complete),
        )
        .route("/notifications", get(endpoints::notifications::list))
        .route(
            "/notifications/unread_count",
            get(endpoints::notifications::unread_count),
        )
        .route(
            "/notifications/:id/read",
            post(endpoints::notifications::mark_read),
        )
        .route(
            "/notifications/read_all",
            post(endpoints::notifications::mark_all_read),
        )
        .route("/logs", get(endpoints::logs::list))
        .route(
            "/medicines",
            get(endpoints::medicines::list).post(endpoints::medicines::create),
        )
        .route(
            "/medicines/:id/restock",
            post(endpoints::medicines::restock),
        )
        .route(
            "/medicines/:id/dispense",
            post(endpoints::medicines::dispense),
        )
        .route(
            "/patients",
            get(endpoints::patients::list).post(endpoints::patients::create),
        )
        .route(
            "/patients/:id",
            get(endpoints::patients::detail)
                .put(endpoints::patients::update)
                .post(endpoints::patients::create_for),
        )
        .route("/sessions", post(endpoints::users::issue_session))
        .route("/users/:id/role", patch(endpoints::users::update_role))
        .with_state(state.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        // Extension must be outermost so the auth middleware can see it
        .layer(axum::Extension(state.clone()));

    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .with_state(state.clone());

    let ws = Router::new()
        .route("/ws", get(websocket::ws_upgrade))
        .with_state(state.clone());

    Router::new()
        .nest("/api", protected)
        .nest("/api", public)
        .merge(ws)
        .layer(CorsLayer::permissive())
}
