use std::error::Error;

use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use clinicore::api::api_router;
use clinicore::auth::Actor;
use clinicore::config;
use clinicore::models::enums::Role;
use clinicore::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let data_dir = config::app_data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let state = AppState::new(config::database_path())?;
    tracing::info!(
        "{} v{} using database at {}",
        config::APP_NAME,
        config::APP_VERSION,
        config::database_path().display()
    );

    // Bootstrap session: all further sessions are issued through the
    // API with this token.
    let admin_token = {
        let mut sessions = state
            .sessions
            .write()
            .map_err(|_| "session store poisoned at startup")?;
        sessions.issue(Actor {
            id: Uuid::new_v4(),
            name: "admin".into(),
            role: Role::Admin,
        })
    };
    tracing::info!("admin token (valid until restart): {admin_token}");

    let addr = config::bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {addr}");
    axum::serve(listener, api_router(state)).await?;
    Ok(())
}
