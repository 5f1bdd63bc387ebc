use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Clinicore";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bind address for the API server.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8750";

/// Get the application data directory
/// ~/Clinicore/ on all platforms (user-visible)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Clinicore")
}

/// Get the clinic database path
pub fn database_path() -> PathBuf {
    app_data_dir().join("clinic.db")
}

/// Bind address for the API server (`CLINICORE_ADDR` overrides the default).
pub fn bind_addr() -> String {
    std::env::var("CLINICORE_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
}

/// Default log filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> String {
    format!("{}=info,tower_http=info", env!("CARGO_PKG_NAME"))
}
