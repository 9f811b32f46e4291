//! # rapport-server
//!
//! HTTP front end for Rapport.
//!
//! This binary provides:
//! - **Accounts**: signup and login with bcrypt-hashed passwords
//! - **Friend graph**: send, accept and list friend requests; list friends
//! - **Direct messages**: send a message and fetch a conversation in
//!   chronological order
//!
//! All state lives in one SQLite database opened at startup and shared by
//! every component through a [`rapport_store::StoreHandle`].

mod accounts;
mod api;
mod config;
mod error;
mod extract;

use rapport_shared::constants::APP_NAME;
use rapport_store::{Database, StoreHandle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,rapport_server=debug")),
        )
        .init();

    info!("Starting {} server v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Open the store and wire the social components to it
    // -----------------------------------------------------------------------
    let db_path = match &config.database_path {
        Some(path) => path.clone(),
        None => Database::default_path()?,
    };
    let store = StoreHandle::open_at(&db_path)?;

    let http_addr = config.http_addr;
    let app_state = AppState::new(config, store)?;
    info!(
        require_friendship = app_state.conversations.policy().require_friendship_for_messaging,
        "Social core ready"
    );

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
