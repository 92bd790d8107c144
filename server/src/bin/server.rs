//! Headless server binary.
//!
//! Starts the worker, the axum web server and signal handling.

use tracing_subscriber::EnvFilter;

use sacred_recitations_lib::app::SharedState;
use sacred_recitations_lib::{server, shutdown};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Sacred Recitations notification server");

    let (db, config, dir) = sacred_recitations_lib::init_foundation()?;
    let state = SharedState::new(db, config, dir);

    sacred_recitations_lib::start_worker(&state);

    let server_state = state.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(server_state).await {
            tracing::error!("Server failed: {e}");
        }
    });

    tracing::info!(
        port = state.server_port(),
        "Server running. Press Ctrl+C to stop."
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    shutdown::graceful_shutdown(&state).await;
    if let Err(e) = server_handle.await {
        tracing::warn!("Server task ended abnormally: {e}");
    }
    Ok(())
}
