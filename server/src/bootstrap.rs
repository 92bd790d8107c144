use std::path::PathBuf;

use recitation_db::Database;
use worker_core::WorkerEvent;

use crate::app::SharedState;
use crate::config::{AppConfig, SettingsManager};

/// Foundation init: .env, data dir, database, settings (fatal on error).
pub fn init_foundation() -> Result<(Database, AppConfig, PathBuf), anyhow::Error> {
    load_dotenv();
    let dir = data_dir();
    std::fs::create_dir_all(&dir)?;

    let db_path = dir.join("recitations.db");
    tracing::info!("Opening database at {}", db_path.display());
    let db = Database::open(&db_path)?;

    let sm = SettingsManager::new(db.clone());
    if let Err(e) = sm.migrate_from_env() {
        tracing::error!("Failed to migrate from env: {e}");
    }
    sm.initialize_defaults()?;

    let config = AppConfig::load(&sm)?;

    if let Ok(status) = sm.check_feature_status(config.window_opener_configured()) {
        if !status.warnings.is_empty() {
            tracing::warn!(
                "Missing settings: {:?}, warnings: {:?}",
                status.missing_settings,
                status.warnings
            );
        }
    }

    tracing::info!(
        "Settings loaded (bind={}, port={}, origin={})",
        config.bind_address,
        config.server_port,
        config.worker_origin
    );
    Ok((db, config, dir))
}

/// Run the worker lifecycle and re-arm persisted schedules (non-fatal).
pub fn start_worker(state: &SharedState) {
    if let Err(e) = state.dispatch(WorkerEvent::Install) {
        tracing::error!("Worker install failed: {e}");
    }
    if let Err(e) = state.dispatch(WorkerEvent::Activate) {
        tracing::warn!("Worker activated with errors: {e}");
    }
    match state.worker().restore_schedules() {
        Ok(0) => {}
        Ok(n) => tracing::info!("Re-armed {n} persisted schedules"),
        Err(e) => tracing::error!("Failed to restore schedules: {e}"),
    }
}

/// Determine the data directory for the application.
fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SACRED_RECITATIONS_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sacred-recitations")
}

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}
