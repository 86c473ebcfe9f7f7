use std::path::PathBuf;

use serde::Serialize;
use tauri::{AppHandle, Manager};
use tracing::{info, warn};

use crate::cache::RecipeCache;
use crate::error::SavorlyError;
use crate::state::AppState;

use super::identity;

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub api_base_url: String,
    pub data_dir_writable: bool,
    pub data_dir_path: Option<String>,
    pub identity_token_present: bool,
    pub stored_selection_count: usize,
    /// `None` when no cache database is configured or it cannot be opened.
    pub cached_recipe_count: Option<usize>,
}

async fn cached_recipe_count(path: PathBuf) -> Result<usize, SavorlyError> {
    tokio::task::spawn_blocking(move || RecipeCache::new(&path)?.count())
        .await
        .map_err(|e| SavorlyError::HealthCheck(format!("Cache task panicked: {}", e)))?
        .map_err(SavorlyError::HealthCheck)
}

#[tauri::command]
pub async fn run_health_check(app: AppHandle) -> Result<HealthReport, String> {
    info!("Running health check");
    let state = app.state::<AppState>();

    let data_dir_writable = state.store.durable();
    let data_dir_path = state
        .data_root
        .as_ref()
        .map(|p| p.to_string_lossy().to_string());
    info!(
        "Data directory writable: {} at {:?}",
        data_dir_writable, data_dir_path
    );

    let cached = match state.cache_path.clone() {
        Some(path) => match cached_recipe_count(path).await {
            Ok(count) => Some(count),
            Err(e) => {
                warn!("{}", e);
                None
            }
        },
        None => None,
    };

    Ok(HealthReport {
        api_base_url: state.api.base_url(),
        data_dir_writable,
        data_dir_path,
        identity_token_present: identity::token_present(),
        stored_selection_count: state.selections.count(),
        cached_recipe_count: cached,
    })
}
