use tauri::{AppHandle, Manager};
use tauri_plugin_store::StoreExt;
use tracing::{info, warn};

use crate::api::DEFAULT_API_BASE;
use crate::error::SavorlyError;
use crate::state::AppState;

/// Public site recipes are shared from.
pub const DEFAULT_SITE_URL: &str = "https://www.savorly.app";

/// Read one string preference.
pub(crate) fn preference(app: &AppHandle, key: &str) -> Result<Option<String>, SavorlyError> {
    let store = app.store("preferences.json").map_err(|e| {
        warn!("Failed to open preferences store: {}", e);
        SavorlyError::Config(e.to_string())
    })?;
    Ok(store.get(key).and_then(|v| v.as_str().map(|s| s.to_string())))
}

/// Write one string preference and persist the store.
pub(crate) fn save_preference(
    app: &AppHandle,
    key: &str,
    value: &str,
) -> Result<(), SavorlyError> {
    let store = app.store("preferences.json").map_err(|e| {
        warn!("Failed to open preferences store: {}", e);
        SavorlyError::Config(e.to_string())
    })?;
    store.set(key, serde_json::json!(value));
    store.save().map_err(|e| {
        warn!("Failed to save preferences: {}", e);
        SavorlyError::Config(e.to_string())
    })
}

/// Drop one preference and persist the store.
pub(crate) fn remove_preference(app: &AppHandle, key: &str) -> Result<(), SavorlyError> {
    let store = app.store("preferences.json").map_err(|e| {
        warn!("Failed to open preferences store: {}", e);
        SavorlyError::Config(e.to_string())
    })?;
    store.delete(key);
    store.save().map_err(|e| {
        warn!("Failed to save preferences: {}", e);
        SavorlyError::Config(e.to_string())
    })
}

/// The site URL share links are built against.
pub(crate) fn site_url(app: &AppHandle) -> Result<String, SavorlyError> {
    Ok(preference(app, "site_url")?
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SITE_URL.to_string()))
}

#[tauri::command]
pub fn get_preference(app: AppHandle, key: &str) -> Result<Option<String>, String> {
    info!("Getting preference: {}", key);
    preference(&app, key).map_err(String::from)
}

#[tauri::command]
pub fn set_preference(app: AppHandle, key: &str, value: &str) -> Result<(), String> {
    info!("Setting preference: {} = {}", key, value);
    save_preference(&app, key, value).map_err(String::from)
}

#[tauri::command]
pub fn get_api_base_url(app: AppHandle) -> Result<String, String> {
    let state = app.state::<AppState>();
    Ok(state.api.base_url())
}

/// Repoint the API client and remember the choice. An empty value resets to
/// the default backend. Returns the normalized URL actually in effect.
#[tauri::command]
pub fn set_api_base_url(app: AppHandle, base_url: &str) -> Result<String, String> {
    let target = if base_url.trim().is_empty() {
        DEFAULT_API_BASE
    } else {
        base_url.trim()
    };
    info!("Pointing API client at {}", target);

    let state = app.state::<AppState>();
    state.api.set_base_url(target).map_err(|e| e.to_string())?;
    save_preference(&app, "api_base_url", target).map_err(String::from)?;
    Ok(state.api.base_url())
}

#[tauri::command]
pub fn get_site_url(app: AppHandle) -> Result<String, String> {
    site_url(&app).map_err(String::from)
}

/// Remember the site share links point at. An empty value resets to the
/// default site.
#[tauri::command]
pub fn set_site_url(app: AppHandle, site_url: &str) -> Result<String, String> {
    let target = site_url.trim();
    info!("Setting site URL: {}", target);
    if target.is_empty() {
        remove_preference(&app, "site_url").map_err(String::from)?;
        return Ok(DEFAULT_SITE_URL.to_string());
    }
    save_preference(&app, "site_url", target).map_err(String::from)?;
    Ok(target.to_string())
}
