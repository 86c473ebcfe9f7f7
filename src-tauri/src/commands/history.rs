use tauri::{AppHandle, Manager};
use tracing::{info, warn};

use crate::history::{
    filter_entries, group_by_day, sort_entries, DayGroup, HistoryEntry, SortMode,
};
use crate::state::AppState;

use super::identity;

/// Load the user's server history into the session list. Re-fetches only
/// when `force` is set or nothing has been loaded yet; a failed fetch keeps
/// whatever this session already accumulated.
#[tauri::command]
pub async fn load_history(app: AppHandle, force: bool) -> Result<Vec<HistoryEntry>, String> {
    let state = app.state::<AppState>();
    {
        let history = state.history.lock().unwrap();
        if history.is_hydrated() && !force {
            return Ok(history.entries().to_vec());
        }
    }

    let user_key = identity::active_user_key(&app);
    info!("Loading history for '{}'", user_key);
    match state.api.history(&user_key).await {
        Ok(items) => {
            let mut history = state.history.lock().unwrap();
            history.hydrate(items, &state.selections, &chrono::Local);
            Ok(history.entries().to_vec())
        }
        Err(e) => {
            warn!("History fetch failed, keeping the session list: {}", e);
            Ok(state.history.lock().unwrap().entries().to_vec())
        }
    }
}

/// Filter, sort, and day-group the session history list for display.
#[tauri::command]
pub fn search_history(
    app: AppHandle,
    query: String,
    sort: SortMode,
) -> Result<Vec<DayGroup>, String> {
    let state = app.state::<AppState>();
    let history = state.history.lock().unwrap();
    let matched = filter_entries(&query, history.entries());
    let sorted = sort_entries(&matched, sort);
    Ok(group_by_day(&sorted, &chrono::Local))
}
