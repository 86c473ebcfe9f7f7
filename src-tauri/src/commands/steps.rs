use tauri::{AppHandle, Manager};

use crate::state::AppState;
use crate::steps::StepState;

/// Checklist state for a recipe.
#[tauri::command]
pub fn get_step_state(app: AppHandle, id: String, title: String) -> Result<StepState, String> {
    let state = app.state::<AppState>();
    Ok(state.steps.completed(&id, &title))
}

/// Toggle one 1-based step; completing the last one locks the checklist.
#[tauri::command]
pub fn toggle_step(
    app: AppHandle,
    id: String,
    title: String,
    step: u32,
    total: usize,
) -> Result<StepState, String> {
    let state = app.state::<AppState>();
    Ok(state.steps.toggle(&id, &title, step, total))
}

/// Unlock a completed checklist without clearing the checkmarks.
#[tauri::command]
pub fn reopen_steps(app: AppHandle, id: String, title: String) -> Result<StepState, String> {
    let state = app.state::<AppState>();
    Ok(state.steps.reopen(&id, &title))
}
