#![recursion_limit = "256"]

pub mod api;
pub mod cache;
mod commands;
mod error;
pub mod history;
pub mod pantry;
pub mod recipe;
pub mod reconcile;
pub mod selections;
pub mod state;
pub mod steps;
pub mod storage;

pub use recipe::{Ingredient, RecipeRecord};
pub use reconcile::{merge_recipe, RecipeView, Reconciler};

pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let app_state = state::AppState::new(state::AppState::default_data_root())
        .expect("failed to initialize application state");

    tauri::Builder::default()
        .plugin(tauri_plugin_store::Builder::new().build())
        .manage(app_state)
        .invoke_handler(tauri::generate_handler![
            commands::config::get_preference,
            commands::config::set_preference,
            commands::config::get_api_base_url,
            commands::config::set_api_base_url,
            commands::config::get_site_url,
            commands::config::set_site_url,
            commands::identity::set_identity_session,
            commands::identity::get_identity_session,
            commands::identity::has_identity_token,
            commands::identity::sign_out,
            commands::recipes::generate_recipe,
            commands::recipes::open_recipe,
            commands::recipes::resolve_recipe,
            commands::recipes::suggest_ingredients,
            commands::recipes::pantry_groups,
            commands::recipes::share_link,
            commands::recipes::clear_recipe_cache,
            commands::history::load_history,
            commands::history::search_history,
            commands::steps::get_step_state,
            commands::steps::toggle_step,
            commands::steps::reopen_steps,
            commands::health::run_health_check,
        ])
        .setup(|app| {
            // Repoint the API client at a previously chosen backend.
            use tauri::Manager;
            use tauri_plugin_store::StoreExt;
            if let Ok(store) = app.store("preferences.json") {
                if let Some(base) = store
                    .get("api_base_url")
                    .and_then(|v| v.as_str().map(|s| s.to_string()))
                    .filter(|s| !s.is_empty())
                {
                    let state = app.state::<state::AppState>();
                    if let Err(e) = state.api.set_base_url(&base) {
                        tracing::warn!("Ignoring saved API base URL '{}': {}", base, e);
                    }
                }
            }
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
