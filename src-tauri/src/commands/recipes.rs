use serde::Deserialize;
use tauri::{AppHandle, Manager};
use tracing::info;
use url::Url;

use crate::api::GenerateRequest;
use crate::pantry::{normalize_ingredients, PantryGroup};
use crate::recipe::RecipeRecord;
use crate::reconcile::RecipeView;
use crate::state::AppState;

use super::{config, identity};

/// What the generation form submits; the signed-in user is attached here,
/// not chosen by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateForm {
    pub ingredients: Vec<String>,
    /// "ingredients" or "dish".
    pub mode: String,
    #[serde(default)]
    pub dish_name: Option<String>,
    /// "with" or "without".
    pub oven_option: String,
    #[serde(default)]
    pub time_option: Option<u32>,
    #[serde(default)]
    pub serving_option: Option<u32>,
    #[serde(default)]
    pub calorie_option: Option<u32>,
}

/// Ask the backend for a recipe. On success the record joins the session
/// history list with its selections persisted; on failure the form shows the
/// error and the user resubmits.
#[tauri::command]
pub async fn generate_recipe(app: AppHandle, form: GenerateForm) -> Result<RecipeRecord, String> {
    // Clients usually pre-split the list, but entries can still arrive as
    // comma-joined lines with stray whitespace.
    let ingredients: Vec<String> = form
        .ingredients
        .iter()
        .flat_map(|entry| normalize_ingredients(entry))
        .collect();

    info!(
        "Generating recipe ({} mode, {} ingredients)",
        form.mode,
        ingredients.len()
    );

    let request = GenerateRequest {
        ingredients,
        mode: form.mode,
        dish_name: form.dish_name,
        oven_option: form.oven_option,
        time_option: form.time_option,
        serving_option: form.serving_option,
        calorie_option: form.calorie_option,
        user_id: identity::active_user_key(&app),
    };

    let state = app.state::<AppState>();
    let record = state
        .api
        .generate(&request)
        .await
        .map_err(|e| e.to_string())?;

    state
        .history
        .lock()
        .unwrap()
        .add(record.clone(), &state.selections, &chrono::Local);
    Ok(record)
}

/// Immediate view for the recipe page: the navigation payload overlaid with
/// stored selections. No network involved.
#[tauri::command]
pub fn open_recipe(
    app: AppHandle,
    id: String,
    nav: Option<RecipeRecord>,
) -> Result<RecipeView, String> {
    let state = app.state::<AppState>();
    Ok(state.reconciler.open(&id, nav))
}

/// The reconciled view once the server answers. `None` means the user moved
/// on to another recipe while the fetch ran and the result was discarded.
#[tauri::command]
pub async fn resolve_recipe(app: AppHandle, id: String) -> Result<Option<RecipeView>, String> {
    let state = app.state::<AppState>();
    Ok(state.reconciler.resolve(&id).await)
}

/// Typeahead suggestions for the ingredient input.
#[tauri::command]
pub fn suggest_ingredients(
    app: AppHandle,
    input: String,
    limit: Option<usize>,
) -> Result<Vec<String>, String> {
    let state = app.state::<AppState>();
    Ok(state.pantry.suggest(&input, limit.unwrap_or(8)))
}

/// The grouped pantry catalog, for the quick-add section of the form.
#[tauri::command]
pub fn pantry_groups(app: AppHandle) -> Result<Vec<PantryGroup>, String> {
    let state = app.state::<AppState>();
    Ok(state.pantry.groups().to_vec())
}

/// Clear expired entries from the offline recipe cache.
/// Returns the number of entries removed.
#[tauri::command]
pub async fn clear_recipe_cache(app: AppHandle) -> Result<usize, String> {
    info!("clear_recipe_cache called");

    let state = app.state::<AppState>();
    let Some(path) = state.cache_path.clone() else {
        return Ok(0);
    };
    tokio::task::spawn_blocking(move || crate::cache::RecipeCache::new(&path)?.clear_expired())
        .await
        .map_err(|e| format!("Cache maintenance task failed: {}", e))?
}

/// Absolute link for sharing a recipe on the public site.
#[tauri::command]
pub fn share_link(app: AppHandle, id: String) -> Result<String, String> {
    let site = config::site_url(&app).map_err(String::from)?;
    let mut url =
        Url::parse(&site).map_err(|e| format!("Site URL '{}' is invalid: {}", site, e))?;
    url.path_segments_mut()
        .map_err(|_| format!("Site URL '{}' cannot carry a path", site))?
        .pop_if_empty()
        .push("recipe")
        .push(&id);
    Ok(url.to_string())
}
