use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["window", "__TAURI__", "core"], catch)]
    async fn invoke(cmd: &str, args: JsValue) -> Result<JsValue, JsValue>;
}

/// Serialize invoke arguments as plain JS objects. The default serializer
/// emits ES Maps for map-typed fields, which do not survive the IPC JSON
/// serialization.
fn to_args<T: Serialize>(value: &T) -> Result<JsValue, String> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| e.to_string())
}

// -- Recipe types matching the backend structs --

/// One ingredient line: servers send plain strings or quantity/item pairs.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Ingredient {
    Text(String),
    Detailed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        quantity: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        item: Option<String>,
    },
}

impl Ingredient {
    pub fn display(&self) -> String {
        match self {
            Ingredient::Text(text) => text.clone(),
            Ingredient::Detailed { quantity, item } => format!(
                "{} {}",
                quantity.as_deref().unwrap_or(""),
                item.as_deref().unwrap_or("")
            )
            .trim()
            .to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RecipeRecord {
    pub id: String,
    pub recipe_name: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub nutritional_values: serde_json::Map<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_calories: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_servings: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_calories: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<serde_json::Value>,
}

impl RecipeRecord {
    pub fn title(&self) -> &str {
        if self.recipe_name.trim().is_empty() {
            "Recipe"
        } else {
            &self.recipe_name
        }
    }
}

/// The reconciled view-model for one recipe.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeView {
    #[serde(flatten)]
    pub record: RecipeRecord,
    pub merged: bool,
    pub fetch_failed: bool,
    pub from_cache: bool,
}

// -- History types --

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub record: RecipeRecord,
    pub display_date: Option<String>,
    pub display_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DayGroup {
    pub label: String,
    pub entries: Vec<HistoryEntry>,
}

// -- Step checklist state matching the backend struct --

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepState {
    pub done: Vec<u32>,
    pub locked: bool,
}

// -- Identity session matching the backend struct --

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// -- Health report matching the backend struct --

#[derive(Debug, Clone, Deserialize)]
pub struct HealthReport {
    pub api_base_url: String,
    pub data_dir_writable: bool,
    pub data_dir_path: Option<String>,
    pub identity_token_present: bool,
    pub stored_selection_count: usize,
    pub cached_recipe_count: Option<usize>,
}

// -- Pantry catalog group --

#[derive(Debug, Clone, Deserialize)]
pub struct PantryGroup {
    pub name: String,
    pub items: Vec<String>,
}

// -- Preference commands --

#[derive(Serialize)]
struct GetPreferenceArgs {
    key: String,
}

#[derive(Serialize)]
struct SetPreferenceArgs {
    key: String,
    value: String,
}

pub async fn get_preference(key: &str) -> Result<Option<String>, String> {
    let args = to_args(&GetPreferenceArgs {
        key: key.to_string(),
    })?;

    let result = invoke("get_preference", args)
        .await
        .map_err(|e| e.as_string().unwrap_or_else(|| "Unknown error".to_string()))?;

    serde_wasm_bindgen::from_value(result).map_err(|e| e.to_string())
}

pub async fn set_preference(key: &str, value: &str) -> Result<(), String> {
    let args = to_args(&SetPreferenceArgs {
        key: key.to_string(),
        value: value.to_string(),
    })?;

    invoke("set_preference", args)
        .await
        .map(|_| ())
        .map_err(|e| e.as_string().unwrap_or_else(|| "Unknown error".to_string()))
}

// -- API base URL and share-site commands --

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SetApiBaseUrlArgs {
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SetSiteUrlArgs {
    site_url: String,
}

pub async fn get_api_base_url() -> Result<String, String> {
    let args = to_args(&serde_json::json!({}))?;

    let result = invoke("get_api_base_url", args)
        .await
        .map_err(|e| e.as_string().unwrap_or_else(|| "Unknown error".to_string()))?;

    serde_wasm_bindgen::from_value(result).map_err(|e| e.to_string())
}

/// Repoint the backend API client. Returns the normalized URL in effect;
/// an empty input resets to the default backend.
pub async fn set_api_base_url(base_url: &str) -> Result<String, String> {
    let args = to_args(&SetApiBaseUrlArgs {
        base_url: base_url.to_string(),
    })?;

    let result = invoke("set_api_base_url", args)
        .await
        .map_err(|e| e.as_string().unwrap_or_else(|| "Unknown error".to_string()))?;

    serde_wasm_bindgen::from_value(result).map_err(|e| e.to_string())
}

pub async fn get_site_url() -> Result<String, String> {
    let args = to_args(&serde_json::json!({}))?;

    let result = invoke("get_site_url", args)
        .await
        .map_err(|e| e.as_string().unwrap_or_else(|| "Unknown error".to_string()))?;

    serde_wasm_bindgen::from_value(result).map_err(|e| e.to_string())
}

pub async fn set_site_url(site_url: &str) -> Result<String, String> {
    let args = to_args(&SetSiteUrlArgs {
        site_url: site_url.to_string(),
    })?;

    let result = invoke("set_site_url", args)
        .await
        .map_err(|e| e.as_string().unwrap_or_else(|| "Unknown error".to_string()))?;

    serde_wasm_bindgen::from_value(result).map_err(|e| e.to_string())
}

// -- Identity commands --

#[derive(Serialize)]
struct SetIdentitySessionArgs {
    token: String,
    session: UserSession,
}

/// Store the identity token in the keychain and the profile in preferences.
pub async fn set_identity_session(token: &str, session: &UserSession) -> Result<(), String> {
    let args = to_args(&SetIdentitySessionArgs {
        token: token.to_string(),
        session: session.clone(),
    })?;

    invoke("set_identity_session", args)
        .await
        .map(|_| ())
        .map_err(|e| e.as_string().unwrap_or_else(|| "Unknown error".to_string()))
}

pub async fn get_identity_session() -> Result<Option<UserSession>, String> {
    let args = to_args(&serde_json::json!({}))?;

    let result = invoke("get_identity_session", args)
        .await
        .map_err(|e| e.as_string().unwrap_or_else(|| "Unknown error".to_string()))?;

    serde_wasm_bindgen::from_value(result).map_err(|e| e.to_string())
}

pub async fn has_identity_token() -> Result<bool, String> {
    let args = to_args(&serde_json::json!({}))?;

    let result = invoke("has_identity_token", args)
        .await
        .map_err(|e| e.as_string().unwrap_or_else(|| "Unknown error".to_string()))?;

    serde_wasm_bindgen::from_value(result).map_err(|e| e.to_string())
}

/// Best-effort sign-out: the backend clears what it can and never fails.
pub async fn sign_out() -> Result<(), String> {
    let args = to_args(&serde_json::json!({}))?;

    invoke("sign_out", args)
        .await
        .map(|_| ())
        .map_err(|e| e.as_string().unwrap_or_else(|| "Unknown error".to_string()))
}

// -- Recipe generation and reconciliation commands --

/// Generation form matching the backend struct.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateForm {
    pub ingredients: Vec<String>,
    /// "ingredients" or "dish".
    pub mode: String,
    pub dish_name: Option<String>,
    /// "with" or "without".
    pub oven_option: String,
    pub time_option: Option<u32>,
    pub serving_option: Option<u32>,
    pub calorie_option: Option<u32>,
}

#[derive(Serialize)]
struct GenerateRecipeArgs {
    form: GenerateForm,
}

#[derive(Serialize)]
struct OpenRecipeArgs {
    id: String,
    nav: Option<RecipeRecord>,
}

#[derive(Serialize)]
struct ResolveRecipeArgs {
    id: String,
}

#[derive(Serialize)]
struct SuggestIngredientsArgs {
    input: String,
    limit: Option<usize>,
}

#[derive(Serialize)]
struct ShareLinkArgs {
    id: String,
}

/// Ask the backend to generate a recipe. On success the record has already
/// joined the session history with its selections persisted.
pub async fn generate_recipe(form: GenerateForm) -> Result<RecipeRecord, String> {
    let args = to_args(&GenerateRecipeArgs { form })?;

    let result = invoke("generate_recipe", args)
        .await
        .map_err(|e| e.as_string().unwrap_or_else(|| "Unknown error".to_string()))?;

    serde_wasm_bindgen::from_value(result).map_err(|e| e.to_string())
}

/// Open a recipe for viewing. Returns the partial view immediately; follow
/// with [`resolve_recipe`] for the server merge.
pub async fn open_recipe(id: &str, nav: Option<RecipeRecord>) -> Result<RecipeView, String> {
    let args = to_args(&OpenRecipeArgs {
        id: id.to_string(),
        nav,
    })?;

    let result = invoke("open_recipe", args)
        .await
        .map_err(|e| e.as_string().unwrap_or_else(|| "Unknown error".to_string()))?;

    serde_wasm_bindgen::from_value(result).map_err(|e| e.to_string())
}

/// The reconciled view once the server answers. `None` means another recipe
/// was opened while the fetch ran and this result was discarded.
pub async fn resolve_recipe(id: &str) -> Result<Option<RecipeView>, String> {
    let args = to_args(&ResolveRecipeArgs { id: id.to_string() })?;

    let result = invoke("resolve_recipe", args)
        .await
        .map_err(|e| e.as_string().unwrap_or_else(|| "Unknown error".to_string()))?;

    serde_wasm_bindgen::from_value(result).map_err(|e| e.to_string())
}

/// Typeahead suggestions for the fragment after the last comma.
pub async fn suggest_ingredients(input: &str, limit: Option<usize>) -> Result<Vec<String>, String> {
    let args = to_args(&SuggestIngredientsArgs {
        input: input.to_string(),
        limit,
    })?;

    let result = invoke("suggest_ingredients", args)
        .await
        .map_err(|e| e.as_string().unwrap_or_else(|| "Unknown error".to_string()))?;

    serde_wasm_bindgen::from_value(result).map_err(|e| e.to_string())
}

pub async fn pantry_groups() -> Result<Vec<PantryGroup>, String> {
    let args = to_args(&serde_json::json!({}))?;

    let result = invoke("pantry_groups", args)
        .await
        .map_err(|e| e.as_string().unwrap_or_else(|| "Unknown error".to_string()))?;

    serde_wasm_bindgen::from_value(result).map_err(|e| e.to_string())
}

/// Absolute link for sharing a recipe on the public site.
pub async fn share_link(id: &str) -> Result<String, String> {
    let args = to_args(&ShareLinkArgs { id: id.to_string() })?;

    let result = invoke("share_link", args)
        .await
        .map_err(|e| e.as_string().unwrap_or_else(|| "Unknown error".to_string()))?;

    serde_wasm_bindgen::from_value(result).map_err(|e| e.to_string())
}

// -- History commands --

#[derive(Serialize)]
struct LoadHistoryArgs {
    force: bool,
}

#[derive(Serialize)]
struct SearchHistoryArgs {
    query: String,
    sort: String,
}

/// Load the session history, fetching from the server when not yet hydrated
/// (or when `force` is set). Falls back to the current session list offline.
pub async fn load_history(force: bool) -> Result<Vec<HistoryEntry>, String> {
    let args = to_args(&LoadHistoryArgs { force })?;

    let result = invoke("load_history", args)
        .await
        .map_err(|e| e.as_string().unwrap_or_else(|| "Unknown error".to_string()))?;

    serde_wasm_bindgen::from_value(result).map_err(|e| e.to_string())
}

/// Filter, sort ("newest" or "name"), and group the session history by day.
pub async fn search_history(query: &str, sort: &str) -> Result<Vec<DayGroup>, String> {
    let args = to_args(&SearchHistoryArgs {
        query: query.to_string(),
        sort: sort.to_string(),
    })?;

    let result = invoke("search_history", args)
        .await
        .map_err(|e| e.as_string().unwrap_or_else(|| "Unknown error".to_string()))?;

    serde_wasm_bindgen::from_value(result).map_err(|e| e.to_string())
}

// -- Step checklist commands --

#[derive(Serialize)]
struct StepStateArgs {
    id: String,
    title: String,
}

#[derive(Serialize)]
struct ToggleStepArgs {
    id: String,
    title: String,
    step: u32,
    total: usize,
}

pub async fn get_step_state(id: &str, title: &str) -> Result<StepState, String> {
    let args = to_args(&StepStateArgs {
        id: id.to_string(),
        title: title.to_string(),
    })?;

    let result = invoke("get_step_state", args)
        .await
        .map_err(|e| e.as_string().unwrap_or_else(|| "Unknown error".to_string()))?;

    serde_wasm_bindgen::from_value(result).map_err(|e| e.to_string())
}

/// Toggle one 1-based step. Completing the last open step locks the
/// checklist; toggles on a locked checklist are ignored by the backend.
pub async fn toggle_step(id: &str, title: &str, step: u32, total: usize) -> Result<StepState, String> {
    let args = to_args(&ToggleStepArgs {
        id: id.to_string(),
        title: title.to_string(),
        step,
        total,
    })?;

    let result = invoke("toggle_step", args)
        .await
        .map_err(|e| e.as_string().unwrap_or_else(|| "Unknown error".to_string()))?;

    serde_wasm_bindgen::from_value(result).map_err(|e| e.to_string())
}

/// Unlock a completed checklist without clearing the checkmarks.
pub async fn reopen_steps(id: &str, title: &str) -> Result<StepState, String> {
    let args = to_args(&StepStateArgs {
        id: id.to_string(),
        title: title.to_string(),
    })?;

    let result = invoke("reopen_steps", args)
        .await
        .map_err(|e| e.as_string().unwrap_or_else(|| "Unknown error".to_string()))?;

    serde_wasm_bindgen::from_value(result).map_err(|e| e.to_string())
}

// -- Health check --

pub async fn run_health_check() -> Result<HealthReport, String> {
    let args = to_args(&serde_json::json!({}))?;

    let result = invoke("run_health_check", args)
        .await
        .map_err(|e| e.as_string().unwrap_or_else(|| "Unknown error".to_string()))?;

    serde_wasm_bindgen::from_value(result).map_err(|e| e.to_string())
}
