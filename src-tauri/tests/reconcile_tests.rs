use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use savorly_tauri::api::{ApiError, RecipeFetcher};
use savorly_tauri::recipe::parse_recipe_payload;
use savorly_tauri::selections::{default_aliases, SelectionEntry, SelectionStore};
use savorly_tauri::storage::LocalStore;
use savorly_tauri::{RecipeRecord, Reconciler};
use tempfile::TempDir;

fn fixture(name: &str) -> serde_json::Value {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    serde_json::from_str(&std::fs::read_to_string(&path).expect("Failed to read fixture"))
        .expect("Fixture is not valid JSON")
}

struct ScriptedFetcher {
    records: HashMap<String, RecipeRecord>,
}

impl ScriptedFetcher {
    fn serving(records: Vec<RecipeRecord>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }

    fn offline() -> Self {
        Self {
            records: HashMap::new(),
        }
    }
}

impl RecipeFetcher for ScriptedFetcher {
    fn fetch_recipe(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<RecipeRecord, ApiError>> + Send {
        let result = self
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::Decode("offline".to_string()));
        async move { result }
    }
}

fn disk_selections(dir: &TempDir) -> Arc<SelectionStore> {
    Arc::new(SelectionStore::new(
        Arc::new(LocalStore::open(&dir.path().join("storage"))),
        default_aliases(),
    ))
}

#[tokio::test]
async fn test_selection_precedence_survives_full_flow() {
    let dir = TempDir::new().unwrap();
    let selections = disk_selections(&dir);
    selections.write(
        "7012",
        &SelectionEntry {
            selected_servings: Some(4),
            ..Default::default()
        },
    );

    let server: RecipeRecord = parse_recipe_payload(&fixture("server_recipe.json"));
    assert_eq!(server.id, "7012", "numeric server ids read as strings");

    let nav = RecipeRecord {
        id: "7012".to_string(),
        selected_time: Some(10),
        ..Default::default()
    };

    let reconciler = Reconciler::new(
        ScriptedFetcher::serving(vec![server]),
        selections.clone(),
        None,
    );

    // Open renders before any network: navigation plus stored selections.
    let partial = reconciler.open("7012", Some(nav));
    assert!(!partial.merged);
    assert_eq!(partial.record.selected_time, Some(10));
    assert_eq!(partial.record.selected_servings, Some(4));
    assert!(partial.record.instructions.is_empty());

    let view = reconciler
        .resolve("7012")
        .await
        .expect("subject unchanged, result must land");
    assert!(view.merged);
    assert_eq!(view.record.recipe_name, "Miso Glazed Salmon");
    assert_eq!(view.record.instructions.len(), 4);
    // Per field: navigation's 10 beats the server's 25, the stored 4 fills
    // servings, and server-only fields pass through.
    assert_eq!(view.record.selected_time, Some(10));
    assert_eq!(view.record.selected_servings, Some(4));
    assert_eq!(view.record.estimated_calories, Some(520.0));

    // The merged selections are durable: a fresh store over the same
    // directory sees them.
    let reopened = SelectionStore::new(
        Arc::new(LocalStore::open(&dir.path().join("storage"))),
        default_aliases(),
    );
    let saved = reopened.read("7012");
    assert_eq!(saved.selected_time, Some(10));
    assert_eq!(saved.selected_servings, Some(4));
}

#[tokio::test]
async fn test_resolved_recipe_survives_going_offline() {
    let dir = TempDir::new().unwrap();
    let cache_path = dir.path().join("recipe-cache.db");
    let server = parse_recipe_payload(&fixture("server_recipe.json"));

    let online = Reconciler::new(
        ScriptedFetcher::serving(vec![server]),
        disk_selections(&dir),
        Some(cache_path.clone()),
    );
    online.open("7012", None);
    online
        .resolve("7012")
        .await
        .expect("resolve while online");

    // Same machine later, no network.
    let offline = Reconciler::new(
        ScriptedFetcher::offline(),
        disk_selections(&dir),
        Some(cache_path),
    );
    offline.open("7012", None);
    let view = offline
        .resolve("7012")
        .await
        .expect("subject unchanged, result must land");

    assert!(view.fetch_failed);
    assert!(view.from_cache);
    assert_eq!(view.record.recipe_name, "Miso Glazed Salmon");
    assert_eq!(view.record.ingredients.len(), 5);
}

#[tokio::test]
async fn test_stale_resolution_is_discarded_and_leaves_no_trace() {
    let dir = TempDir::new().unwrap();
    let selections = disk_selections(&dir);
    let server = parse_recipe_payload(&fixture("server_recipe.json"));

    let reconciler = Reconciler::new(
        ScriptedFetcher::serving(vec![server]),
        selections.clone(),
        None,
    );
    reconciler.open("7012", None);
    reconciler.open("another", None);

    assert!(reconciler.resolve("7012").await.is_none());
    // The discarded merge must not have written selections either.
    assert!(selections.read("7012").is_empty());
}

#[tokio::test]
async fn test_fenced_generation_payload_renders_before_any_fetch() {
    let payload = fixture("generate_response.json");
    let record = parse_recipe_payload(&payload["response"]);
    assert_eq!(record.recipe_name, "Charred Corn Salad");
    assert_eq!(record.ingredients.len(), 3);

    let dir = TempDir::new().unwrap();
    let reconciler = Reconciler::new(ScriptedFetcher::offline(), disk_selections(&dir), None);
    let view = reconciler.open("local-1749888000000-88aa00ff", Some(record));

    assert_eq!(view.record.recipe_name, "Charred Corn Salad");
    assert_eq!(view.record.id, "local-1749888000000-88aa00ff");
    assert!(!view.merged);
}
