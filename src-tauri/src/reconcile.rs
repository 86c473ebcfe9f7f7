use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{info, warn};

use crate::api::RecipeFetcher;
use crate::cache::RecipeCache;
use crate::recipe::RecipeRecord;
use crate::selections::{SelectionEntry, SelectionStore};

/// How long a fetched record stays servable offline.
const CACHE_TTL_DAYS: i64 = 30;

/// One recipe as the viewer should see it, with markers describing how
/// complete the reconciliation behind it was.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeView {
    #[serde(flatten)]
    pub record: RecipeRecord,
    /// A server record has been incorporated; until then the view is the
    /// navigation payload overlaid with stored selections.
    pub merged: bool,
    /// The live fetch failed; the record is as good as local data gets.
    pub fetch_failed: bool,
    /// The server portion came from the offline cache, not the network.
    pub from_cache: bool,
}

/// Merge the three sources for one recipe into a single record.
///
/// Selection fields resolve per field: a value carried by navigation state
/// wins, then a stored selection, then whatever the server reported, and a
/// field nobody has a value for stays absent. Content fields (title,
/// ingredients, instructions, nutrition) come from the server record when one
/// is present, with navigation filling anything the server left empty.
///
/// The function is pure and idempotent: feeding its output back in as
/// navigation state changes nothing.
pub fn merge_recipe(
    id: &str,
    nav: Option<&RecipeRecord>,
    stored: &SelectionEntry,
    server: Option<&RecipeRecord>,
) -> RecipeRecord {
    let mut record = match (server, nav) {
        (Some(server), _) => server.clone(),
        (None, Some(nav)) => nav.clone(),
        (None, None) => RecipeRecord::default(),
    };
    record.id = id.to_string();

    if let Some(nav) = nav {
        if record.recipe_name.trim().is_empty() {
            record.recipe_name = nav.recipe_name.clone();
        }
        if record.ingredients.is_empty() {
            record.ingredients = nav.ingredients.clone();
        }
        if record.instructions.is_empty() {
            record.instructions = nav.instructions.clone();
        }
        if record.nutritional_values.is_empty() {
            record.nutritional_values = nav.nutritional_values.clone();
        }
        if record.estimated_calories.is_none() {
            record.estimated_calories = nav.estimated_calories;
        }
        if record.created_at.is_none() {
            record.created_at = nav.created_at.clone();
        }
    }

    let nav_selections = nav.map(SelectionEntry::from_record).unwrap_or_default();
    let server_selections = server.map(SelectionEntry::from_record).unwrap_or_default();
    server_selections
        .merged_with(stored)
        .merged_with(&nav_selections)
        .apply_to(&mut record);

    record
}

/// The recipe the viewer is currently on, plus the record its navigation
/// carried. Set by [`Reconciler::open`], checked by [`Reconciler::resolve`]
/// so a slow fetch for a recipe the user already left never lands.
struct ActiveSubject {
    id: String,
    nav: Option<RecipeRecord>,
}

/// Reconciles what the viewer shows for a recipe: immediate partial view on
/// open, then a resolved view once the canonical record arrives.
pub struct Reconciler<F: RecipeFetcher> {
    fetcher: F,
    selections: Arc<SelectionStore>,
    cache_path: Option<PathBuf>,
    subject: Mutex<Option<ActiveSubject>>,
}

impl<F: RecipeFetcher> Reconciler<F> {
    pub fn new(fetcher: F, selections: Arc<SelectionStore>, cache_path: Option<PathBuf>) -> Self {
        Self {
            fetcher,
            selections,
            cache_path,
            subject: Mutex::new(None),
        }
    }

    /// Mark `id` as the recipe being shown and return the immediate view:
    /// navigation state overlaid with stored selections, no network involved.
    pub fn open(&self, id: &str, nav: Option<RecipeRecord>) -> RecipeView {
        let stored = self.selections.read(id);
        let record = merge_recipe(id, nav.as_ref(), &stored, None);
        *self.subject.lock().unwrap() = Some(ActiveSubject {
            id: id.to_string(),
            nav,
        });
        RecipeView {
            record,
            merged: false,
            fetch_failed: false,
            from_cache: false,
        }
    }

    /// Fetch the canonical record for `id`, merge it with local state, and
    /// persist the merged selections so the next visit starts from them.
    ///
    /// Returns `None` when `id` is no longer the open recipe, either before
    /// the fetch starts or by the time it lands; the stale result is
    /// discarded rather than painted over whatever the user moved on to.
    /// A failed fetch falls back to the offline cache, and failing that, the
    /// partial view comes back marked `fetch_failed`.
    pub async fn resolve(&self, id: &str) -> Option<RecipeView> {
        let nav = {
            let subject = self.subject.lock().unwrap();
            match subject.as_ref() {
                Some(active) if active.id == id => active.nav.clone(),
                _ => {
                    info!("Skipping resolve for recipe '{}', no longer open", id);
                    return None;
                }
            }
        };

        let (server, fetch_failed, from_cache) = match self.fetcher.fetch_recipe(id).await {
            Ok(record) => {
                self.cache_write(&record).await;
                (Some(record), false, false)
            }
            Err(e) => {
                warn!("Fetch failed for recipe '{}': {}", id, e);
                match self.cache_read(id).await {
                    Some(cached) => {
                        info!("Serving recipe '{}' from the offline cache", id);
                        (Some(cached), true, true)
                    }
                    None => (None, true, false),
                }
            }
        };

        {
            let subject = self.subject.lock().unwrap();
            if !matches!(subject.as_ref(), Some(active) if active.id == id) {
                info!("Discarding stale fetch result for recipe '{}'", id);
                return None;
            }
        }

        let stored = self.selections.read(id);
        let record = merge_recipe(id, nav.as_ref(), &stored, server.as_ref());
        self.selections
            .write(id, &SelectionEntry::from_record(&record));

        Some(RecipeView {
            merged: server.is_some(),
            fetch_failed,
            from_cache,
            record,
        })
    }

    async fn cache_write(&self, record: &RecipeRecord) {
        let Some(path) = self.cache_path.clone() else {
            return;
        };
        let record = record.clone();
        let result =
            tokio::task::spawn_blocking(move || RecipeCache::new(&path)?.put(&record, CACHE_TTL_DAYS))
                .await;
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Recipe cache write failed: {}", e),
            Err(e) => warn!("Recipe cache task panicked: {}", e),
        }
    }

    async fn cache_read(&self, id: &str) -> Option<RecipeRecord> {
        let path = self.cache_path.clone()?;
        let id = id.to_string();
        let result = tokio::task::spawn_blocking(move || RecipeCache::new(&path)?.get(&id)).await;
        match result {
            Ok(Ok(found)) => found,
            Ok(Err(e)) => {
                warn!("Recipe cache read failed: {}", e);
                None
            }
            Err(e) => {
                warn!("Recipe cache task panicked: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::selections::default_aliases;
    use crate::storage::LocalStore;
    use std::collections::HashMap;
    use std::future::Future;
    use tempfile::TempDir;

    struct StubFetcher {
        records: HashMap<String, RecipeRecord>,
    }

    impl StubFetcher {
        fn serving(records: Vec<RecipeRecord>) -> Self {
            Self {
                records: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
            }
        }

        fn failing() -> Self {
            Self {
                records: HashMap::new(),
            }
        }
    }

    impl RecipeFetcher for StubFetcher {
        fn fetch_recipe(
            &self,
            id: &str,
        ) -> impl Future<Output = Result<RecipeRecord, ApiError>> + Send {
            let result = self
                .records
                .get(id)
                .cloned()
                .ok_or_else(|| ApiError::Decode("no scripted response".to_string()));
            async move { result }
        }
    }

    fn selections() -> Arc<SelectionStore> {
        Arc::new(SelectionStore::new(
            Arc::new(LocalStore::in_memory()),
            default_aliases(),
        ))
    }

    fn server_record(id: &str) -> RecipeRecord {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "recipe_name": "Lemon Pasta",
            "ingredients": ["200g spaghetti", "1 lemon"],
            "instructions": ["Boil pasta.", "Zest lemon."],
            "selected_time": 20
        }))
        .unwrap()
    }

    fn nav_record(id: &str) -> RecipeRecord {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "recipe_name": "Lemon Pasta",
            "selected_time": 10
        }))
        .unwrap()
    }

    #[test]
    fn test_merge_prefers_navigation_over_stored_and_server() {
        let nav = nav_record("r1");
        let stored = SelectionEntry {
            selected_time: Some(15),
            ..Default::default()
        };
        let server = server_record("r1");

        let merged = merge_recipe("r1", Some(&nav), &stored, Some(&server));
        assert_eq!(merged.selected_time, Some(10));
    }

    #[test]
    fn test_merge_stored_wins_over_server_and_fills_navigation_gaps() {
        let nav = RecipeRecord::default();
        let stored = SelectionEntry {
            selected_servings: Some(4),
            ..Default::default()
        };
        let mut server = server_record("r1");
        server.selected_servings = Some(2);

        let merged = merge_recipe("r1", Some(&nav), &stored, Some(&server));
        assert_eq!(merged.selected_servings, Some(4));
        // Server still supplies what nobody chose locally.
        assert_eq!(merged.selected_time, Some(20));
    }

    #[test]
    fn test_merge_without_any_source_yields_bare_record() {
        let merged = merge_recipe("r9", None, &SelectionEntry::default(), None);
        assert_eq!(merged.id, "r9");
        assert_eq!(merged.title(), "Recipe");
        assert!(merged.selected_time.is_none());
        assert!(merged.ingredients.is_empty());
    }

    #[test]
    fn test_merge_is_idempotent() {
        let nav = nav_record("r1");
        let stored = SelectionEntry {
            selected_servings: Some(4),
            ..Default::default()
        };
        let server = server_record("r1");

        let once = merge_recipe("r1", Some(&nav), &stored, Some(&server));
        let twice = merge_recipe("r1", Some(&once), &stored, Some(&server));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_takes_content_from_server_and_backfills_from_navigation() {
        let mut nav = nav_record("r1");
        nav.instructions = vec!["Old step.".to_string()];
        nav.estimated_calories = Some(300.0);
        let mut server = server_record("r1");
        server.estimated_calories = None;

        let merged = merge_recipe("r1", Some(&nav), &SelectionEntry::default(), Some(&server));
        // Server content is canonical where present.
        assert_eq!(merged.instructions, vec!["Boil pasta.", "Zest lemon."]);
        // Navigation fills what the server left out.
        assert_eq!(merged.estimated_calories, Some(300.0));
    }

    #[test]
    fn test_open_overlays_stored_selections_without_network() {
        let selections = selections();
        selections.write(
            "r1",
            &SelectionEntry {
                selected_servings: Some(4),
                ..Default::default()
            },
        );
        let reconciler = Reconciler::new(StubFetcher::failing(), selections, None);

        let view = reconciler.open("r1", Some(nav_record("r1")));
        assert!(!view.merged);
        assert_eq!(view.record.selected_time, Some(10));
        assert_eq!(view.record.selected_servings, Some(4));
    }

    #[tokio::test]
    async fn test_resolve_merges_server_record_and_writes_back() {
        let selections = selections();
        let reconciler = Reconciler::new(
            StubFetcher::serving(vec![server_record("r1")]),
            selections.clone(),
            None,
        );

        reconciler.open("r1", Some(nav_record("r1")));
        let view = reconciler.resolve("r1").await.unwrap();

        assert!(view.merged);
        assert!(!view.fetch_failed);
        // The user's 10 survives the server's 20, whichever arrived first.
        assert_eq!(view.record.selected_time, Some(10));
        assert_eq!(view.record.instructions.len(), 2);
        // Merged selections are durable for the next visit.
        assert_eq!(selections.read("r1").selected_time, Some(10));
    }

    #[tokio::test]
    async fn test_resolve_discards_result_when_another_recipe_opened() {
        let selections = selections();
        let reconciler = Reconciler::new(
            StubFetcher::serving(vec![server_record("r1"), server_record("r2")]),
            selections,
            None,
        );

        reconciler.open("r1", None);
        reconciler.open("r2", None);

        assert!(reconciler.resolve("r1").await.is_none());
        assert!(reconciler.resolve("r2").await.is_some());
    }

    #[tokio::test]
    async fn test_resolve_without_open_is_skipped() {
        let reconciler = Reconciler::new(StubFetcher::failing(), selections(), None);
        assert!(reconciler.resolve("r1").await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_keeps_partial_view_when_fetch_fails() {
        let reconciler = Reconciler::new(StubFetcher::failing(), selections(), None);

        reconciler.open("r1", Some(nav_record("r1")));
        let view = reconciler.resolve("r1").await.unwrap();

        assert!(view.fetch_failed);
        assert!(!view.merged);
        assert!(!view.from_cache);
        assert_eq!(view.record.recipe_name, "Lemon Pasta");
        assert_eq!(view.record.selected_time, Some(10));
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_cached_record() {
        let dir = TempDir::new().unwrap();
        let cache_path = dir.path().join("recipes.db");
        RecipeCache::new(&cache_path)
            .unwrap()
            .put(&server_record("r1"), 30)
            .unwrap();

        let reconciler =
            Reconciler::new(StubFetcher::failing(), selections(), Some(cache_path));

        reconciler.open("r1", None);
        let view = reconciler.resolve("r1").await.unwrap();

        assert!(view.fetch_failed);
        assert!(view.from_cache);
        assert!(view.merged);
        assert_eq!(view.record.instructions.len(), 2);
    }

    #[tokio::test]
    async fn test_resolve_refreshes_cache_on_success() {
        let dir = TempDir::new().unwrap();
        let cache_path = dir.path().join("recipes.db");
        let reconciler = Reconciler::new(
            StubFetcher::serving(vec![server_record("r1")]),
            selections(),
            Some(cache_path.clone()),
        );

        reconciler.open("r1", None);
        reconciler.resolve("r1").await.unwrap();

        let cached = RecipeCache::new(&cache_path)
            .unwrap()
            .get("r1")
            .unwrap()
            .unwrap();
        assert_eq!(cached.recipe_name, "Lemon Pasta");
    }
}
