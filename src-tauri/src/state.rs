use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::info;

use crate::api::{ApiClient, DEFAULT_API_BASE};
use crate::history::HistoryAggregator;
use crate::pantry::{default_catalog, PantryCatalog};
use crate::reconcile::Reconciler;
use crate::selections::{default_aliases, SelectionStore};
use crate::steps::StepTracker;
use crate::storage::LocalStore;

/// Everything the command layer shares, managed once by the Tauri builder.
pub struct AppState {
    pub store: Arc<LocalStore>,
    pub selections: Arc<SelectionStore>,
    pub steps: StepTracker,
    pub history: Mutex<HistoryAggregator>,
    pub api: Arc<ApiClient>,
    pub reconciler: Reconciler<Arc<ApiClient>>,
    pub pantry: PantryCatalog,
    pub data_root: Option<PathBuf>,
    pub cache_path: Option<PathBuf>,
}

impl AppState {
    pub fn new(data_root: Option<PathBuf>) -> Result<Self, String> {
        let store = match &data_root {
            Some(root) => {
                info!("Using data directory {:?}", root);
                Arc::new(LocalStore::open(&root.join("storage")))
            }
            None => Arc::new(LocalStore::in_memory()),
        };
        let selections = Arc::new(SelectionStore::new(store.clone(), default_aliases()));
        let api = Arc::new(
            ApiClient::new(DEFAULT_API_BASE)
                .map_err(|e| format!("Failed to build API client: {}", e))?,
        );
        let cache_path = data_root.as_ref().map(|root| root.join("recipe-cache.db"));
        let reconciler = Reconciler::new(api.clone(), selections.clone(), cache_path.clone());

        Ok(Self {
            steps: StepTracker::new(store.clone()),
            history: Mutex::new(HistoryAggregator::new()),
            pantry: default_catalog(),
            data_root,
            cache_path,
            store,
            selections,
            api,
            reconciler,
        })
    }

    /// Platform data root for durable storage and the recipe cache.
    pub fn default_data_root() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("Savorly"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_state_wires_shared_store() {
        let dir = TempDir::new().unwrap();
        let state = AppState::new(Some(dir.path().to_path_buf())).unwrap();

        // Selections written through one handle are visible through the other.
        state.selections.write(
            "r1",
            &crate::selections::SelectionEntry {
                selected_time: Some(25),
                ..Default::default()
            },
        );
        assert!(state.store.get("selections:r1").is_some());
        assert!(state.store.durable());
        assert_eq!(
            state.cache_path.as_deref(),
            Some(dir.path().join("recipe-cache.db").as_path())
        );
    }

    #[test]
    fn test_state_without_data_root_is_session_only() {
        let state = AppState::new(None).unwrap();
        assert!(!state.store.durable());
        assert!(state.cache_path.is_none());
    }
}
