use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::storage::{LocalStore, StorageMedium};

const STEP_KEY_PREFIX: &str = "doneSteps:";

/// Completion state for one recipe's instruction checklist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepState {
    /// 1-based indices of completed steps, ascending.
    pub done: Vec<u32>,
    /// Set when every step was completed. Toggles are ignored while locked;
    /// only an explicit reopen clears it.
    pub locked: bool,
}

impl StepState {
    pub fn completion_percent(&self, total: usize) -> u8 {
        if total == 0 {
            0
        } else {
            ((self.done.len() * 100) as f64 / total as f64).round() as u8
        }
    }
}

/// Session-scoped checklist state, keyed `doneSteps:{id}`.
///
/// Earlier versions keyed by recipe title, which collides whenever two
/// generations share a name; a record found under the title key is migrated
/// to the id key on first read. Records with no id at all still fall back to
/// the title key. Everything lives in the session medium and is gone when
/// the app exits.
pub struct StepTracker {
    store: Arc<LocalStore>,
}

impl StepTracker {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    fn key_for(name: &str) -> String {
        format!("{}{}", STEP_KEY_PREFIX, name)
    }

    /// Current state for a recipe.
    pub fn completed(&self, id: &str, title: &str) -> StepState {
        let (_, state) = self.resolve(id, title);
        state
    }

    /// Toggle a 1-based step. Out-of-range steps and toggles on a locked
    /// state are no-ops; completing the final step locks the state.
    pub fn toggle(&self, id: &str, title: &str, step: u32, total: usize) -> StepState {
        let (key, mut state) = self.resolve(id, title);
        if state.locked {
            return state;
        }
        if step == 0 || step as usize > total {
            return state;
        }

        match state.done.iter().position(|s| *s == step) {
            Some(pos) => {
                state.done.remove(pos);
            }
            None => {
                state.done.push(step);
                state.done.sort_unstable();
            }
        }
        if total > 0 && state.done.len() == total {
            state.locked = true;
        }

        self.persist(&key, &state);
        state
    }

    /// Clear the lock without touching progress.
    pub fn reopen(&self, id: &str, title: &str) -> StepState {
        let (key, mut state) = self.resolve(id, title);
        if state.locked {
            state.locked = false;
            self.persist(&key, &state);
        }
        state
    }

    /// Resolve the storage key for a recipe, migrating a legacy title-keyed
    /// record to the id key when one exists.
    fn resolve(&self, id: &str, title: &str) -> (String, StepState) {
        if id.is_empty() {
            let key = Self::key_for(title);
            let state = self.load(&key);
            return (key, state);
        }

        let key = Self::key_for(id);
        if self.store.session().get(&key).is_none() && !title.is_empty() {
            let legacy_key = Self::key_for(title);
            if let Some(text) = self.store.session().get(&legacy_key) {
                self.store.session().set(&key, &text);
                self.store.session().remove(&legacy_key);
                info!("Migrated step completion for '{}' to its id key", title);
            }
        }

        let state = self.load(&key);
        (key, state)
    }

    fn load(&self, key: &str) -> StepState {
        let Some(text) = self.store.session().get(key) else {
            return StepState::default();
        };
        match serde_json::from_str::<Value>(&text) {
            // Older records stored the bare index list.
            Ok(Value::Array(_)) => {
                let done = serde_json::from_str::<Vec<u32>>(&text).unwrap_or_default();
                StepState {
                    done,
                    locked: false,
                }
            }
            Ok(value) => serde_json::from_value(value).unwrap_or_default(),
            Err(e) => {
                warn!("Ignoring corrupt step state under '{}': {}", key, e);
                StepState::default()
            }
        }
    }

    fn persist(&self, key: &str, state: &StepState) {
        match serde_json::to_string(state) {
            Ok(text) => {
                self.store.session().set(key, &text);
            }
            Err(e) => warn!("Failed to serialize step state for '{}': {}", key, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> StepTracker {
        StepTracker::new(Arc::new(LocalStore::in_memory()))
    }

    #[test]
    fn test_toggle_on_and_off() {
        let t = tracker();

        let state = t.toggle("r1", "Pasta", 2, 5);
        assert_eq!(state.done, vec![2]);

        let state = t.toggle("r1", "Pasta", 2, 5);
        assert!(state.done.is_empty());
    }

    #[test]
    fn test_state_survives_reread() {
        let t = tracker();
        t.toggle("r1", "Pasta", 3, 5);
        t.toggle("r1", "Pasta", 1, 5);

        let state = t.completed("r1", "Pasta");
        assert_eq!(state.done, vec![1, 3]);
    }

    #[test]
    fn test_completing_all_steps_locks() {
        let t = tracker();
        t.toggle("r1", "Pasta", 1, 3);
        t.toggle("r1", "Pasta", 2, 3);
        let state = t.toggle("r1", "Pasta", 3, 3);

        assert!(state.locked);
        assert_eq!(state.completion_percent(3), 100);

        // Locked: further toggles leave the set unchanged.
        let state = t.toggle("r1", "Pasta", 2, 3);
        assert_eq!(state.done, vec![1, 2, 3]);
        assert!(state.locked);
    }

    #[test]
    fn test_reopen_unlocks_but_keeps_progress() {
        let t = tracker();
        for step in 1..=3 {
            t.toggle("r1", "Pasta", step, 3);
        }
        let state = t.reopen("r1", "Pasta");
        assert!(!state.locked);
        assert_eq!(state.done, vec![1, 2, 3]);

        let state = t.toggle("r1", "Pasta", 2, 3);
        assert_eq!(state.done, vec![1, 3]);
    }

    #[test]
    fn test_out_of_range_steps_ignored() {
        let t = tracker();
        let state = t.toggle("r1", "Pasta", 0, 3);
        assert!(state.done.is_empty());
        let state = t.toggle("r1", "Pasta", 4, 3);
        assert!(state.done.is_empty());
    }

    #[test]
    fn test_title_keyed_record_migrates_to_id() {
        let t = tracker();
        // A record left behind by a title-keyed version.
        t.store
            .session()
            .set("doneSteps:Pasta", "{\"done\":[1,2],\"locked\":false}");

        let state = t.completed("r1", "Pasta");
        assert_eq!(state.done, vec![1, 2]);
        // Migrated: the id key now owns the record.
        assert!(t.store.session().get("doneSteps:r1").is_some());
        assert!(t.store.session().get("doneSteps:Pasta").is_none());
    }

    #[test]
    fn test_legacy_bare_index_list_accepted() {
        let t = tracker();
        t.store.session().set("doneSteps:r1", "[3,1]");

        let state = t.completed("r1", "Pasta");
        assert_eq!(state.done, vec![3, 1]);
        assert!(!state.locked);
    }

    #[test]
    fn test_idless_record_uses_title_key() {
        let t = tracker();
        t.toggle("", "Mystery Dish", 1, 2);
        assert!(t.store.session().get("doneSteps:Mystery Dish").is_some());
    }

    #[test]
    fn test_corrupt_state_reads_as_empty() {
        let t = tracker();
        t.store.session().set("doneSteps:r1", "{{{nope");
        assert!(t.completed("r1", "Pasta").done.is_empty());
    }

    #[test]
    fn test_completion_percent_rounds() {
        let state = StepState {
            done: vec![1],
            locked: false,
        };
        assert_eq!(state.completion_percent(3), 33);
        assert_eq!(StepState::default().completion_percent(0), 0);
    }
}
