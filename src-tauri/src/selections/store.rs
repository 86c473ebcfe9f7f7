use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::recipe::types::{lenient_u32, RecipeRecord};
use crate::storage::LocalStore;

use super::aliases::AliasConfig;

const SELECTION_KEY_PREFIX: &str = "selections:";

/// The selections a user chose for one recipe.
///
/// Absent fields mean "never chosen", and stay absent through merges so a
/// later source cannot clobber a real choice with nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_servings: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_calories: Option<u32>,
}

impl SelectionEntry {
    pub fn is_empty(&self) -> bool {
        self.selected_time.is_none()
            && self.selected_servings.is_none()
            && self.selected_calories.is_none()
    }

    /// Pull recognized selection fields out of any JSON value, resolving
    /// aliases per the configuration. Unrecognized fields are ignored.
    pub fn from_value(value: &Value, aliases: &AliasConfig) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let field = |canonical: &str| {
            aliases
                .field(canonical)
                .and_then(|f| f.pick(obj))
                .and_then(lenient_u32)
        };

        Self {
            selected_time: field("selected_time"),
            selected_servings: field("selected_servings"),
            selected_calories: field("selected_calories"),
        }
    }

    /// The selections already carried on a recipe record.
    pub fn from_record(record: &RecipeRecord) -> Self {
        Self {
            selected_time: record.selected_time,
            selected_servings: record.selected_servings,
            selected_calories: record.selected_calories,
        }
    }

    /// Per-field merge where `newer` wins wherever it has a value.
    pub fn merged_with(&self, newer: &SelectionEntry) -> SelectionEntry {
        SelectionEntry {
            selected_time: newer.selected_time.or(self.selected_time),
            selected_servings: newer.selected_servings.or(self.selected_servings),
            selected_calories: newer.selected_calories.or(self.selected_calories),
        }
    }

    /// Stamp these selections onto a record.
    pub fn apply_to(&self, record: &mut RecipeRecord) {
        record.selected_time = self.selected_time;
        record.selected_servings = self.selected_servings;
        record.selected_calories = self.selected_calories;
    }

    /// The persisted form: canonical field plus every configured alias, so
    /// any historical reader finds the value under the spelling it knows.
    pub fn to_stored_value(&self, aliases: &AliasConfig) -> Value {
        let mut obj = serde_json::Map::new();
        let mut put = |canonical: &str, value: Option<u32>| {
            let Some(v) = value else { return };
            obj.insert(canonical.to_string(), Value::from(v));
            if let Some(field) = aliases.field(canonical) {
                for alias in &field.aliases {
                    obj.insert(alias.clone(), Value::from(v));
                }
            }
        };

        put("selected_time", self.selected_time);
        put("selected_servings", self.selected_servings);
        put("selected_calories", self.selected_calories);
        Value::Object(obj)
    }
}

/// Durable per-recipe selections, keyed `selections:{id}`.
///
/// Reads tolerate anything: a missing key, a corrupt entry, or an entry in a
/// legacy spelling all come back as (possibly empty) entries. Writes are
/// read-merge-write so a partial patch never drops fields chosen earlier.
pub struct SelectionStore {
    store: Arc<LocalStore>,
    aliases: AliasConfig,
}

impl SelectionStore {
    pub fn new(store: Arc<LocalStore>, aliases: AliasConfig) -> Self {
        Self { store, aliases }
    }

    fn key_for(id: &str) -> String {
        format!("{}{}", SELECTION_KEY_PREFIX, id)
    }

    pub fn aliases(&self) -> &AliasConfig {
        &self.aliases
    }

    /// Previously saved selections for `id`; empty if none or unreadable.
    pub fn read(&self, id: &str) -> SelectionEntry {
        if id.is_empty() {
            return SelectionEntry::default();
        }
        let Some(text) = self.store.get(&Self::key_for(id)) else {
            return SelectionEntry::default();
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => SelectionEntry::from_value(&value, &self.aliases),
            Err(e) => {
                warn!("Ignoring corrupt selection entry for '{}': {}", id, e);
                SelectionEntry::default()
            }
        }
    }

    /// Merge `patch` into the stored entry for `id` and persist the
    /// normalized result. No-op for an empty id or an empty patch;
    /// persistence failures are swallowed by the storage layer.
    pub fn write(&self, id: &str, patch: &SelectionEntry) {
        if id.is_empty() || patch.is_empty() {
            return;
        }
        let merged = self.read(id).merged_with(patch);
        let stored = merged.to_stored_value(&self.aliases);
        match serde_json::to_string(&stored) {
            Ok(text) => {
                self.store.set(&Self::key_for(id), &text);
            }
            Err(e) => warn!("Failed to serialize selections for '{}': {}", id, e),
        }
    }

    /// Like [`SelectionStore::write`], for a patch in raw JSON form where
    /// fields may arrive under any recognized alias.
    pub fn write_value(&self, id: &str, fields: &Value) {
        let patch = SelectionEntry::from_value(fields, &self.aliases);
        self.write(id, &patch);
    }

    /// Number of recipes with stored selections.
    pub fn count(&self) -> usize {
        self.store
            .keys()
            .iter()
            .filter(|k| k.starts_with(SELECTION_KEY_PREFIX))
            .count()
    }
}
