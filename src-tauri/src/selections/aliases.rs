//! Alias configuration for selection fields.
//!
//! Which legacy spellings map onto which canonical selection field is a
//! configuration concern, not fixed logic:
//! - `default_aliases()` - Loads the alias sets compiled into the binary
//! - `load_aliases(path)` - Loads custom alias sets from a file path

use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// Default alias sets embedded in the binary at compile time.
/// These are loaded from `src-tauri/config/field_aliases.toml`.
const DEFAULT_ALIASES: &str = include_str!("../../config/field_aliases.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct AliasConfig {
    pub fields: Vec<FieldAliases>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldAliases {
    /// The field name normalization resolves to.
    pub canonical: String,
    /// Legacy spellings, in read-priority order after the canonical name.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl FieldAliases {
    /// First value present under the canonical name or any alias.
    pub fn pick<'a>(&self, obj: &'a serde_json::Map<String, Value>) -> Option<&'a Value> {
        if let Some(v) = obj.get(&self.canonical) {
            if !v.is_null() {
                return Some(v);
            }
        }
        for alias in &self.aliases {
            if let Some(v) = obj.get(alias) {
                if !v.is_null() {
                    return Some(v);
                }
            }
        }
        None
    }
}

impl AliasConfig {
    pub fn field(&self, canonical: &str) -> Option<&FieldAliases> {
        self.fields.iter().find(|f| f.canonical == canonical)
    }
}

/// Load alias sets from a TOML file at the given path.
pub fn load_aliases(path: &Path) -> Result<AliasConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AliasConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Get the default alias sets embedded in the binary.
///
/// # Panics
/// Panics if the embedded TOML is invalid (this would be a compile-time bug).
pub fn default_aliases() -> AliasConfig {
    toml::from_str(DEFAULT_ALIASES).expect("embedded field_aliases.toml must be valid TOML")
}
