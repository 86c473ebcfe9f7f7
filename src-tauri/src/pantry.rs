use serde::{Deserialize, Serialize};

/// Ingredient vocabulary for the generation form, grouped for display.
#[derive(Debug, Clone, Deserialize)]
pub struct PantryCatalog {
    groups: Vec<PantryGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PantryGroup {
    pub name: String,
    pub items: Vec<String>,
}

/// The catalog compiled into the binary.
pub fn default_catalog() -> PantryCatalog {
    toml::from_str(include_str!("../config/pantry.toml"))
        .expect("embedded pantry catalog must be valid TOML")
}

impl PantryCatalog {
    pub fn groups(&self) -> &[PantryGroup] {
        &self.groups
    }

    /// Suggestions for whatever the user is typing. Only the fragment after
    /// the last comma counts, matching is case-insensitive, prefix matches
    /// rank ahead of substring matches, and catalog order breaks ties.
    pub fn suggest(&self, input: &str, limit: usize) -> Vec<String> {
        let token = current_token(input);
        if token.is_empty() {
            return Vec::new();
        }

        let mut prefixed = Vec::new();
        let mut contained = Vec::new();
        for item in self.items() {
            let lower = item.to_lowercase();
            if lower.starts_with(&token) {
                prefixed.push(item.to_string());
            } else if lower.contains(&token) {
                contained.push(item.to_string());
            }
        }

        prefixed.extend(contained);
        prefixed.truncate(limit);
        prefixed
    }

    fn items(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|g| g.items.iter().map(String::as_str))
    }
}

/// The fragment being typed: everything after the last comma.
fn current_token(input: &str) -> String {
    input
        .rsplit(',')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

/// Split a free-form ingredient line into clean entries.
pub fn normalize_ingredients(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_loads() {
        let catalog = default_catalog();
        assert!(!catalog.groups().is_empty());
        assert!(catalog.groups().iter().all(|g| !g.items.is_empty()));
    }

    #[test]
    fn test_suggest_ranks_prefix_matches_first() {
        let catalog = default_catalog();
        let hits = catalog.suggest("chi", 10);

        // "chicken breast" (prefix) must come before "zucchini" (substring).
        let chicken = hits.iter().position(|h| h == "chicken breast");
        let zucchini = hits.iter().position(|h| h == "zucchini");
        assert!(chicken.is_some());
        assert!(zucchini.is_some());
        assert!(chicken < zucchini);
    }

    #[test]
    fn test_suggest_matches_fragment_after_last_comma() {
        let catalog = default_catalog();
        let hits = catalog.suggest("chicken breast, gar", 5);
        assert!(hits.contains(&"garlic".to_string()));
        assert!(!hits.iter().any(|h| h.contains("chicken")));
    }

    #[test]
    fn test_suggest_is_case_insensitive() {
        let catalog = default_catalog();
        assert!(catalog.suggest("TOM", 5).contains(&"tomato".to_string()));
    }

    #[test]
    fn test_suggest_caps_at_limit() {
        let catalog = default_catalog();
        assert_eq!(catalog.suggest("a", 3).len(), 3);
    }

    #[test]
    fn test_suggest_empty_fragment_yields_nothing() {
        let catalog = default_catalog();
        assert!(catalog.suggest("", 5).is_empty());
        assert!(catalog.suggest("chicken, ", 5).is_empty());
    }

    #[test]
    fn test_normalize_ingredients_splits_and_trims() {
        assert_eq!(
            normalize_ingredients(" chicken ,, rice,  , peas "),
            vec!["chicken", "rice", "peas"]
        );
        assert!(normalize_ingredients("  ,, ").is_empty());
    }
}
