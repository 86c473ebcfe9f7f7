use serde_json::Value;

use super::types::RecipeRecord;

/// Parse a generation payload into a [`RecipeRecord`], whatever its shape.
///
/// Generation backends answer with a JSON object on good days, and on bad
/// days with fenced JSON in a string, double-encoded JSON, or free text.
/// This is a total function: structured payloads deserialize leniently,
/// text payloads go through fence and quote stripping plus a JSON retry,
/// and the last resort is a title-only record.
pub fn parse_recipe_payload(payload: &Value) -> RecipeRecord {
    match payload {
        Value::Object(_) => record_from_json(payload),
        Value::Array(items) => match items.first() {
            Some(first) => parse_recipe_payload(first),
            None => title_only("Recipe"),
        },
        Value::String(text) => parse_recipe_text(text),
        _ => title_only("Recipe"),
    }
}

/// Parse a payload already known to be text.
pub fn parse_recipe_text(text: &str) -> RecipeRecord {
    let stripped = strip_markdown_fences(text);
    let unquoted = strip_outer_quotes(&stripped);

    if let Ok(value) = serde_json::from_str::<Value>(unquoted) {
        match value {
            Value::Object(_) | Value::Array(_) => return parse_recipe_payload(&value),
            // A bare JSON scalar carries no structure; fall through to the
            // textual scan on the unquoted form.
            _ => {}
        }
    }

    if let Some(name) = scan_recipe_name(unquoted) {
        return title_only(&name);
    }

    let first_line = unquoted
        .lines()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.replace(['{', '}', '"'], " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .unwrap_or_else(|| "Recipe".to_string());

    title_only(&first_line)
}

fn record_from_json(value: &Value) -> RecipeRecord {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

fn title_only(name: &str) -> RecipeRecord {
    RecipeRecord {
        recipe_name: name.to_string(),
        ..Default::default()
    }
}

/// Strip markdown code fences if present.
/// Some backends wrap JSON in ```json ... ``` despite being asked not to.
fn strip_markdown_fences(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        // Remove opening fence (with optional language tag)
        let after_open = if let Some(pos) = trimmed.find('\n') {
            &trimmed[pos + 1..]
        } else {
            trimmed
        };
        // Remove closing fence
        let cleaned = after_open.trim_end();
        if cleaned.ends_with("```") {
            cleaned[..cleaned.len() - 3].trim().to_string()
        } else {
            cleaned.to_string()
        }
    } else {
        trimmed.to_string()
    }
}

/// Strip one layer of surrounding quotes from double-encoded payloads.
fn strip_outer_quotes(text: &str) -> &str {
    let trimmed = text.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

/// Find a `"recipe_name": "..."` pair in text that would not parse as JSON.
fn scan_recipe_name(text: &str) -> Option<String> {
    let start = text.find("\"recipe_name\"")?;
    let rest = text[start + "\"recipe_name\"".len()..].trim_start();
    let rest = rest.strip_prefix(':')?.trim_start();
    let rest = rest.strip_prefix('"')?;
    let end = rest.find('"')?;
    let name = rest[..end].trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_object() {
        let record = parse_recipe_payload(&serde_json::json!({
            "recipe_name": "Herb Omelette",
            "instructions": ["Whisk eggs.", "Cook."]
        }));
        assert_eq!(record.recipe_name, "Herb Omelette");
        assert_eq!(record.instructions.len(), 2);
    }

    #[test]
    fn test_parse_fenced_json_string() {
        let payload = serde_json::json!(
            "```json\n{\"recipe_name\": \"Chili\", \"ingredients\": [\"beans\"]}\n```"
        );
        let record = parse_recipe_payload(&payload);
        assert_eq!(record.recipe_name, "Chili");
        assert_eq!(record.ingredients.len(), 1);
    }

    #[test]
    fn test_parse_fence_without_language_tag() {
        let record = parse_recipe_text("```\n{\"recipe_name\": \"Stock\"}\n```");
        assert_eq!(record.recipe_name, "Stock");
    }

    #[test]
    fn test_parse_double_encoded_json() {
        // The whole object arrives wrapped in one extra pair of quotes.
        let record = parse_recipe_text("\"{\"recipe_name\": \"Ramen\"}\"");
        assert_eq!(record.recipe_name, "Ramen");
    }

    #[test]
    fn test_parse_scans_recipe_name_from_broken_json() {
        let record = parse_recipe_text("oops not json {\"recipe_name\": \"Tacos\", \"rest\":");
        assert_eq!(record.recipe_name, "Tacos");
        assert!(record.ingredients.is_empty());
    }

    #[test]
    fn test_parse_falls_back_to_first_line() {
        let record = parse_recipe_text("\n  Grandma's Pancakes\nwith syrup\n");
        assert_eq!(record.recipe_name, "Grandma's Pancakes");
    }

    #[test]
    fn test_parse_empty_text_yields_default_title() {
        assert_eq!(parse_recipe_text("   \n  ").recipe_name, "Recipe");
        assert_eq!(parse_recipe_payload(&serde_json::json!(null)).title(), "Recipe");
    }

    #[test]
    fn test_parse_array_takes_first_element() {
        let record = parse_recipe_payload(&serde_json::json!([
            {"recipe_name": "First"},
            {"recipe_name": "Second"}
        ]));
        assert_eq!(record.recipe_name, "First");
    }

    #[test]
    fn test_object_without_name_keeps_display_fallback() {
        let record = parse_recipe_payload(&serde_json::json!({"instructions": ["x"]}));
        assert!(record.recipe_name.is_empty());
        assert_eq!(record.title(), "Recipe");
    }
}
