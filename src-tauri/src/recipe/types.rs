use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One generated recipe, as the rest of the app sees it.
///
/// The deserializer is deliberately forgiving: generation backends and older
/// history payloads disagree on field names and scalar types, so every field
/// defaults when missing, numeric strings count as numbers, and unknown
/// fields are ignored. A field that cannot be understood reads as absent,
/// never as an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeRecord {
    #[serde(deserialize_with = "de_stringish")]
    pub id: String,

    #[serde(alias = "title", alias = "name", deserialize_with = "de_stringish")]
    pub recipe_name: String,

    #[serde(deserialize_with = "de_ingredients")]
    pub ingredients: Vec<Ingredient>,

    #[serde(deserialize_with = "de_string_list")]
    pub instructions: Vec<String>,

    /// Nutrient name -> amount, kept raw so "12g" and 12 both render.
    #[serde(
        deserialize_with = "de_object",
        skip_serializing_if = "serde_json::Map::is_empty"
    )]
    pub nutritional_values: serde_json::Map<String, Value>,

    #[serde(deserialize_with = "de_opt_f64", skip_serializing_if = "Option::is_none")]
    pub estimated_calories: Option<f64>,

    #[serde(deserialize_with = "de_opt_u32", skip_serializing_if = "Option::is_none")]
    pub selected_time: Option<u32>,

    #[serde(deserialize_with = "de_opt_u32", skip_serializing_if = "Option::is_none")]
    pub selected_servings: Option<u32>,

    #[serde(deserialize_with = "de_opt_u32", skip_serializing_if = "Option::is_none")]
    pub selected_calories: Option<u32>,

    /// Raw creation timestamp as received; parsed lazily when ordering or
    /// grouping needs it.
    #[serde(
        alias = "times",
        alias = "timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<Value>,
}

impl RecipeRecord {
    /// Display title, with the documented fallback for nameless payloads.
    pub fn title(&self) -> &str {
        if self.recipe_name.trim().is_empty() {
            "Recipe"
        } else {
            &self.recipe_name
        }
    }
}

/// One ingredient line. Servers send either plain strings or structured
/// quantity/item pairs; both render the same way.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Ingredient {
    Text(String),
    Detailed {
        #[serde(skip_serializing_if = "Option::is_none")]
        quantity: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        item: Option<String>,
    },
}

impl Ingredient {
    pub fn from_value(value: &Value) -> Ingredient {
        match value {
            Value::Object(obj) => Ingredient::Detailed {
                quantity: obj.get("quantity").and_then(stringish),
                item: obj.get("item").and_then(stringish),
            },
            other => Ingredient::Text(stringish(other).unwrap_or_default()),
        }
    }

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

impl<'de> Deserialize<'de> for Ingredient {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Ingredient::from_value(&value))
    }
}

/// Render a JSON scalar as display text. Objects, arrays, and null don't.
fn stringish(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A number, accepting numeric strings like "350".
pub fn lenient_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// A non-negative integer, accepting numeric strings like "20".
pub fn lenient_u32(value: &Value) -> Option<u32> {
    let f = lenient_f64(value)?;
    if f.is_finite() && f >= 0.0 {
        Some(f.round() as u32)
    } else {
        None
    }
}

fn de_stringish<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(stringish(&value).unwrap_or_default())
}

fn de_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_f64(&value))
}

fn de_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_u32(&value))
}

fn de_ingredients<'de, D>(deserializer: D) -> Result<Vec<Ingredient>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Array(items) => Ok(items.iter().map(Ingredient::from_value).collect()),
        _ => Ok(Vec::new()),
    }
}

fn de_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Array(items) => Ok(items.iter().filter_map(stringish).collect()),
        _ => Ok(Vec::new()),
    }
}

fn de_object<'de, D>(deserializer: D) -> Result<serde_json::Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Ok(serde_json::Map::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_clean_payload() {
        let record: RecipeRecord = serde_json::from_value(serde_json::json!({
            "id": "r1",
            "recipe_name": "Lemon Pasta",
            "ingredients": ["200g spaghetti", {"quantity": "1", "item": "lemon"}],
            "instructions": ["Boil pasta.", "Zest lemon."],
            "nutritional_values": {"protein": "12g", "fat": 8},
            "estimated_calories": 420,
            "selected_time": 20,
            "selected_servings": 2
        }))
        .unwrap();

        assert_eq!(record.id, "r1");
        assert_eq!(record.recipe_name, "Lemon Pasta");
        assert_eq!(record.ingredients.len(), 2);
        assert_eq!(record.ingredients[1].display(), "1 lemon");
        assert_eq!(record.instructions.len(), 2);
        assert_eq!(record.estimated_calories, Some(420.0));
        assert_eq!(record.selected_time, Some(20));
    }

    #[test]
    fn test_record_accepts_messy_scalar_types() {
        let record: RecipeRecord = serde_json::from_value(serde_json::json!({
            "id": 42,
            "name": "Soup",
            "estimated_calories": "350",
            "time_option_unrelated": true,
            "selected_servings": "4"
        }))
        .unwrap();

        assert_eq!(record.id, "42");
        assert_eq!(record.recipe_name, "Soup");
        assert_eq!(record.estimated_calories, Some(350.0));
        assert_eq!(record.selected_servings, Some(4));
    }

    #[test]
    fn test_record_defaults_when_fields_missing_or_wrong_shape() {
        let record: RecipeRecord = serde_json::from_value(serde_json::json!({
            "ingredients": "not a list",
            "instructions": {"oops": 1},
            "nutritional_values": []
        }))
        .unwrap();

        assert!(record.id.is_empty());
        assert!(record.ingredients.is_empty());
        assert!(record.instructions.is_empty());
        assert!(record.nutritional_values.is_empty());
        assert_eq!(record.title(), "Recipe");
    }

    #[test]
    fn test_created_at_accepts_times_alias() {
        let record: RecipeRecord = serde_json::from_value(serde_json::json!({
            "recipe_name": "Stew",
            "times": "2024-03-01 18:30:00"
        }))
        .unwrap();

        assert_eq!(
            record.created_at,
            Some(Value::String("2024-03-01 18:30:00".to_string()))
        );
    }

    #[test]
    fn test_ingredient_forms_display() {
        assert_eq!(
            Ingredient::from_value(&serde_json::json!("2 eggs")).display(),
            "2 eggs"
        );
        assert_eq!(
            Ingredient::from_value(&serde_json::json!({"quantity": "1 tbsp", "item": "olive oil"}))
                .display(),
            "1 tbsp olive oil"
        );
        assert_eq!(
            Ingredient::from_value(&serde_json::json!({"item": "salt"})).display(),
            "salt"
        );
        assert_eq!(Ingredient::from_value(&serde_json::json!(3)).display(), "3");
    }

    #[test]
    fn test_lenient_numbers() {
        assert_eq!(lenient_f64(&serde_json::json!(12.5)), Some(12.5));
        assert_eq!(lenient_f64(&serde_json::json!(" 20 ")), Some(20.0));
        assert_eq!(lenient_f64(&serde_json::json!(true)), None);
        assert_eq!(lenient_u32(&serde_json::json!("4")), Some(4));
        assert_eq!(lenient_u32(&serde_json::json!(-3)), None);
    }
}
