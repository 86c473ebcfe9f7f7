pub mod parse;
pub mod types;

pub use parse::{parse_recipe_payload, parse_recipe_text};
pub use types::{Ingredient, RecipeRecord};
