pub mod ingredient_input;
pub mod pantry_drawer;
pub mod recipe_card;
pub mod sidebar;
pub mod status_badge;
pub mod step_list;
