use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use wasm_bindgen_futures::spawn_local;

use crate::app::RecipeHandoff;
use crate::commands::{self, GenerateForm, HistoryEntry, UserSession};
use crate::components::ingredient_input::IngredientInput;
use crate::components::pantry_drawer::PantryDrawer;
use crate::components::recipe_card::RecipeCard;

const TIME_OPTIONS: [u32; 9] = [5, 10, 15, 20, 25, 30, 40, 50, 60];
const CALORIE_OPTIONS: [u32; 5] = [300, 400, 500, 600, 800];

fn normalize_ingredients(text: &str) -> Vec<String> {
    text.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn time_label(minutes: u32) -> String {
    if minutes == 60 {
        "1 hour".to_string()
    } else {
        format!("{} minutes", minutes)
    }
}

#[component]
pub fn HomePage() -> impl IntoView {
    let handoff = expect_context::<RecipeHandoff>();

    let (session, set_session) = signal::<Option<UserSession>>(None);

    // Form state
    let (ingredients_text, set_ingredients_text) = signal(String::new());
    let (mode, set_mode) = signal("ingredients".to_string());
    let (dish_name, set_dish_name) = signal(String::new());
    let (oven_on, set_oven_on) = signal(false);
    let (time_option, set_time_option) = signal::<Option<u32>>(None);
    let (serving_option, set_serving_option) = signal::<Option<u32>>(None);
    let (calorie_option, set_calorie_option) = signal::<Option<u32>>(None);
    let (is_generating, set_is_generating) = signal(false);
    let (error, set_error) = signal::<Option<String>>(None);

    // Recent recipes
    let (recent, set_recent) = signal::<Vec<HistoryEntry>>(vec![]);

    // Who is signed in, for the greeting
    Effect::new(move |_| {
        spawn_local(async move {
            if let Ok(found) = commands::get_identity_session().await {
                set_session.set(found);
            }
        });
    });

    // Most recent generations for the shortcut strip
    Effect::new(move |_| {
        spawn_local(async move {
            if let Ok(entries) = commands::load_history(false).await {
                set_recent.set(entries.into_iter().take(4).collect());
            }
        });
    });

    let greeting = move || {
        session
            .get()
            .and_then(|s| s.display_name)
            .filter(|name| !name.trim().is_empty())
            .map(|name| format!("Welcome back, {}", name))
            .unwrap_or_else(|| "Welcome to Savorly".to_string())
    };

    let append_ingredient = move |item: String| {
        let text = ingredients_text.get_untracked();
        let trimmed = text.trim_end();
        let next = if trimmed.is_empty() {
            format!("{}, ", item)
        } else if trimmed.ends_with(',') {
            format!("{} {}, ", trimmed, item)
        } else {
            format!("{}, {}, ", trimmed, item)
        };
        set_ingredients_text.set(next);
    };

    let navigate = use_navigate();
    let do_generate = move |_| {
        set_error.set(None);

        let ingredients = normalize_ingredients(&ingredients_text.get_untracked());
        let form_mode = mode.get_untracked();
        let dish = dish_name.get_untracked().trim().to_string();

        if form_mode == "dish" {
            if dish.is_empty() {
                set_error.set(Some("Please enter a dish name.".to_string()));
                return;
            }
        } else if ingredients.is_empty() {
            set_error.set(Some(
                "Please enter at least one ingredient (comma-separated).".to_string(),
            ));
            return;
        }

        let form = GenerateForm {
            ingredients,
            mode: form_mode.clone(),
            dish_name: (form_mode == "dish").then_some(dish),
            oven_option: if oven_on.get_untracked() {
                "with".to_string()
            } else {
                "without".to_string()
            },
            time_option: time_option.get_untracked(),
            serving_option: serving_option.get_untracked(),
            calorie_option: calorie_option.get_untracked(),
        };

        set_is_generating.set(true);
        let navigate = navigate.clone();
        spawn_local(async move {
            match commands::generate_recipe(form).await {
                Ok(record) => {
                    set_is_generating.set(false);
                    let id = record.id.clone();
                    handoff.set_record.set(Some(record));
                    navigate(&format!("/recipe/{}", id), Default::default());
                }
                Err(_) => {
                    set_is_generating.set(false);
                    set_error.set(Some("Something went wrong! Please try again.".to_string()));
                }
            }
        });
    };

    view! {
        <div class="page home-page">
            <style>{include_str!("home.css")}</style>

            <h2>{greeting}</h2>
            <p class="page-description">
                "Tell us what's in your kitchen and we'll turn it into dinner."
            </p>

            <div class="card generate-card">
                <div class="mode-pills">
                    <button
                        class=move || {
                            if mode.get() == "ingredients" { "mode-pill active" } else { "mode-pill" }
                        }
                        on:click=move |_| set_mode.set("ingredients".to_string())
                    >
                        "From my ingredients"
                    </button>
                    <button
                        class=move || {
                            if mode.get() == "dish" { "mode-pill active" } else { "mode-pill" }
                        }
                        on:click=move |_| set_mode.set("dish".to_string())
                    >
                        "Name a dish"
                    </button>
                </div>

                <Show when=move || mode.get() == "dish">
                    <div class="form-group">
                        <label>"Dish name"</label>
                        <input
                            type="text"
                            class="input"
                            placeholder="e.g., shakshuka"
                            prop:value=move || dish_name.get()
                            on:input=move |ev| set_dish_name.set(event_target_value(&ev))
                        />
                    </div>
                </Show>

                <div class="form-group">
                    <label>
                        {move || {
                            if mode.get() == "dish" {
                                "Ingredients to use (optional)"
                            } else {
                                "Ingredients"
                            }
                        }}
                    </label>
                    <IngredientInput
                        value=ingredients_text
                        on_change=move |text| set_ingredients_text.set(text)
                        disabled=is_generating
                    />
                </div>

                <div class="controls-row">
                    <div class="oven-toggle">
                        <span>"Oven Usage"</span>
                        <button
                            class=move || {
                                if oven_on.get() { "toggle-btn toggled" } else { "toggle-btn" }
                            }
                            on:click=move |_| set_oven_on.update(|o| *o = !*o)
                        >
                            <span class="thumb"></span>
                        </button>
                        <span>{move || if oven_on.get() { "On" } else { "Off" }}</span>
                    </div>

                    <select class="input control-select" on:change=move |ev| {
                        let value = event_target_value(&ev);
                        set_time_option.set(value.parse().ok());
                    }>
                        <option value="">"Cooking time"</option>
                        {TIME_OPTIONS.iter().map(|t| {
                            view! { <option value=t.to_string()>{time_label(*t)}</option> }
                        }).collect::<Vec<_>>()}
                    </select>

                    <select class="input control-select" on:change=move |ev| {
                        let value = event_target_value(&ev);
                        set_serving_option.set(value.parse().ok());
                    }>
                        <option value="">"Servings"</option>
                        {(1..=10u32).map(|n| {
                            let label = if n == 1 {
                                "1 serving".to_string()
                            } else {
                                format!("{} servings", n)
                            };
                            view! { <option value=n.to_string()>{label}</option> }
                        }).collect::<Vec<_>>()}
                    </select>

                    <select class="input control-select" on:change=move |ev| {
                        let value = event_target_value(&ev);
                        set_calorie_option.set(value.parse().ok());
                    }>
                        <option value="">"Calories per serving"</option>
                        {CALORIE_OPTIONS.iter().map(|c| {
                            view! { <option value=c.to_string()>{format!("~{} kcal", c)}</option> }
                        }).collect::<Vec<_>>()}
                    </select>
                </div>

                <div class="generate-actions">
                    <button
                        class="btn btn-primary"
                        on:click=do_generate
                        disabled=move || is_generating.get()
                    >
                        {move || if is_generating.get() { "Loading..." } else { "Cook It" }}
                    </button>
                </div>

                {move || error.get().map(|e| view! {
                    <p class="error-message">{e}</p>
                })}
            </div>

            <PantryDrawer on_add=append_ingredient />

            <Show when=move || !recent.get().is_empty()>
                <div class="recent-section">
                    <h3>"Recent recipes"</h3>
                    <div class="card-grid">
                        {move || recent.get().into_iter().map(|entry| {
                            view! { <RecipeCard entry=entry /> }
                        }).collect::<Vec<_>>()}
                    </div>
                </div>
            </Show>
        </div>
    }
}
