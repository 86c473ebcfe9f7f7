use leptos::prelude::*;
use leptos_router::hooks::use_params_map;
use serde_json::Value;
use wasm_bindgen_futures::spawn_local;

use crate::app::RecipeHandoff;
use crate::commands::{self, RecipeView};
use crate::components::step_list::StepList;

fn nutrient_text(value: &Value) -> String {
    match value {
        Value::Number(n) => format!("{} g", n),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Recipe detail. Renders immediately from the record carried by navigation,
/// then swaps in the server-merged view when it lands. A resolve answering
/// for a recipe the user already left is dropped.
#[component]
pub fn RecipePage() -> impl IntoView {
    let params = use_params_map();
    let handoff = expect_context::<RecipeHandoff>();

    let (view_model, set_view_model) = signal::<Option<RecipeView>>(None);
    let (share_status, set_share_status) = signal::<Option<String>>(None);

    Effect::new(move |_| {
        let Some(id) = params.read().get("id") else {
            return;
        };
        set_share_status.set(None);
        spawn_local(async move {
            let nav = handoff.record.get_untracked().filter(|r| r.id == id);
            if let Ok(partial) = commands::open_recipe(&id, nav).await {
                set_view_model.set(Some(partial));
            }
            if let Ok(Some(merged)) = commands::resolve_recipe(&id).await {
                set_view_model.set(Some(merged));
            }
        });
    });

    let do_share = move |_| {
        let Some(v) = view_model.get_untracked() else {
            return;
        };
        let id = v.record.id.clone();
        let title = v.record.title().to_string();
        spawn_local(async move {
            match commands::share_link(&id).await {
                Ok(url) => {
                    if let Some(window) = web_sys::window() {
                        let _ = window
                            .navigator()
                            .clipboard()
                            .write_text(&format!("{} - {}", title, url));
                    }
                    set_share_status.set(Some("Link copied to clipboard".to_string()));
                }
                Err(e) => set_share_status.set(Some(e)),
            }
        });
    };

    view! {
        <div class="page recipe-page">
            <style>{include_str!("recipe.css")}</style>

            {move || match view_model.get() {
                None => view! {
                    <div class="loading-spinner">
                        <div class="spinner"></div>
                        <p>"Loading recipe..."</p>
                    </div>
                }
                .into_any(),
                Some(v) => {
                    let title = v.record.title().to_string();
                    let servings_text = match v.record.selected_servings {
                        Some(1) => "1 serving".to_string(),
                        Some(n) => format!("{} servings", n),
                        None => "servings not shown".to_string(),
                    };
                    let time_text = match v.record.selected_time {
                        Some(t) => format!("~{} min", t),
                        None => "time not shown".to_string(),
                    };
                    let ingredients: Vec<String> =
                        v.record.ingredients.iter().map(|i| i.display()).collect();
                    let nutrition: Vec<(String, String)> = v
                        .record
                        .nutritional_values
                        .iter()
                        .map(|(key, val)| (key.clone(), nutrient_text(val)))
                        .collect();
                    let nutrition_foot = v.record.selected_servings.map(|n| {
                        if n == 1 {
                            "Per serving • 1 total serving".to_string()
                        } else {
                            format!("Per serving • {} total servings", n)
                        }
                    });
                    let calories = v.record.estimated_calories;
                    let steps = v.record.instructions.clone();
                    let step_id = v.record.id.clone();
                    let step_title = v.record.recipe_name.clone();
                    let fetch_failed = v.fetch_failed;
                    let from_cache = v.from_cache;

                    view! {
                        <header class="recipe-hero">
                            <a href="/" class="back-link">"← Back to Home"</a>
                            <h1 class="recipe-title">{title}</h1>
                            <div class="recipe-sub">
                                {format!("{} • {}", servings_text, time_text)}
                            </div>
                            <div class="recipe-hero-actions">
                                <button class="btn btn-secondary btn-small" on:click=do_share>
                                    "Share"
                                </button>
                                {move || share_status.get().map(|s| view! {
                                    <span class="status-text saved">{s}</span>
                                })}
                            </div>
                        </header>

                        {fetch_failed.then(|| view! {
                            <div class="view-banner offline">
                                "Couldn't reach the server. Showing the freshest local copy."
                            </div>
                        })}
                        {(from_cache && !fetch_failed).then(|| view! {
                            <div class="view-banner cached">
                                "Served from the offline cache."
                            </div>
                        })}

                        <div class="recipe-columns">
                            <section class="card">
                                <h3>"Ingredients"</h3>
                                <ul class="ingredient-list">
                                    {if ingredients.is_empty() {
                                        vec![view! { <li>"—"</li> }.into_any()]
                                    } else {
                                        ingredients
                                            .into_iter()
                                            .map(|item| view! { <li>{item}</li> }.into_any())
                                            .collect::<Vec<_>>()
                                    }}
                                </ul>

                                {(!nutrition.is_empty()).then(|| view! {
                                    <div class="nutrition-panel">
                                        <div class="nutrition-title">
                                            "Nutrition Facts"
                                            {nutrition_foot.map(|foot| view! {
                                                <div class="nutrition-foot">{foot}</div>
                                            })}
                                        </div>
                                        {calories.map(|c| view! {
                                            <div class="calorie-chip">
                                                {format!("Calories {}", c.round() as i64)}
                                            </div>
                                        })}
                                        <div class="nutrition-divider"></div>
                                        <div class="nutrition-rows">
                                            {nutrition.into_iter().map(|(key, val)| view! {
                                                <div class="nutrition-row">
                                                    <span>{key}</span>
                                                    <span>{val}</span>
                                                </div>
                                            }).collect::<Vec<_>>()}
                                        </div>
                                    </div>
                                })}
                            </section>

                            <section class="card">
                                <h3>"Instructions"</h3>
                                <StepList id=step_id title=step_title steps=steps />
                            </section>
                        </div>
                    }
                    .into_any()
                }
            }}
        </div>
    }
}
