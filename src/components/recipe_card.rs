use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::app::RecipeHandoff;
use crate::commands::HistoryEntry;

/// Compact summary card for the recent-recipes strip on the home page.
/// Clicking it hands the record to the recipe page and navigates there.
#[component]
pub fn RecipeCard(entry: HistoryEntry) -> impl IntoView {
    let handoff = expect_context::<RecipeHandoff>();
    let navigate = use_navigate();

    let title = entry.record.title().to_string();
    let record = entry.record.clone();

    let mut meta = Vec::new();
    if let Some(time) = entry.record.selected_time {
        meta.push(format!("\u{23F1} {} min", time));
    }
    if let Some(servings) = entry.record.selected_servings {
        meta.push(format!("\u{1F465} {}", servings));
    }
    if let Some(calories) = entry.record.estimated_calories {
        meta.push(format!("\u{1F525} {} cal", calories.round() as i64));
    }
    let meta_line = (!meta.is_empty()).then(|| meta.join("  "));
    let date_line = entry.display_date.clone().unwrap_or_default();

    view! {
        <div
            class="card recipe-card"
            on:click=move |_| {
                let id = record.id.clone();
                handoff.set_record.set(Some(record.clone()));
                navigate(&format!("/recipe/{}", id), Default::default());
            }
        >
            <div class="recipe-card-title">{title}</div>
            {meta_line.map(|m| view! { <div class="recipe-card-meta">{m}</div> })}
            <div class="recipe-card-date">{date_line}</div>
        </div>
    }
}
