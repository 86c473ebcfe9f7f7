use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use wasm_bindgen_futures::spawn_local;

use crate::app::RecipeHandoff;
use crate::commands::{self, DayGroup};

/// Day-grouped history with search, sort, and per-entry share links. The
/// list itself lives in the backend session aggregator; this page only asks
/// for filtered views of it.
#[component]
pub fn HistoryPage() -> impl IntoView {
    let handoff = expect_context::<RecipeHandoff>();
    let navigate = use_navigate();

    let (query, set_query) = signal(String::new());
    let (sort, set_sort) = signal("newest".to_string());
    let (groups, set_groups) = signal::<Vec<DayGroup>>(vec![]);
    let (is_loading, set_is_loading) = signal(true);
    let (is_refreshing, set_is_refreshing) = signal(false);
    let (copied_id, set_copied_id) = signal::<Option<String>>(None);

    // Hydrate once, then re-filter whenever the query or sort changes.
    // After the first load the hydrate call answers from the session list.
    Effect::new(move |_| {
        let q = query.get();
        let s = sort.get();
        spawn_local(async move {
            let _ = commands::load_history(false).await;
            if let Ok(found) = commands::search_history(&q, &s).await {
                set_groups.set(found);
            }
            set_is_loading.set(false);
        });
    });

    let do_refresh = move |_| {
        set_is_refreshing.set(true);
        spawn_local(async move {
            let _ = commands::load_history(true).await;
            let q = query.get_untracked();
            let s = sort.get_untracked();
            if let Ok(found) = commands::search_history(&q, &s).await {
                set_groups.set(found);
            }
            set_is_refreshing.set(false);
        });
    };

    let do_share = move |id: String, title: String| {
        spawn_local(async move {
            if let Ok(url) = commands::share_link(&id).await {
                if let Some(window) = web_sys::window() {
                    let _ = window
                        .navigator()
                        .clipboard()
                        .write_text(&format!("{} - {}", title, url));
                }
                set_copied_id.set(Some(id));
            }
        });
    };

    view! {
        <div class="page history-page">
            <style>{include_str!("history.css")}</style>

            <h2>"Recipe History"</h2>
            <p class="page-description">
                "Your culinary journey, organized by time and taste."
            </p>

            <div class="card history-controls">
                <input
                    type="text"
                    class="input history-search"
                    placeholder="Search recipes or ingredients"
                    prop:value=move || query.get()
                    on:input=move |ev| set_query.set(event_target_value(&ev))
                />
                <select class="input history-sort" on:change=move |ev| {
                    set_sort.set(event_target_value(&ev));
                }>
                    <option value="newest">"Newest"</option>
                    <option value="name">"Name (A-Z)"</option>
                </select>
                <button
                    class="btn btn-secondary"
                    on:click=do_refresh
                    disabled=move || is_refreshing.get()
                >
                    {move || if is_refreshing.get() { "Refreshing..." } else { "Refresh" }}
                </button>
            </div>

            <Show when=move || is_loading.get()>
                <div class="loading-spinner">
                    <div class="spinner"></div>
                    <p>"Loading history..."</p>
                </div>
            </Show>

            <Show when=move || !is_loading.get() && groups.get().is_empty()>
                <div class="history-empty">
                    <div class="history-empty-emoji">"🔎"</div>
                    <p>"No recipes yet. Try generating your first one."</p>
                    <a href="/" class="btn btn-primary">"Back to Home"</a>
                </div>
            </Show>

            {move || groups.get().into_iter().map(|group| {
                let label = group.label.clone();
                let count_label = if group.entries.len() == 1 {
                    "1 recipe".to_string()
                } else {
                    format!("{} recipes", group.entries.len())
                };

                let entries = group.entries.into_iter().map(|entry| {
                    let title = entry.record.title().to_string();
                    let entry_id = entry.record.id.clone();
                    let share_id = entry.record.id.clone();
                    let share_title = title.clone();
                    let time_label = entry.display_time.clone().unwrap_or_default();

                    let chips: Vec<String> = entry
                        .record
                        .ingredients
                        .iter()
                        .take(6)
                        .map(|i| i.display())
                        .collect();
                    let overflow = entry.record.ingredients.len().saturating_sub(chips.len());

                    let mut meta = Vec::new();
                    if let Some(time) = entry.record.selected_time {
                        meta.push(format!("⏱ {} min", time));
                    }
                    if let Some(servings) = entry.record.selected_servings {
                        let word = if servings == 1 { "serving" } else { "servings" };
                        meta.push(format!("👥 {} {}", servings, word));
                    }
                    if let Some(kcal) = entry.record.estimated_calories {
                        meta.push(format!("🔥 {} kcal", kcal.round() as i64));
                    }

                    let record_main = entry.record.clone();
                    let record_view = entry.record.clone();
                    let nav_main = navigate.clone();
                    let nav_view = navigate.clone();

                    view! {
                        <li class="history-entry">
                            <div
                                class="history-entry-main"
                                on:click=move |_| {
                                    let id = record_main.id.clone();
                                    handoff.set_record.set(Some(record_main.clone()));
                                    nav_main(&format!("/recipe/{}", id), Default::default());
                                }
                            >
                                <h3 class="history-entry-title">{title}</h3>
                                <div class="history-chips">
                                    {chips.into_iter().map(|chip| view! {
                                        <span class="chip">{chip}</span>
                                    }).collect::<Vec<_>>()}
                                    {(overflow > 0).then(|| view! {
                                        <span class="chip chip-more">{format!("+{}", overflow)}</span>
                                    })}
                                </div>
                                {(!meta.is_empty()).then(|| view! {
                                    <div class="history-entry-meta">
                                        {meta.into_iter().map(|m| view! {
                                            <span>{m}</span>
                                        }).collect::<Vec<_>>()}
                                    </div>
                                })}
                            </div>

                            <div class="history-entry-side">
                                <span class="history-entry-time">{time_label}</span>
                                <button
                                    class="link-btn"
                                    on:click=move |_| {
                                        let id = record_view.id.clone();
                                        handoff.set_record.set(Some(record_view.clone()));
                                        nav_view(&format!("/recipe/{}", id), Default::default());
                                    }
                                >
                                    "🍽 View Recipe"
                                </button>
                                <button
                                    class="link-btn"
                                    on:click=move |_| do_share(share_id.clone(), share_title.clone())
                                >
                                    "🔗 Share"
                                </button>
                                {move || {
                                    (copied_id.get().as_deref() == Some(entry_id.as_str()))
                                        .then(|| view! {
                                            <span class="status-text saved">"Copied"</span>
                                        })
                                }}
                            </div>
                        </li>
                    }
                }).collect::<Vec<_>>();

                view! {
                    <section class="card history-group">
                        <div class="history-group-head">
                            <span class="history-group-icon">"📅"</span>
                            <span class="history-group-title">{label}</span>
                            <span class="history-group-count">{count_label}</span>
                        </div>
                        <ul class="history-list">{entries}</ul>
                    </section>
                }
            }).collect::<Vec<_>>()}
        </div>
    }
}
