use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use crate::commands;

/// Replace the fragment after the last comma with the accepted suggestion
/// and leave a trailing ", " so the user keeps typing the next ingredient.
fn splice_suggestion(input: &str, pick: &str) -> String {
    let mut parts: Vec<&str> = input.split(',').collect();
    let last = parts.len() - 1;
    parts[last] = "";
    let mut next = parts.join(",");
    if !next.is_empty() && !next.ends_with(' ') {
        next.push(' ');
    }
    next.push_str(pick);
    next.push_str(", ");
    next.trim_start_matches([',', ' ']).to_string()
}

/// Comma-separated ingredient input with pantry typeahead for the fragment
/// currently being typed.
#[component]
pub fn IngredientInput(
    /// The full comma-separated text.
    value: ReadSignal<String>,
    /// Called with the updated text on every edit or accepted suggestion.
    on_change: impl Fn(String) + 'static + Copy + Send + Sync,
    #[prop(default = "Enter ingredients (e.g., eggs, spinach)")] placeholder: &'static str,
    /// Disables the input while a generation is running.
    #[prop(into)] disabled: Signal<bool>,
) -> impl IntoView {
    let (suggestions, set_suggestions) = signal::<Vec<String>>(vec![]);
    let (show_suggestions, set_show_suggestions) = signal(false);
    let (active_idx, set_active_idx) = signal(0usize);

    // Debounced suggestion lookup
    let lookup_timeout = StoredValue::new(None::<i32>);

    let do_lookup = move |text: String| {
        if let Some(id) = lookup_timeout.get_value() {
            web_sys::window().unwrap().clear_timeout_with_handle(id);
        }

        let fragment = text.rsplit(',').next().unwrap_or("").trim().to_string();
        if fragment.is_empty() {
            set_suggestions.set(vec![]);
            set_show_suggestions.set(false);
            set_active_idx.set(0);
            return;
        }

        let callback = wasm_bindgen::closure::Closure::once(move || {
            spawn_local(async move {
                if let Ok(found) = commands::suggest_ingredients(&text, Some(8)).await {
                    let has_any = !found.is_empty();
                    set_suggestions.set(found);
                    set_show_suggestions.set(has_any);
                    set_active_idx.set(0);
                }
            });
        });

        let id = web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                150,
            )
            .unwrap();
        callback.forget();
        lookup_timeout.set_value(Some(id));
    };

    let accept_suggestion = move |pick: String| {
        let next = splice_suggestion(&value.get_untracked(), &pick);
        on_change(next);
        set_show_suggestions.set(false);
        set_suggestions.set(vec![]);
        set_active_idx.set(0);
    };

    let accept_active = move || {
        let items = suggestions.get_untracked();
        if let Some(pick) = items.get(active_idx.get_untracked()) {
            accept_suggestion(pick.clone());
        }
    };

    view! {
        <div class="ingredient-input-wrap">
            <style>{include_str!("ingredient_input.css")}</style>
            <input
                type="text"
                class="input ingredient-input"
                placeholder=placeholder
                prop:value=move || value.get()
                on:input=move |ev| {
                    let text = event_target_value(&ev);
                    on_change(text.clone());
                    do_lookup(text);
                }
                on:keydown=move |ev| {
                    if !show_suggestions.get_untracked() {
                        return;
                    }
                    let count = suggestions.get_untracked().len();
                    match ev.key().as_str() {
                        "ArrowDown" if count > 0 => {
                            ev.prevent_default();
                            set_active_idx.update(|i| *i = (*i + 1) % count);
                        }
                        "ArrowUp" if count > 0 => {
                            ev.prevent_default();
                            set_active_idx.update(|i| *i = (*i + count - 1) % count);
                        }
                        "Enter" | "Tab" => {
                            ev.prevent_default();
                            accept_active();
                        }
                        "Escape" => set_show_suggestions.set(false),
                        _ => {}
                    }
                }
                on:focus=move |_| {
                    if !suggestions.get().is_empty() {
                        set_show_suggestions.set(true);
                    }
                }
                on:blur=move |_| {
                    // Delay so a mousedown on a suggestion lands first
                    let callback = wasm_bindgen::closure::Closure::once(move || {
                        set_show_suggestions.set(false);
                    });
                    let _ = web_sys::window()
                        .unwrap()
                        .set_timeout_with_callback_and_timeout_and_arguments_0(
                            callback.as_ref().unchecked_ref(),
                            200,
                        );
                    callback.forget();
                }
                disabled=move || disabled.get()
            />

            <Show when=move || show_suggestions.get()>
                <ul class="typeahead-menu">
                    {move || {
                        suggestions
                            .get()
                            .into_iter()
                            .enumerate()
                            .map(|(i, s)| {
                                let pick = s.clone();
                                view! {
                                    <li
                                        class="typeahead-item"
                                        class:active=move || active_idx.get() == i
                                        on:mousedown=move |ev| {
                                            ev.prevent_default();
                                            accept_suggestion(pick.clone());
                                        }
                                        on:mouseenter=move |_| set_active_idx.set(i)
                                    >
                                        {s}
                                    </li>
                                }
                            })
                            .collect::<Vec<_>>()
                    }}
                </ul>
            </Show>
        </div>
    }
}
