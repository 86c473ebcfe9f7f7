use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::commands;
use crate::commands::PantryGroup;

/// Collapsible pantry catalog. Clicking an item hands it to the parent,
/// which splices it into the ingredient text.
#[component]
pub fn PantryDrawer(#[prop(into)] on_add: Callback<String>) -> impl IntoView {
    let (groups, set_groups) = signal::<Vec<PantryGroup>>(vec![]);
    let (open, set_open) = signal::<Vec<String>>(vec![]);

    // Load the catalog on mount
    Effect::new(move |_| {
        spawn_local(async move {
            if let Ok(catalog) = commands::pantry_groups().await {
                set_groups.set(catalog);
            }
        });
    });

    let toggle_group = move |name: String| {
        let mut o = open.get();
        if o.contains(&name) {
            o.retain(|x| x != &name);
        } else {
            o.push(name);
        }
        set_open.set(o);
    };

    view! {
        <div class="pantry-drawer">
            <style>{include_str!("pantry_drawer.css")}</style>
            <div class="pantry-heading">"Pantry quick add"</div>

            {move || groups.get().into_iter().map(|group| {
                let name_display = group.name.clone();
                let name_toggle = group.name.clone();
                let name_check = group.name.clone();
                let name_items = group.name.clone();
                let count_label = format!("{} items", group.items.len());
                let items = group.items.clone();

                view! {
                    <div class="pantry-group">
                        <div
                            class="pantry-group-header"
                            on:click=move |_| toggle_group(name_toggle.clone())
                        >
                            <span class={move || {
                                if open.get().contains(&name_check) {
                                    "pantry-arrow open"
                                } else {
                                    "pantry-arrow"
                                }
                            }}>
                                "\u{25B6}"
                            </span>
                            <span class="pantry-group-name">{name_display}</span>
                            <span class="pantry-group-count">{count_label}</span>
                        </div>

                        {move || {
                            if !open.get().contains(&name_items) {
                                return None;
                            }
                            let chips = items.iter().map(|item| {
                                let label = item.clone();
                                let pick = item.clone();
                                view! {
                                    <button
                                        class="pantry-chip"
                                        on:click=move |_| on_add.run(pick.clone())
                                    >
                                        {label}
                                    </button>
                                }
                            }).collect::<Vec<_>>();
                            Some(view! {
                                <div class="pantry-items">{chips}</div>
                            })
                        }}
                    </div>
                }
            }).collect::<Vec<_>>()}
        </div>
    }
}
