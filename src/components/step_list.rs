use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use crate::commands;
use crate::commands::StepState;

fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        0
    } else {
        ((done * 100) as f64 / total as f64).round() as u8
    }
}

/// Instruction checklist with per-step toggles, a progress bar, and a lock
/// once every step is done. Completion state lives in the backend session
/// store so it survives navigation within a run.
#[component]
pub fn StepList(id: String, title: String, steps: Vec<String>) -> impl IntoView {
    let total = steps.len();
    let recipe_id = StoredValue::new(id);
    let recipe_title = StoredValue::new(title);

    let (state, set_state) = signal(StepState::default());
    let (burst, set_burst) = signal(false);

    // Pull whatever progress this recipe already has
    Effect::new(move |_| {
        spawn_local(async move {
            if let Ok(loaded) =
                commands::get_step_state(&recipe_id.get_value(), &recipe_title.get_value()).await
            {
                set_state.set(loaded);
            }
        });
    });

    let celebrate = move || {
        set_burst.set(true);
        let callback = wasm_bindgen::closure::Closure::once(move || {
            set_burst.set(false);
        });
        let _ = web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                1200,
            );
        callback.forget();
    };

    let do_toggle = move |step: u32| {
        let before = state.get_untracked();
        if before.locked {
            return;
        }
        let prev_pct = percent(before.done.len(), total);
        spawn_local(async move {
            if let Ok(next) = commands::toggle_step(
                &recipe_id.get_value(),
                &recipe_title.get_value(),
                step,
                total,
            )
            .await
            {
                if prev_pct < 100 && percent(next.done.len(), total) == 100 {
                    celebrate();
                }
                set_state.set(next);
            }
        });
    };

    let do_reopen = move |_| {
        spawn_local(async move {
            if let Ok(next) =
                commands::reopen_steps(&recipe_id.get_value(), &recipe_title.get_value()).await
            {
                set_state.set(next);
            }
        });
    };

    let completion = move || {
        let s = state.get();
        percent(s.done.len(), total)
    };

    view! {
        <div class="step-list-wrap">
            <style>{include_str!("step_list.css")}</style>

            <Show when=move || { total > 0 }>
                <div class="step-progress">
                    <div class="step-progress-track">
                        <div
                            class="step-progress-bar"
                            style=move || format!("width: {}%", completion())
                        ></div>
                    </div>
                    <span class="step-progress-label">
                        {move || format!("{}% complete", completion())}
                    </span>
                </div>
            </Show>

            <Show when=move || state.get().locked>
                <div class="step-locked-banner">
                    <span>"All steps complete. Nicely done."</span>
                    <button class="btn btn-small" on:click=do_reopen>
                        "Reopen"
                    </button>
                </div>
            </Show>

            <p class="step-hint">"✔ Mark every step as done"</p>

            <ol class="step-list">
                {if steps.is_empty() {
                    vec![view! {
                        <li class="step-row">
                            <div class="step-badge">"\u{2014}"</div>
                            <div class="step-text">"\u{2014}"</div>
                        </li>
                    }
                    .into_any()]
                } else {
                    steps
                        .iter()
                        .enumerate()
                        .map(|(i, text)| {
                            let n = (i + 1) as u32;
                            let is_done = move || state.get().done.contains(&n);
                            let text = text.clone();
                            view! {
                                <li
                                    class=move || {
                                        if is_done() { "step-row done" } else { "step-row" }
                                    }
                                    on:click=move |_| do_toggle(n)
                                >
                                    <div class="step-badge">
                                        {move || {
                                            if is_done() {
                                                "✔".to_string()
                                            } else {
                                                n.to_string()
                                            }
                                        }}
                                    </div>
                                    <div class="step-text">{text}</div>
                                    <button
                                        class=move || {
                                            if is_done() {
                                                "step-toggle is-done"
                                            } else {
                                                "step-toggle"
                                            }
                                        }
                                        disabled=move || state.get().locked
                                        on:click=move |ev| {
                                            ev.stop_propagation();
                                            do_toggle(n);
                                        }
                                    >
                                        {move || if is_done() { "Undo" } else { "Done" }}
                                    </button>
                                </li>
                            }
                            .into_any()
                        })
                        .collect::<Vec<_>>()
                }}
            </ol>

            <Show when=move || burst.get()>
                <div class="step-burst">
                    {(0..16).map(|_| view! { <span>"🎉"</span> }).collect::<Vec<_>>()}
                </div>
            </Show>
        </div>
    }
}
