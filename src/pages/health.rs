use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::commands::{self, HealthReport};
use crate::components::status_badge::{CheckStatus, StatusBadge};

#[component]
pub fn HealthPage() -> impl IntoView {
    let (checking, set_checking) = signal(false);
    let (report, set_report) = signal::<Option<HealthReport>>(None);
    let (error, set_error) = signal::<Option<String>>(None);

    let do_health_check = move || {
        set_checking.set(true);
        set_error.set(None);
        spawn_local(async move {
            match commands::run_health_check().await {
                Ok(r) => {
                    set_report.set(Some(r));
                }
                Err(e) => {
                    set_error.set(Some(format!("Health check failed: {}", e)));
                }
            }
            set_checking.set(false);
        });
    };

    // Auto-run health check on mount
    let auto_check = do_health_check.clone();
    Effect::new(move |_| {
        auto_check();
    });

    let run_check = move |_| {
        do_health_check();
    };

    view! {
        <div class="page health-page">
            <h2>"Health Check"</h2>
            <p class="page-description">
                "Verify that Savorly can write local data, reach its cache, and find your identity token."
            </p>

            <button
                class="btn btn-primary"
                on:click=run_check
                disabled=move || checking.get()
            >
                {move || if checking.get() { "Checking..." } else { "Run Health Check" }}
            </button>

            {move || {
                error.get().map(|e| {
                    view! {
                        <div class="health-error">
                            <span class="status-text status-error">{e}</span>
                        </div>
                    }
                })
            }}

            {move || {
                report.get().map(|r| {
                    let cache_ok = r.cached_recipe_count.is_some();
                    let passed = [
                        r.data_dir_writable,
                        cache_ok,
                        r.identity_token_present,
                    ].iter().filter(|&&v| v).count();

                    let dir_status = if r.data_dir_writable { CheckStatus::Pass } else { CheckStatus::Fail };
                    let dir_detail = r.data_dir_path.clone().unwrap_or_else(|| "Session-only storage".to_string());

                    let cache_status = if cache_ok { CheckStatus::Pass } else { CheckStatus::Unknown };
                    let cache_detail = match r.cached_recipe_count {
                        Some(1) => "1 recipe cached".to_string(),
                        Some(n) => format!("{} recipes cached", n),
                        None => "Not available".to_string(),
                    };

                    let token_status = if r.identity_token_present { CheckStatus::Pass } else { CheckStatus::Fail };
                    let token_detail = if r.identity_token_present { "Signed in".to_string() } else { "Not signed in".to_string() };

                    let selection_detail = match r.stored_selection_count {
                        1 => "1 selection stored".to_string(),
                        n => format!("{} selections stored", n),
                    };

                    let summary_class = if passed == 3 { "summary-all-pass" } else if passed == 0 { "summary-all-fail" } else { "summary-partial" };

                    view! {
                        <div class="health-results">
                            <StatusBadge label="Data Directory" status=dir_status detail=dir_detail />
                            <StatusBadge label="Offline Cache" status=cache_status detail=cache_detail />
                            <StatusBadge label="Identity Token" status=token_status detail=token_detail />
                            <StatusBadge label="API Endpoint" status=CheckStatus::Info detail=r.api_base_url.clone() />
                            <StatusBadge label="Stored Selections" status=CheckStatus::Info detail=selection_detail />

                            <div class={format!("health-summary {}", summary_class)}>
                                {format!("{} of 3 checks passed", passed)}
                            </div>
                        </div>
                    }
                })
            }}
        </div>
    }
}
