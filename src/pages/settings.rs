use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::commands::{self, UserSession};
use crate::theme::ThemeContext;

#[component]
pub fn SettingsPage() -> impl IntoView {
    let theme_ctx = expect_context::<ThemeContext>();

    // Identity state
    let (display_name, set_display_name) = signal(String::new());
    let (email, set_email) = signal(String::new());
    let (token, set_token) = signal(String::new());
    let (has_token, set_has_token) = signal(false);
    let (identity_status, set_identity_status) = signal::<Option<String>>(None);

    // Endpoint state
    let (base_url, set_base_url) = signal(String::new());
    let (base_status, set_base_status) = signal::<Option<String>>(None);
    let (site_url, set_site_url) = signal(String::new());
    let (site_status, set_site_status) = signal::<Option<String>>(None);

    // Load the stored profile and endpoints on mount
    Effect::new(move |_| {
        spawn_local(async move {
            if let Ok(Some(session)) = commands::get_identity_session().await {
                set_display_name.set(session.display_name.unwrap_or_default());
                set_email.set(session.email.unwrap_or_default());
            }
            if let Ok(present) = commands::has_identity_token().await {
                set_has_token.set(present);
            }
            if let Ok(url) = commands::get_api_base_url().await {
                set_base_url.set(url);
            }
            if let Ok(url) = commands::get_site_url().await {
                set_site_url.set(url);
            }
        });
    });

    let save_identity = move |_| {
        let token_value = token.get();
        if token_value.trim().is_empty() {
            set_identity_status.set(Some("Enter a token to sign in.".to_string()));
            return;
        }
        let session = UserSession {
            display_name: Some(display_name.get()).filter(|s| !s.trim().is_empty()),
            email: Some(email.get()).filter(|s| !s.trim().is_empty()),
        };
        spawn_local(async move {
            match commands::set_identity_session(&token_value, &session).await {
                Ok(()) => {
                    set_has_token.set(true);
                    set_token.set(String::new());
                    set_identity_status.set(Some("Session saved".to_string()));
                }
                Err(e) => {
                    set_identity_status.set(Some(format!("Failed to save: {}", e)));
                }
            }
        });
    };

    let do_sign_out = move |_| {
        spawn_local(async move {
            match commands::sign_out().await {
                Ok(()) => {
                    set_display_name.set(String::new());
                    set_email.set(String::new());
                    set_token.set(String::new());
                    set_has_token.set(false);
                    set_identity_status.set(Some("Signed out".to_string()));
                }
                Err(e) => {
                    set_identity_status.set(Some(format!("Sign-out failed: {}", e)));
                }
            }
        });
    };

    let save_base_url = move |_| {
        let url = base_url.get();
        spawn_local(async move {
            match commands::set_api_base_url(&url).await {
                Ok(normalized) => {
                    set_base_url.set(normalized);
                    set_base_status.set(Some("Saved".to_string()));
                }
                Err(e) => {
                    set_base_status.set(Some(format!("Failed to save: {}", e)));
                }
            }
        });
    };

    let save_site_url = move |_| {
        let url = site_url.get();
        spawn_local(async move {
            match commands::set_site_url(&url).await {
                Ok(normalized) => {
                    set_site_url.set(normalized);
                    set_site_status.set(Some("Saved".to_string()));
                }
                Err(e) => {
                    set_site_status.set(Some(format!("Failed to save: {}", e)));
                }
            }
        });
    };

    view! {
        <div class="page settings-page">
            <h2>"Settings"</h2>

            <section class="settings-section">
                <h3>"Identity"</h3>
                <p class="section-description">
                    "History and generations run under this profile. The provider token is "
                    "stored in your OS keychain, never in a plain file."
                </p>

                <div class="form-group">
                    <label for="identity-name">"Display name"</label>
                    <input
                        id="identity-name"
                        type="text"
                        class="input"
                        placeholder="Alex Chen"
                        prop:value=move || display_name.get()
                        on:input=move |ev| set_display_name.set(event_target_value(&ev))
                    />
                </div>
                <div class="form-group">
                    <label for="identity-email">"Email"</label>
                    <input
                        id="identity-email"
                        type="email"
                        class="input"
                        placeholder="alex@example.com"
                        prop:value=move || email.get()
                        on:input=move |ev| set_email.set(event_target_value(&ev))
                    />
                </div>
                <div class="form-group">
                    <label for="identity-token">"Provider token"</label>
                    <div class="input-row">
                        <input
                            id="identity-token"
                            type="password"
                            class="input"
                            placeholder="Paste the token from your provider"
                            prop:value=move || token.get()
                            on:input=move |ev| set_token.set(event_target_value(&ev))
                        />
                        <button class="btn btn-save" on:click=save_identity>"Save"</button>
                        <button class="btn btn-secondary" on:click=do_sign_out>"Sign out"</button>
                    </div>
                    <span class=move || {
                        if has_token.get() { "status-text saved" } else { "status-text not-set" }
                    }>
                        {move || if has_token.get() { "Signed in" } else { "Not signed in" }}
                    </span>
                    <Show when=move || identity_status.get().is_some()>
                        <span class="status-text">
                            {move || identity_status.get().unwrap_or_default()}
                        </span>
                    </Show>
                </div>
            </section>

            <section class="settings-section">
                <h3>"API Endpoint"</h3>
                <p class="section-description">
                    "Where recipe generation and history requests go. Leave empty to reset "
                    "to the default backend."
                </p>

                <div class="form-group">
                    <label for="api-base-url">"Base URL"</label>
                    <div class="input-row">
                        <input
                            id="api-base-url"
                            type="text"
                            class="input"
                            placeholder="https://api.savorly.app"
                            prop:value=move || base_url.get()
                            on:input=move |ev| set_base_url.set(event_target_value(&ev))
                        />
                        <button class="btn btn-save" on:click=save_base_url>"Save"</button>
                    </div>
                    <Show when=move || base_status.get().is_some()>
                        <span class="status-text">
                            {move || base_status.get().unwrap_or_default()}
                        </span>
                    </Show>
                </div>
            </section>

            <section class="settings-section">
                <h3>"Sharing"</h3>
                <p class="section-description">
                    "Share links point at this site, as "
                    <code>"{site}/recipe/{id}"</code>
                    ". Leave empty to reset to the default."
                </p>

                <div class="form-group">
                    <label for="site-url">"Site URL"</label>
                    <div class="input-row">
                        <input
                            id="site-url"
                            type="text"
                            class="input"
                            placeholder="https://www.savorly.app"
                            prop:value=move || site_url.get()
                            on:input=move |ev| set_site_url.set(event_target_value(&ev))
                        />
                        <button class="btn btn-save" on:click=save_site_url>"Save"</button>
                    </div>
                    <Show when=move || site_status.get().is_some()>
                        <span class="status-text">
                            {move || site_status.get().unwrap_or_default()}
                        </span>
                    </Show>
                </div>
            </section>

            <section class="settings-section">
                <h3>"Appearance"</h3>
                <div class="form-group">
                    <label for="theme-select">"Theme"</label>
                    <select
                        id="theme-select"
                        class="input theme-select"
                        prop:value=move || theme_ctx.theme.get()
                        on:change=move |ev| {
                            let value = event_target_value(&ev);
                            theme_ctx.set_theme.set(value.clone());
                            spawn_local(async move {
                                let _ = commands::set_preference("theme", &value).await;
                            });
                        }
                    >
                        <option value="system">"System"</option>
                        <option value="light">"Light"</option>
                        <option value="dark">"Dark"</option>
                    </select>
                </div>
            </section>
        </div>
    }
}
