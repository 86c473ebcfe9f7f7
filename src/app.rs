use leptos::prelude::*;
use leptos_router::components::*;
use leptos_router::path;
use wasm_bindgen_futures::spawn_local;

use crate::commands::{self, RecipeRecord};
use crate::components::sidebar::Sidebar;
use crate::pages::health::HealthPage;
use crate::pages::history::HistoryPage;
use crate::pages::home::HomePage;
use crate::pages::recipe::RecipePage;
use crate::pages::settings::SettingsPage;
use crate::theme::{apply_theme, ThemeContext};

/// In-memory navigation state: the record the user clicked to reach
/// `/recipe/:id`, carrying the freshest selections. The recipe page renders
/// it immediately while the server merge runs.
#[derive(Clone, Copy)]
pub struct RecipeHandoff {
    pub record: ReadSignal<Option<RecipeRecord>>,
    pub set_record: WriteSignal<Option<RecipeRecord>>,
}

#[component]
pub fn App() -> impl IntoView {
    let (theme, set_theme) = signal(String::from("system"));
    provide_context(ThemeContext { theme, set_theme });

    let (record, set_record) = signal::<Option<RecipeRecord>>(None);
    provide_context(RecipeHandoff { record, set_record });

    // Load saved theme preference on mount
    Effect::new(move |_| {
        spawn_local(async move {
            if let Ok(Some(saved)) = commands::get_preference("theme").await {
                set_theme.set(saved);
            }
        });
    });

    // Apply theme to DOM whenever the signal changes
    Effect::new(move |_| {
        let t = theme.get();
        apply_theme(&t);
    });

    view! {
        <Router>
            <div class="app-layout">
                <Sidebar />
                <main class="content">
                    <Routes fallback=|| view! { <p>"Page not found"</p> }>
                        <Route path=path!("/") view=HomePage />
                        <Route path=path!("/recipe/:id") view=RecipePage />
                        <Route path=path!("/history") view=HistoryPage />
                        <Route path=path!("/settings") view=SettingsPage />
                        <Route path=path!("/health") view=HealthPage />
                    </Routes>
                </main>
            </div>
        </Router>
    }
}
