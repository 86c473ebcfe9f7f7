use leptos::prelude::*;

#[derive(Clone, Copy)]
pub struct ThemeContext {
    pub theme: ReadSignal<String>,
    pub set_theme: WriteSignal<String>,
}

/// Apply the theme by setting or removing the `data-theme` attribute on
/// `<html>`. "light" and "dark" force that palette; anything else
/// ("system") removes the attribute so the CSS @media rules decide.
pub fn apply_theme(theme: &str) {
    let Some(html) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    else {
        return;
    };

    match theme {
        "light" | "dark" => {
            let _ = html.set_attribute("data-theme", theme);
        }
        _ => {
            let _ = html.remove_attribute("data-theme");
        }
    }
}
