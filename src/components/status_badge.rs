use leptos::prelude::*;

/// Status for a health check row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Fail,
    /// The check could not be performed, e.g. no cache database configured.
    Unknown,
    /// Informational row, never counted as passed or failed.
    Info,
}

#[component]
pub fn StatusBadge(
    /// The label text, e.g. "Data Directory"
    #[prop(into)]
    label: String,
    /// The status of this check
    status: CheckStatus,
    /// Optional detail text, e.g. the path in use
    #[prop(optional, into)]
    detail: Option<String>,
) -> impl IntoView {
    let (icon, class) = match status {
        CheckStatus::Pass => ("\u{2713}", "status-badge status-pass"),
        CheckStatus::Fail => ("\u{2717}", "status-badge status-fail"),
        CheckStatus::Unknown => ("?", "status-badge status-unknown"),
        CheckStatus::Info => ("\u{2022}", "status-badge status-info"),
    };

    view! {
        <div class="health-item">
            <span class=class>{icon}</span>
            <span class="health-name">{label}</span>
            <span class="health-detail">{detail.unwrap_or_default()}</span>
        </div>
    }
}
