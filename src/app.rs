use std::sync::Arc;

use dioxus::{prelude::*, signals::Signal};
use time::OffsetDateTime;
use tracing::{info, warn};

use dive_estimator::{
    domain::{AppState, Quote},
    infra::{checkout::RateLimiter, quote_log::QuoteLog},
    util::{
        assets,
        persistence::{load_persisted_state, load_rate_table, save_persisted_state},
    },
};

use crate::ui::{
    components::toast::{push_toast, Toast, ToastKind, ToastMessage},
    pages::{AdminChargePage, EstimatePage, QuotesPage, SettingsPage},
    shell::Shell,
};

#[derive(Routable, Clone, PartialEq)]
pub enum Route {
    #[route("/")]
    #[route("/estimate")]
    Estimate {},
    #[route("/admin")]
    Admin {},
    #[route("/quotes")]
    Quotes {},
    #[route("/settings")]
    Settings {},
}

#[component]
pub fn App() -> Element {
    let state = use_signal(|| AppState::with_rates(load_rate_table()));
    use_hook({
        let mut state = state.clone();
        move || {
            let quotes = QuoteLog::default().load(OffsetDateTime::now_utc());
            info!(quotes = quotes.len(), "loaded quote log");
            state.with_mut(|st| {
                if let Some(saved) = load_persisted_state() {
                    st.apply_persisted(saved);
                }
                st.quotes = quotes;
            });
        }
    });
    use_context_provider(|| state.clone());

    let toasts = use_signal(Vec::<ToastMessage>::new);
    use_context_provider(|| toasts.clone());

    // One limiter per app so every checkout attempt counts against the same window.
    use_context_provider(|| Arc::new(RateLimiter::default()));

    rsx! {
        document::Link { rel: "icon", href: assets::favicon_data_uri() }
        document::Style { "{assets::main_css()}" }
        Router::<Route> {}
        Toast {}
    }
}

pub fn persist_user_state(state: &Signal<AppState>) {
    let snapshot = state.with(|st| st.to_persisted());
    if let Err(err) = save_persisted_state(&snapshot) {
        warn!("failed to persist user state: {err}");
    }
}

/// Adds or replaces `quote` in the session and the on-disk log.
pub fn record_quote(
    mut state: Signal<AppState>,
    toasts: Signal<Vec<ToastMessage>>,
    quote: Quote,
) {
    let now = OffsetDateTime::now_utc();
    match QuoteLog::default().append(quote.clone(), now) {
        Ok(quotes) => state.with_mut(|st| st.quotes = quotes),
        Err(err) => {
            warn!(quote = %quote.number, "failed to write quote log: {err}");
            push_toast(
                toasts,
                ToastKind::Warning,
                format!("Quote {} kept for this session only.", quote.number),
            );
            state.with_mut(|st| {
                st.quotes.retain(|existing| existing.number != quote.number);
                st.quotes.push(quote);
            });
        }
    }
}

#[component]
pub fn Estimate() -> Element {
    rsx! { Shell { EstimatePage {} } }
}

#[component]
pub fn Admin() -> Element {
    rsx! { Shell { AdminChargePage {} } }
}

#[component]
pub fn Quotes() -> Element {
    rsx! { Shell { QuotesPage {} } }
}

#[component]
pub fn Settings() -> Element {
    rsx! { Shell { SettingsPage {} } }
}
