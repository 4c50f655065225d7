use dioxus::prelude::*;
use time::OffsetDateTime;

use dive_estimator::domain::{format_usd, AppState, Audience, QuoteStatus};

use crate::{
    app::record_quote,
    ui::{
        components::{
            kpi_card::KpiCard,
            toast::{push_toast, ToastKind, ToastMessage},
        },
        theme,
    },
};

#[derive(Clone, PartialEq)]
struct QuoteRow {
    number: String,
    customer: String,
    service: String,
    total: String,
    issued: String,
    expires: String,
    status: QuoteStatus,
}

#[component]
pub fn QuotesPage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let now = OffsetDateTime::now_utc();

    let (audience, quotes) = state.with(|st| (st.audience, st.quotes.clone()));

    let open = quotes
        .iter()
        .filter(|quote| matches!(quote.effective_status(now), QuoteStatus::Sent | QuoteStatus::Viewed))
        .count();
    let accepted_total: f64 = quotes
        .iter()
        .filter(|quote| quote.status == QuoteStatus::Accepted)
        .map(|quote| quote.pricing.total)
        .sum();

    let mut rows: Vec<QuoteRow> = quotes
        .iter()
        .map(|quote| QuoteRow {
            number: quote.number.clone(),
            customer: if quote.customer.name.is_empty() {
                quote.customer.email.clone()
            } else {
                quote.customer.name.clone()
            },
            service: quote.service_name.clone(),
            total: format_usd(quote.pricing.total),
            issued: quote.issued_label(),
            expires: quote.expires_label(),
            status: quote.effective_status(now),
        })
        .collect();
    rows.sort_by(|a, b| b.issued.cmp(&a.issued).then_with(|| b.number.cmp(&a.number)));

    let on_mark = move |(number, target): (String, QuoteStatus)| {
        let Some(mut quote) = state.with(|st| st.quotes.iter().find(|q| q.number == number).cloned()) else {
            return;
        };
        match quote.mark(target, OffsetDateTime::now_utc()) {
            Ok(()) => {
                record_quote(state, toasts, quote);
                push_toast(toasts, ToastKind::Success, format!("Quote {number} marked {}.", target.label()));
            }
            Err(err) => push_toast(toasts, ToastKind::Warning, err.to_string()),
        }
    };

    rsx! {
        div { class: "stack",
            div { class: "kpi-row",
                KpiCard { title: "Open quotes", value: open.to_string(), description: None, audience }
                KpiCard { title: "Accepted value", value: format_usd(accepted_total), description: None, audience }
            }

            section { class: "{theme::panel(audience)}",
                h2 { class: "panel-title", "Quotes" }
                if rows.is_empty() {
                    p { class: "muted", "No quotes yet. Save one from the estimate page." }
                } else {
                    table { class: "table",
                        thead {
                            tr {
                                th { "Number" }
                                th { "Customer" }
                                th { "Service" }
                                th { "Total" }
                                th { "Issued" }
                                th { "Expires" }
                                th { "Status" }
                                th {}
                            }
                        }
                        tbody {
                            for row in rows {
                                QuoteRowView { key: "{row.number}", row, audience, onmark: on_mark }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn QuoteRowView(row: QuoteRow, audience: Audience, onmark: EventHandler<(String, QuoteStatus)>) -> Element {
    let open = matches!(row.status, QuoteStatus::Sent | QuoteStatus::Viewed);
    let can_view = row.status == QuoteStatus::Sent;
    let number = row.number.clone();

    rsx! {
        tr {
            td { class: "mono", "{row.number}" }
            td { "{row.customer}" }
            td { "{row.service}" }
            td { class: "amount", "{row.total}" }
            td { "{row.issued}" }
            td { "{row.expires}" }
            td { span { class: "{theme::status_badge(row.status)}", "{row.status.label()}" } }
            td { class: "row-actions",
                if can_view {
                    button {
                        class: "{theme::btn_ghost(audience)}",
                        onclick: {
                            let number = number.clone();
                            move |_| onmark.call((number.clone(), QuoteStatus::Viewed))
                        },
                        "Viewed"
                    }
                }
                if open {
                    button {
                        class: "{theme::btn_ghost(audience)}",
                        onclick: {
                            let number = number.clone();
                            move |_| onmark.call((number.clone(), QuoteStatus::Accepted))
                        },
                        "Accept"
                    }
                    button {
                        class: "{theme::btn_ghost(audience)}",
                        onclick: move |_| onmark.call((number.clone(), QuoteStatus::Rejected)),
                        "Reject"
                    }
                }
            }
        }
    }
}
