use dioxus::prelude::*;
use time::OffsetDateTime;
use tracing::warn;

use dive_estimator::{
    domain::{
        breakdown_lines, format_usd, parse_lenient, AppState, BoatType, CleaningAge, HullType,
        PaintAge, Quote,
    },
    util::random_quote_suffix,
};

use crate::{
    app::{persist_user_state, record_quote},
    ui::{
        components::{
            breakdown_table::BreakdownTable,
            kpi_card::KpiCard,
            option_group::{option_key, options_of, OptionGroup},
            toast::{push_toast, ToastKind, ToastMessage},
        },
        theme,
    },
};

#[component]
pub fn EstimatePage() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();

    let (audience, draft, services) =
        state.with(|st| (st.audience, st.customer.clone(), st.rates.services().to_vec()));
    let estimate = state.with(|st| st.customer_estimate());

    let selected = services.iter().find(|service| service.id == draft.service_id);
    let needs_length = selected.map(|service| service.is_per_foot()).unwrap_or(false);
    let is_cleaning = selected.map(|service| service.is_cleaning()).unwrap_or(false);

    let mut service_options = vec![(String::new(), "No service (anodes only)".to_string())];
    service_options.extend(
        services
            .iter()
            .map(|service| (service.id.clone(), format!("{} · {}", service.name, service.price_label()))),
    );

    let on_save_quote = move |_| {
        let (draft, outcome, valid_days) =
            state.with(|st| (st.customer.clone(), st.customer_estimate(), st.settings.quote_valid_days));
        let (request, result) = match outcome {
            Ok(pair) => pair,
            Err(err) => {
                push_toast(toasts, ToastKind::Error, err.to_string());
                return;
            }
        };
        if draft.customer.name.trim().is_empty() || draft.customer.email.trim().is_empty() {
            push_toast(toasts, ToastKind::Warning, "Add your name and e-mail to save a quote.");
            return;
        }
        match Quote::issue(
            &request,
            &result,
            draft.customer.clone(),
            valid_days,
            OffsetDateTime::now_utc(),
            random_quote_suffix(),
        ) {
            Ok(quote) => {
                let message = format!(
                    "Quote {} saved: {} valid until {}.",
                    quote.number,
                    format_usd(quote.pricing.total),
                    quote.expires_label()
                );
                record_quote(state, toasts, quote);
                persist_user_state(&state);
                push_toast(toasts, ToastKind::Success, message);
            }
            Err(err) => {
                warn!("quote not issued: {err}");
                push_toast(toasts, ToastKind::Warning, err.to_string());
            }
        }
    };

    rsx! {
        div { class: "page-grid",
            section { class: "{theme::panel(audience)}",
                h2 { class: "panel-title", "Your boat" }

                OptionGroup {
                    title: "Service",
                    options: service_options,
                    selected: draft.service_id.clone(),
                    audience,
                    onselect: move |key: String| state.with_mut(|st| st.customer.service_id = key),
                }

                if let Some(service) = selected {
                    if !service.description.is_empty() {
                        p { class: "muted", "{service.description}" }
                    }
                }

                if needs_length {
                    div { class: "field",
                        label { class: "field-label", "Boat length (feet)" }
                        input {
                            class: "input",
                            r#type: "number",
                            min: "1",
                            value: "{draft.length_input}",
                            oninput: move |evt| state.with_mut(|st| st.customer.length_input = evt.value()),
                        }
                    }

                    OptionGroup {
                        title: "Boat type",
                        options: options_of(&[BoatType::Sailboat, BoatType::Powerboat], |v| format!("{v:?}")),
                        selected: option_key(&draft.boat_type),
                        audience,
                        onselect: move |key: String| state.with_mut(|st| st.customer.boat_type = parse_lenient("boat_type", &key)),
                    }

                    OptionGroup {
                        title: "Hull",
                        options: options_of(&[HullType::Monohull, HullType::Catamaran, HullType::Trimaran], |v| format!("{v:?}")),
                        selected: option_key(&draft.hull_type),
                        audience,
                        onselect: move |key: String| state.with_mut(|st| st.customer.hull_type = parse_lenient("hull_type", &key)),
                    }

                    label { class: "checkbox",
                        input {
                            r#type: "checkbox",
                            checked: draft.twin_engines,
                            onchange: move |evt| state.with_mut(|st| st.customer.twin_engines = evt.checked()),
                        }
                        "Twin engines"
                    }
                }

                if is_cleaning {
                    OptionGroup {
                        title: "Last bottom paint",
                        options: options_of(&PaintAge::ALL, |v| v.label().to_string()),
                        selected: draft.paint_age.key().to_string(),
                        audience,
                        onselect: move |key: String| state.with_mut(|st| st.customer.paint_age = parse_lenient("paint_age", &key)),
                    }

                    OptionGroup {
                        title: "Last hull cleaning",
                        options: options_of(&CleaningAge::ALL, |v| v.label().to_string()),
                        selected: draft.cleaning_age.key().to_string(),
                        audience,
                        onselect: move |key: String| state.with_mut(|st| st.customer.cleaning_age = parse_lenient("cleaning_age", &key)),
                    }
                }

                div { class: "field",
                    label { class: "field-label", "Anodes to install" }
                    input {
                        class: "input",
                        r#type: "number",
                        min: "0",
                        max: "50",
                        value: "{draft.anodes}",
                        oninput: move |evt| {
                            let count = evt.value().trim().parse::<u32>().unwrap_or(0);
                            state.with_mut(|st| st.customer.anodes = count);
                        },
                    }
                }
            }

            section { class: "stack",
                match estimate {
                    Ok((_, result)) => {
                        let headline = if result.is_empty() { "Nothing selected".to_string() } else { format_usd(result.final_amount) };
                        let note = result.rounded.then(|| "Rounded to a friendly number; the diver confirms on site.".to_string());
                        rsx! {
                            KpiCard { title: "Total estimate", value: headline, description: note, audience }
                            div { class: "{theme::panel(audience)}",
                                BreakdownTable { lines: breakdown_lines(&result) }
                            }
                        }
                    }
                    Err(err) => rsx! {
                        div { class: "{theme::panel(audience)} error-text", "{err}" }
                    },
                }

                div { class: "{theme::panel(audience)}",
                    h2 { class: "panel-title", "Save this quote" }
                    div { class: "field",
                        label { class: "field-label", "Name" }
                        input {
                            class: "input",
                            value: "{draft.customer.name}",
                            oninput: move |evt| state.with_mut(|st| st.customer.customer.name = evt.value()),
                        }
                    }
                    div { class: "field",
                        label { class: "field-label", "E-mail" }
                        input {
                            class: "input",
                            r#type: "email",
                            value: "{draft.customer.email}",
                            oninput: move |evt| state.with_mut(|st| st.customer.customer.email = evt.value()),
                        }
                    }
                    div { class: "field",
                        label { class: "field-label", "Boat name" }
                        input {
                            class: "input",
                            value: "{draft.customer.boat_name}",
                            oninput: move |evt| state.with_mut(|st| st.customer.customer.boat_name = evt.value()),
                        }
                    }
                    button { class: "{theme::btn_primary(audience)}", onclick: on_save_quote, "Save quote" }
                }
            }
        }
    }
}
