use std::sync::Arc;

use dioxus::prelude::*;
use tracing::{info, warn};

use dive_estimator::{
    domain::{
        breakdown_lines, format_percent, format_usd, growth_slider, parse_lenient, AppState,
        BoatType, FoulingLevel, GrowthInput, HullType, PaintCondition, PriceCheckDetails,
        ServiceInterval, SurchargeKind,
    },
    infra::checkout::{CheckoutClient, CheckoutForm, CheckoutGate, RateLimiter},
};

use crate::ui::{
    components::{
        breakdown_table::BreakdownTable,
        kpi_card::KpiCard,
        option_group::{option_key, options_of, OptionGroup},
        toast::{push_toast, ToastKind, ToastMessage},
    },
    theme,
};

#[component]
pub fn AdminChargePage() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let limiter = use_context::<Arc<RateLimiter>>();
    let mut submitting = use_signal(|| false);

    let (audience, draft, services, checkout_enabled) = state.with(|st| {
        (
            st.audience,
            st.admin.clone(),
            st.rates.services().to_vec(),
            st.settings.checkout_enabled(),
        )
    });
    let estimate = state.with(|st| st.admin_estimate());

    let service_options = services
        .iter()
        .map(|service| (service.id.clone(), service.name.clone()))
        .collect::<Vec<_>>();

    let slider_position = match draft.growth {
        GrowthInput::Slider(position) => Some(position),
        GrowthInput::Level(_) => None,
    };
    let selected_level = match draft.growth {
        GrowthInput::Level(level) => option_key(&level),
        GrowthInput::Slider(_) => String::new(),
    };

    let on_charge = move |_| {
        if submitting() {
            return;
        }
        let (draft, outcome, settings, rates) = state.with(|st| {
            (
                st.admin.clone(),
                st.admin_estimate(),
                st.settings.clone(),
                st.rates.clone(),
            )
        });
        let result = match outcome {
            Ok((_, result)) if !result.is_empty() => result,
            Ok(_) => {
                push_toast(toasts, ToastKind::Warning, "Nothing to charge yet.");
                return;
            }
            Err(err) => {
                push_toast(toasts, ToastKind::Error, err.to_string());
                return;
            }
        };

        let client = match CheckoutClient::from_settings(settings.checkout_endpoint.as_deref()) {
            Ok(client) => client,
            Err(err) => {
                push_toast(toasts, ToastKind::Warning, format!("Cannot charge: {err}."));
                return;
            }
        };

        let form = CheckoutForm {
            service: result.service_id.clone(),
            estimate: result.final_amount,
            service_details: PriceCheckDetails {
                boat_length_feet: result.boat_length_feet,
                anodes_to_install: result.anode_count,
            },
            service_interval: draft.interval,
            customer_email: draft.customer.email.clone(),
            customer_name: draft.customer.name.clone(),
            customer_phone: draft.customer.phone.clone(),
            boat_name: draft.customer.boat_name.clone(),
            boat_make: draft.customer.boat_make.clone(),
            marina_name: draft.customer.marina.clone(),
            slip_number: draft.customer.slip.clone(),
            ..CheckoutForm::default()
        };

        let gate = CheckoutGate::new(rates, settings.minimum_charge)
            .with_anode_rate(settings.anode_rate)
            .with_limiter(limiter.clone());
        let prepared = match gate.prepare(form, None) {
            Ok(prepared) => prepared,
            Err(err) => {
                push_toast(toasts, ToastKind::Error, err.to_string());
                return;
            }
        };

        submitting.set(true);
        spawn(async move {
            match client.submit(&prepared).await {
                Ok(intent) => {
                    info!(order = %intent.order_number, "checkout accepted");
                    push_toast(
                        toasts,
                        ToastKind::Success,
                        format!("Order {} created ({:?} intent).", intent.order_number, intent.intent_type),
                    );
                }
                Err(err) => {
                    warn!(order = %prepared.order_number, "checkout failed: {err}");
                    push_toast(toasts, ToastKind::Error, format!("Checkout failed: {err}"));
                }
            }
            submitting.set(false);
        });
    };

    rsx! {
        div { class: "page-grid",
            section { class: "{theme::panel(audience)}",
                h2 { class: "panel-title", "Service record" }

                OptionGroup {
                    title: "Service",
                    options: service_options,
                    selected: draft.service_id.clone(),
                    audience,
                    onselect: move |key: String| state.with_mut(|st| st.admin.service_id = key),
                }

                div { class: "field",
                    label { class: "field-label", "Boat length (feet)" }
                    input {
                        class: "input",
                        r#type: "number",
                        value: "{draft.length_input}",
                        oninput: move |evt| state.with_mut(|st| st.admin.length_input = evt.value()),
                    }
                }

                OptionGroup {
                    title: "Boat type",
                    options: options_of(&[BoatType::Sailboat, BoatType::Powerboat], |v| format!("{v:?}")),
                    selected: option_key(&draft.boat_type),
                    audience,
                    onselect: move |key: String| state.with_mut(|st| st.admin.boat_type = parse_lenient("boat_type", &key)),
                }

                OptionGroup {
                    title: "Hull",
                    options: options_of(&[HullType::Monohull, HullType::Catamaran, HullType::Trimaran], |v| format!("{v:?}")),
                    selected: option_key(&draft.hull_type),
                    audience,
                    onselect: move |key: String| state.with_mut(|st| st.admin.hull_type = parse_lenient("hull_type", &key)),
                }

                label { class: "checkbox",
                    input {
                        r#type: "checkbox",
                        checked: draft.twin_engines,
                        onchange: move |evt| state.with_mut(|st| st.admin.twin_engines = evt.checked()),
                    }
                    "Twin engines"
                }

                OptionGroup {
                    title: "Paint condition",
                    options: options_of(&PaintCondition::ALL, |v| v.label().to_string()),
                    selected: option_key(&draft.paint),
                    audience,
                    onselect: move |key: String| state.with_mut(|st| st.admin.paint = parse_lenient("paint", &key)),
                }

                OptionGroup {
                    title: "Growth level",
                    options: options_of(&FoulingLevel::ALL, |v| v.label().to_string()),
                    selected: selected_level,
                    audience,
                    onselect: move |key: String| {
                        state.with_mut(|st| st.admin.growth = GrowthInput::Level(parse_lenient("fouling", &key)))
                    },
                }

                div { class: "field",
                    label { class: "field-label",
                        match slider_position {
                            Some(position) => {
                                let (level, percent) = growth_slider(position);
                                rsx! { "Growth slider: {level.label()} (+{format_percent(percent)})" }
                            }
                            None => rsx! { "Growth slider (drag to fine-tune)" },
                        }
                    }
                    input {
                        class: "slider",
                        r#type: "range",
                        min: "0",
                        max: "100",
                        value: "{slider_position.unwrap_or(0)}",
                        oninput: move |evt| {
                            let position = evt.value().parse::<u8>().unwrap_or(0).min(100);
                            state.with_mut(|st| st.admin.growth = GrowthInput::Slider(position));
                        },
                    }
                }

                div { class: "field",
                    label { class: "field-label", "Anodes installed" }
                    input {
                        class: "input",
                        r#type: "number",
                        min: "0",
                        value: "{draft.anodes}",
                        oninput: move |evt| {
                            let count = evt.value().trim().parse::<u32>().unwrap_or(0);
                            state.with_mut(|st| st.admin.anodes = count);
                        },
                    }
                }
            }

            section { class: "stack",
                match estimate {
                    Ok((_, result)) => {
                        let growth = result
                            .surcharge(SurchargeKind::Fouling)
                            .map(|item| format!("Growth surcharge {}", format_usd(item.amount)));
                        rsx! {
                            KpiCard { title: "Charge", value: format_usd(result.final_amount), description: growth, audience }
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
                    h2 { class: "panel-title", "Customer & billing" }
                    div { class: "field",
                        label { class: "field-label", "Customer name" }
                        input {
                            class: "input",
                            value: "{draft.customer.name}",
                            oninput: move |evt| state.with_mut(|st| st.admin.customer.name = evt.value()),
                        }
                    }
                    div { class: "field",
                        label { class: "field-label", "Customer e-mail" }
                        input {
                            class: "input",
                            r#type: "email",
                            value: "{draft.customer.email}",
                            oninput: move |evt| state.with_mut(|st| st.admin.customer.email = evt.value()),
                        }
                    }
                    OptionGroup {
                        title: "Billing",
                        options: ServiceInterval::ALL.iter().map(|v| (v.key().to_string(), v.label().to_string())).collect::<Vec<_>>(),
                        selected: draft.interval.key().to_string(),
                        audience,
                        onselect: move |key: String| state.with_mut(|st| st.admin.interval = parse_lenient("service_interval", &key)),
                    }
                    button {
                        class: "{theme::btn_primary(audience)}",
                        disabled: !checkout_enabled || submitting(),
                        onclick: on_charge,
                        if submitting() { "Charging…" } else { "Charge customer" }
                    }
                    if !checkout_enabled {
                        p { class: "muted", "Set a checkout endpoint in Settings to enable charging." }
                    }
                }
            }
        }
    }
}
