use dioxus::prelude::*;

use dive_estimator::{
    domain::{format_percent, AppState, PricingSettings, RoundingRule, SurchargeRules},
    util::version::{version_label, APP_AUTHOR},
};

use crate::{
    app::persist_user_state,
    ui::{
        components::{
            option_group::{option_key, OptionGroup},
            toast::{push_toast, ToastKind, ToastMessage},
        },
        theme,
    },
};

#[component]
pub fn SettingsPage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();

    let (audience, initial, services) =
        state.with(|st| (st.audience, st.settings.clone(), st.rates.services().to_vec()));

    let mut minimum_input = use_signal(|| format!("{:.2}", initial.minimum_charge));
    let mut anode_input = use_signal(|| format!("{:.2}", initial.anode_rate));
    let mut valid_days_input = use_signal(|| initial.quote_valid_days.to_string());
    let mut endpoint_input = use_signal(|| initial.checkout_endpoint.clone().unwrap_or_default());
    let mut rounding = use_signal(|| initial.rounding);

    let on_apply = move |_| {
        let parsed = parse_settings(
            minimum_input(),
            anode_input(),
            valid_days_input(),
            endpoint_input(),
            rounding(),
        );

        match parsed {
            Ok(settings) => {
                let mut state = state;
                state.with_mut(|st| st.settings = settings);
                persist_user_state(&state);
                push_toast(toasts, ToastKind::Success, "Updated pricing settings.");
            }
            Err(message) => push_toast(toasts, ToastKind::Error, message),
        }
    };

    let on_reset = move |_| {
        let defaults = PricingSettings::default();
        minimum_input.set(format!("{:.2}", defaults.minimum_charge));
        anode_input.set(format!("{:.2}", defaults.anode_rate));
        valid_days_input.set(defaults.quote_valid_days.to_string());
        endpoint_input.set(String::new());
        rounding.set(defaults.rounding);
        let mut state = state;
        state.with_mut(|st| st.settings = defaults);
        persist_user_state(&state);
        push_toast(toasts, ToastKind::Info, "Restored default pricing settings.");
    };

    let rules = SurchargeRules::builtin();
    let surcharge_rows = [
        ("Powerboat", rules.powerboat),
        ("Catamaran", rules.catamaran),
        ("Trimaran", rules.trimaran),
        ("Twin engines", rules.twin_engines),
        ("Paint, 22-24 months", rules.paint_poor_low),
        ("Paint, over 24 months", rules.paint_poor_high),
    ];

    rsx! {
        div { class: "stack",
            section { class: "{theme::panel(audience)}",
                h2 { class: "panel-title", "Pricing" }
                div { class: "form-grid",
                    div { class: "field",
                        label { class: "field-label", "Minimum charge ($)" }
                        input {
                            class: "input",
                            value: minimum_input(),
                            oninput: move |evt| minimum_input.set(evt.value()),
                        }
                    }
                    div { class: "field",
                        label { class: "field-label", "Anode installation ($ each)" }
                        input {
                            class: "input",
                            value: anode_input(),
                            oninput: move |evt| anode_input.set(evt.value()),
                        }
                    }
                    div { class: "field",
                        label { class: "field-label", "Quote valid for (days)" }
                        input {
                            class: "input",
                            value: valid_days_input(),
                            oninput: move |evt| valid_days_input.set(evt.value()),
                        }
                    }
                    div { class: "field",
                        label { class: "field-label", "Checkout endpoint" }
                        input {
                            class: "input",
                            placeholder: "https://…/create-payment-intent",
                            value: endpoint_input(),
                            oninput: move |evt| endpoint_input.set(evt.value()),
                        }
                    }
                }
                OptionGroup {
                    title: "Customer rounding",
                    options: RoundingRule::ALL.iter().map(|rule| (option_key(rule), rule.label().to_string())).collect::<Vec<_>>(),
                    selected: option_key(&rounding()),
                    audience,
                    onselect: move |key: String| {
                        let rule = RoundingRule::ALL
                            .into_iter()
                            .find(|rule| option_key(rule) == key)
                            .unwrap_or_default();
                        rounding.set(rule);
                    },
                }
                div { class: "button-row",
                    button { class: "{theme::btn_primary(audience)}", onclick: on_apply, "Apply" }
                    button { class: "{theme::btn_ghost(audience)}", onclick: on_reset, "Reset defaults" }
                }
            }

            section { class: "{theme::panel(audience)}",
                h2 { class: "panel-title", "Rate table" }
                p { class: "muted", "Place a rates.json next to the settings file to override these." }
                table { class: "table",
                    tbody {
                        for service in services {
                            tr {
                                td { "{service.name}" }
                                td { class: "mono muted", "{service.id}" }
                                td { class: "amount", "{service.price_label()}" }
                            }
                        }
                    }
                }
            }

            section { class: "{theme::panel(audience)}",
                h2 { class: "panel-title", "Surcharges" }
                table { class: "table",
                    tbody {
                        for (label, percent) in surcharge_rows {
                            tr {
                                td { "{label}" }
                                td { class: "amount", "+{format_percent(percent)}" }
                            }
                        }
                    }
                }
            }

            p { class: "muted center", "{version_label()} · {APP_AUTHOR}" }
        }
    }
}

fn parse_settings(
    minimum: String,
    anode_rate: String,
    valid_days: String,
    endpoint: String,
    rounding: RoundingRule,
) -> Result<PricingSettings, String> {
    let minimum_charge: f64 = minimum
        .trim()
        .parse()
        .map_err(|_| "Minimum charge must be a number")?;
    if !(minimum_charge.is_finite() && minimum_charge >= 0.0) {
        return Err("Minimum charge cannot be negative".to_string());
    }
    let anode_rate: f64 = anode_rate
        .trim()
        .parse()
        .map_err(|_| "Anode rate must be a number")?;
    if !(anode_rate.is_finite() && anode_rate >= 0.0) {
        return Err("Anode rate cannot be negative".to_string());
    }
    let quote_valid_days: u16 = valid_days
        .trim()
        .parse()
        .map_err(|_| "Quote validity must be a whole number of days")?;
    if quote_valid_days == 0 {
        return Err("Quotes must be valid for at least one day".to_string());
    }
    let endpoint = endpoint.trim();
    let checkout_endpoint = if endpoint.is_empty() {
        None
    } else {
        url::Url::parse(endpoint).map_err(|err| format!("Checkout endpoint is not a URL: {err}"))?;
        Some(endpoint.to_string())
    };

    Ok(PricingSettings {
        minimum_charge,
        anode_rate,
        rounding,
        checkout_endpoint,
        quote_valid_days,
    })
}
